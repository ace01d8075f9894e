//! Role names and small key helpers shared by the auth pipeline and packages.

/// Role allowed to create and replace items.
pub const ROLE_POWER: &str = "power";

/// Role allowed to do everything, including deletes.
pub const ROLE_ADMIN: &str = "admin";

/// Principal name reported for the root token.
pub const ROOT_USER: &str = "root";

/// Returns true when `key` is empty or whitespace only.
///
/// Blank keys are never stored by bulk restores.
pub fn is_blank_key(key: &str) -> bool {
    key.trim().is_empty()
}

/// Item keys that collide with static package routes (`/restore`, `/me`,
/// `/results`, `/status`). No package stores them.
pub const RESERVED_KEYS: &[&str] = &["restore", "me", "results", "status"];

pub fn is_reserved_key(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_blank_keys() {
        assert!(is_blank_key(""));
        assert!(is_blank_key("   "));
        assert!(is_blank_key("\t\n"));
        assert!(!is_blank_key("sd"));
        assert!(!is_blank_key(" sd "));
    }

    #[test]
    fn test_reserved_keys() {
        assert!(is_reserved_key("restore"));
        assert!(is_reserved_key("status"));
        assert!(!is_reserved_key("Restore"));
        assert!(!is_reserved_key("sd"));
    }

    proptest! {
        #[test]
        fn prop_whitespace_only_is_blank(key in "[ \t\r\n]{0,8}") {
            prop_assert!(is_blank_key(&key));
        }

        #[test]
        fn prop_padding_never_hides_content(
            pad in "[ \t]{0,4}",
            word in "[a-z0-9_-]{1,12}",
        ) {
            let padded = format!("{pad}{word}{pad}");
            prop_assert!(!is_blank_key(&padded));
        }
    }
}
