//! Hive Test Utilities
//!
//! Shared test infrastructure for the hive workspace:
//! - Proptest generators for keys, ACLs, roles and HTTP methods
//! - Fixtures for messages and resource bodies
//!
//! This crate only depends on `hive-core` so that every other crate can use
//! it as a dev-dependency without dependency cycles.

pub use hive_core::{Message, ROLE_ADMIN, ROLE_POWER, ROOT_USER};

use proptest::prelude::*;

// ============================================================================
// KEY GENERATORS
// ============================================================================

/// Non-blank item keys in the shape resource packages use.
pub fn cache_key_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_-]{0,15}"
}

/// Keys that must be skipped by bulk restores.
pub fn blank_key_strategy() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), " {1,4}", "[ \t]{1,3}"]
}

/// A single top-level path segment (package name).
pub fn segment_strategy() -> impl Strategy<Value = String> {
    "[a-z]{3,10}"
}

/// An ACL: a short list of distinct package names.
pub fn acl_strategy() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::btree_set(segment_strategy(), 0..5).prop_map(|set| set.into_iter().collect())
}

// ============================================================================
// AUTH GENERATORS
// ============================================================================

/// A role set drawn from the known roles plus noise.
pub fn roles_strategy() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::btree_set(
        prop_oneof![
            Just(ROLE_ADMIN.to_string()),
            Just(ROLE_POWER.to_string()),
            Just("viewer".to_string()),
            Just("operator".to_string()),
        ],
        0..3,
    )
    .prop_map(|set| set.into_iter().collect())
}

/// HTTP method names the policy table knows about.
pub fn method_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("GET"),
        Just("HEAD"),
        Just("OPTIONS"),
        Just("POST"),
        Just("PUT"),
        Just("PATCH"),
        Just("DELETE"),
    ]
}

/// Bearer tokens that are never the root token used by fixtures.
pub fn user_token_strategy() -> impl Strategy<Value = String> {
    "tok_[a-zA-Z0-9]{12,24}"
}

// ============================================================================
// FIXTURES
// ============================================================================

/// Root token used by test configurations.
pub const TEST_ROOT_TOKEN: &str = "root-token-for-tests";

/// JSON body of a link item.
pub fn link_body(name: &str, url: &str, active: bool) -> serde_json::Value {
    serde_json::json!({ "name": name, "url": url, "active": active })
}

/// A non-heartbeat message affecting `keys`.
pub fn change_message(keys: &[&str]) -> Message {
    Message::new(
        "sockets changed",
        keys.iter().map(|key| key.to_string()).collect(),
    )
}

/// Whether a role list grants write access (power or admin).
pub fn can_write(roles: &[String]) -> bool {
    roles.iter().any(|role| role == ROLE_POWER || role == ROLE_ADMIN)
}

/// Whether a role list grants delete access (admin only).
pub fn can_delete(roles: &[String]) -> bool {
    roles.iter().any(|role| role == ROLE_ADMIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hive_core::is_blank_key;

    proptest! {
        #[test]
        fn prop_cache_keys_are_never_blank(key in cache_key_strategy()) {
            prop_assert!(!is_blank_key(&key));
        }

        #[test]
        fn prop_blank_keys_are_blank(key in blank_key_strategy()) {
            prop_assert!(is_blank_key(&key));
        }
    }

    #[test]
    fn test_role_helpers() {
        let admin = vec![ROLE_ADMIN.to_string()];
        let power = vec![ROLE_POWER.to_string()];
        let viewer = vec!["viewer".to_string()];
        assert!(can_write(&admin) && can_delete(&admin));
        assert!(can_write(&power) && !can_delete(&power));
        assert!(!can_write(&viewer) && !can_delete(&viewer));
    }
}
