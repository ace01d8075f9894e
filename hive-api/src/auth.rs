//! Authentication Module
//!
//! Resolves the token carried in the `X-Auth-Token` header into a principal:
//! 1. An empty token is rejected.
//! 2. The configured root token yields the synthetic root principal.
//! 3. Any other token must belong to an active user in the [`UserDirectory`].
//!
//! Tokens are pre-shared and compared by equality. Nothing is signed or expires.

use axum::http::HeaderName;
use hive_core::ROOT_USER;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::error::{ApiError, ApiResult};

/// Header carrying the bearer token.
pub const TOKEN_HEADER: &str = "x-auth-token";

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Authentication configuration.
///
/// The root token is wrapped in a [`SecretString`], so `Debug` output never
/// contains it.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Token granting the root principal
    pub root_token: SecretString,

    /// Header the token is read from
    pub token_header: HeaderName,
}

impl AuthConfig {
    pub fn new(root_token: impl Into<String>) -> Self {
        Self {
            root_token: SecretString::from(root_token.into()),
            token_header: HeaderName::from_static(TOKEN_HEADER),
        }
    }

    /// Whether `token` is the root token.
    pub fn is_root_token(&self, token: &str) -> bool {
        let root = self.root_token.expose_secret();
        !root.is_empty() && token == root
    }
}

// ============================================================================
// PRINCIPAL
// ============================================================================

/// Authenticated principal for one request.
///
/// Inserted into request extensions by the authentication middleware and
/// dropped with the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthContext {
    /// User name, `root` for the root principal
    pub user: String,

    /// Granted roles
    pub roles: Vec<String>,

    /// Top-level path segments the principal may touch
    pub acl: Vec<String>,

    /// Root bypasses every authorization check
    #[serde(rename = "root")]
    pub is_root: bool,
}

impl AuthContext {
    /// The synthetic root principal.
    pub fn root() -> Self {
        Self {
            user: ROOT_USER.to_string(),
            roles: Vec::new(),
            acl: Vec::new(),
            is_root: true,
        }
    }

    pub fn user(user: impl Into<String>, roles: Vec<String>, acl: Vec<String>) -> Self {
        Self {
            user: user.into(),
            roles,
            acl,
            is_root: false,
        }
    }

    /// Check if the principal has a specific role.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Check if the principal has any of the specified roles.
    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        roles.iter().any(|role| self.has_role(role))
    }

    /// Whether `segment` is listed in the ACL. Order is irrelevant.
    pub fn can_access(&self, segment: &str) -> bool {
        self.acl.iter().any(|item| item == segment)
    }
}

// ============================================================================
// USER DIRECTORY
// ============================================================================

/// A user record as seen by authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryUser {
    pub name: String,
    pub roles: Vec<String>,
    pub acl: Vec<String>,
}

/// Lookup of active users by token.
///
/// Implemented by the users package over its cache; tests can supply any
/// in-memory implementation.
pub trait UserDirectory: Send + Sync {
    /// The active user whose stored token equals `token`, if any.
    fn find_user_by_token(&self, token: &str) -> Option<DirectoryUser>;
}

/// Directory with no users. Only the root token authenticates.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyDirectory;

impl UserDirectory for EmptyDirectory {
    fn find_user_by_token(&self, _token: &str) -> Option<DirectoryUser> {
        None
    }
}

// ============================================================================
// AUTHENTICATION
// ============================================================================

/// Resolve a token into a principal.
pub fn authenticate(
    config: &AuthConfig,
    directory: &dyn UserDirectory,
    token: &str,
) -> ApiResult<AuthContext> {
    if token.is_empty() {
        return Err(ApiError::unauthorized(
            "Authentication required: provide the X-Auth-Token header",
        ));
    }

    if config.is_root_token(token) {
        return Ok(AuthContext::root());
    }

    directory
        .find_user_by_token(token)
        .map(|user| AuthContext::user(user.name, user.roles, user.acl))
        .ok_or_else(|| ApiError::unauthorized("Invalid token"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use std::collections::HashMap;

    struct MapDirectory(HashMap<String, DirectoryUser>);

    impl UserDirectory for MapDirectory {
        fn find_user_by_token(&self, token: &str) -> Option<DirectoryUser> {
            self.0.get(token).cloned()
        }
    }

    fn directory() -> MapDirectory {
        let mut users = HashMap::new();
        users.insert(
            "tok_alice".to_string(),
            DirectoryUser {
                name: "alice".to_string(),
                roles: vec!["power".to_string()],
                acl: vec!["links".to_string(), "backups".to_string()],
            },
        );
        MapDirectory(users)
    }

    #[test]
    fn test_empty_token_is_rejected() {
        let config = AuthConfig::new("root-secret");
        let err = authenticate(&config, &directory(), "").unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }

    #[test]
    fn test_root_token_yields_root() {
        let config = AuthConfig::new("root-secret");
        let ctx = authenticate(&config, &directory(), "root-secret").unwrap();
        assert!(ctx.is_root);
        assert_eq!(ctx.user, ROOT_USER);
    }

    #[test]
    fn test_user_token_populates_roles_and_acl() {
        let config = AuthConfig::new("root-secret");
        let ctx = authenticate(&config, &directory(), "tok_alice").unwrap();
        assert!(!ctx.is_root);
        assert_eq!(ctx.user, "alice");
        assert!(ctx.has_role("power"));
        assert!(ctx.can_access("backups"));
        assert!(!ctx.can_access("users"));
    }

    #[test]
    fn test_unknown_token_is_rejected() {
        let config = AuthConfig::new("root-secret");
        let err = authenticate(&config, &directory(), "tok_mallory").unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }

    #[test]
    fn test_blank_root_token_never_matches() {
        let config = AuthConfig::new("");
        assert!(!config.is_root_token(""));
    }

    #[test]
    fn test_debug_hides_root_token() {
        let config = AuthConfig::new("super-secret-value");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret-value"));
    }
}
