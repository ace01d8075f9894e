//! Access policy: which roles may use which HTTP method on which package.
//!
//! Authorization for a non-root principal is decided in two steps:
//! 1. The first path segment must be in the principal's ACL (else 403).
//! 2. The method must be permitted by the policy table for that segment
//!    (else 405).
//!
//! The table is plain data. Rules bound to a specific package win over
//! wildcard rules; a method no rule mentions requires `admin`.

use axum::http::Method;
use hive_core::{ROLE_ADMIN, ROLE_POWER};

use crate::auth::AuthContext;
use crate::error::{ApiError, ApiResult};

// ============================================================================
// RULES
// ============================================================================

/// Roles needed to use a method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleRequirement {
    /// Any authenticated principal whose ACL matched
    AnyRole,

    /// At least one of these roles
    OneOf(Vec<String>),
}

impl RoleRequirement {
    pub fn one_of(roles: &[&str]) -> Self {
        RoleRequirement::OneOf(roles.iter().map(|role| role.to_string()).collect())
    }

    pub fn is_satisfied_by(&self, roles: &[String]) -> bool {
        match self {
            RoleRequirement::AnyRole => true,
            RoleRequirement::OneOf(required) => roles.iter().any(|role| required.contains(role)),
        }
    }
}

/// One `(package | any, method) -> requirement` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PolicyRule {
    /// `None` matches every package
    package: Option<String>,
    method: Method,
    requirement: RoleRequirement,
}

// ============================================================================
// POLICY TABLE
// ============================================================================

#[derive(Debug, Clone)]
pub struct AccessPolicy {
    rules: Vec<PolicyRule>,
    fallback: RoleRequirement,
}

impl Default for AccessPolicy {
    /// Safe methods for everyone, writes for power users, deletes for admins.
    fn default() -> Self {
        let writers = RoleRequirement::one_of(&[ROLE_POWER, ROLE_ADMIN]);
        let admins = RoleRequirement::one_of(&[ROLE_ADMIN]);

        Self::empty()
            .allow_any(Method::GET, RoleRequirement::AnyRole)
            .allow_any(Method::HEAD, RoleRequirement::AnyRole)
            .allow_any(Method::OPTIONS, RoleRequirement::AnyRole)
            .allow_any(Method::TRACE, RoleRequirement::AnyRole)
            .allow_any(Method::POST, writers.clone())
            .allow_any(Method::PUT, writers.clone())
            .allow_any(Method::PATCH, writers)
            .allow_any(Method::DELETE, admins)
    }
}

impl AccessPolicy {
    /// A table with no rules; every method falls back to `admin`.
    pub fn empty() -> Self {
        Self {
            rules: Vec::new(),
            fallback: RoleRequirement::one_of(&[ROLE_ADMIN]),
        }
    }

    /// Add a wildcard rule.
    pub fn allow_any(mut self, method: Method, requirement: RoleRequirement) -> Self {
        self.rules.push(PolicyRule {
            package: None,
            method,
            requirement,
        });
        self
    }

    /// Add a rule bound to one package.
    pub fn allow_on(
        mut self,
        package: impl Into<String>,
        method: Method,
        requirement: RoleRequirement,
    ) -> Self {
        self.rules.push(PolicyRule {
            package: Some(package.into()),
            method,
            requirement,
        });
        self
    }

    /// The requirement that applies to `method` on `package`.
    pub fn requirement_for(&self, package: &str, method: &Method) -> &RoleRequirement {
        let specific = self
            .rules
            .iter()
            .find(|rule| rule.package.as_deref() == Some(package) && rule.method == *method);
        let wildcard = || {
            self.rules
                .iter()
                .find(|rule| rule.package.is_none() && rule.method == *method)
        };

        specific
            .or_else(wildcard)
            .map(|rule| &rule.requirement)
            .unwrap_or(&self.fallback)
    }

    pub fn permits(&self, package: &str, method: &Method, roles: &[String]) -> bool {
        self.requirement_for(package, method).is_satisfied_by(roles)
    }
}

// ============================================================================
// AUTHORIZATION
// ============================================================================

/// First non-empty segment of a request path, `None` for the root path.
pub fn first_segment(path: &str) -> Option<&str> {
    path.split('/').find(|segment| !segment.is_empty())
}

/// Decide whether `ctx` may use `method` on `path`.
pub fn authorize(
    ctx: &AuthContext,
    path: &str,
    method: &Method,
    policy: &AccessPolicy,
) -> ApiResult<()> {
    if ctx.is_root {
        return Ok(());
    }

    let Some(segment) = first_segment(path) else {
        return Ok(());
    };

    if !ctx.can_access(segment) {
        return Err(ApiError::forbidden("access denied")
            .with_details(serde_json::json!({ "segment": segment })));
    }

    if !policy.permits(segment, method, &ctx.roles) {
        return Err(ApiError::method_not_allowed(method, segment));
    }

    Ok(())
}
