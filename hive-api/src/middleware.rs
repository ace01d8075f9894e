//! Axum Middleware for Authentication and Authorization
//!
//! Two stages wrap every protected route, applied in this order:
//! 1. [`authenticate_middleware`] drops any `AuthContext` already present on
//!    the request, reads the token header, and inserts a freshly resolved
//!    principal (401 on failure).
//! 2. [`authorize_middleware`] checks the principal against the path and
//!    method using the [`AccessPolicy`] (403 / 405 on failure).
//!
//! The principal only ever lives in request extensions, so concurrent
//! requests never share identity state.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

use crate::auth::{authenticate, AuthConfig, AuthContext, UserDirectory};
use crate::error::ApiError;
use crate::policy::{authorize, AccessPolicy};

// ============================================================================
// MIDDLEWARE STATE
// ============================================================================

/// Shared state for both auth stages.
#[derive(Clone)]
pub struct AuthState {
    pub config: Arc<AuthConfig>,
    pub directory: Arc<dyn UserDirectory>,
    pub policy: Arc<AccessPolicy>,
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("config", &self.config)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl AuthState {
    /// State using the default access policy.
    pub fn new(config: AuthConfig, directory: Arc<dyn UserDirectory>) -> Self {
        Self {
            config: Arc::new(config),
            directory,
            policy: Arc::new(AccessPolicy::default()),
        }
    }

    pub fn with_policy(mut self, policy: AccessPolicy) -> Self {
        self.policy = Arc::new(policy);
        self
    }
}

// ============================================================================
// MIDDLEWARE FUNCTIONS
// ============================================================================

/// Resolve the request's token into an [`AuthContext`].
pub async fn authenticate_middleware(
    State(state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // Never trust a principal that did not come from this request's token.
    request.extensions_mut().remove::<AuthContext>();

    let token = request
        .headers()
        .get(&state.config.token_header)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .unwrap_or_default();

    let auth_context = authenticate(&state.config, state.directory.as_ref(), token)?;
    tracing::debug!(
        user = %auth_context.user,
        root = auth_context.is_root,
        "Request authenticated"
    );

    request.extensions_mut().insert(auth_context);
    Ok(next.run(request).await)
}

/// Check the authenticated principal against the path and method.
pub async fn authorize_middleware(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_context = request
        .extensions()
        .get::<AuthContext>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if let Err(err) = authorize(
        auth_context,
        request.uri().path(),
        request.method(),
        &state.policy,
    ) {
        tracing::debug!(
            user = %auth_context.user,
            method = %request.method(),
            path = %request.uri().path(),
            code = %err.code,
            "Request denied"
        );
        return Err(err);
    }

    Ok(next.run(request).await)
}

// ============================================================================
// TYPED EXTRACTOR
// ============================================================================

/// Typed Axum extractor for the authenticated principal.
///
/// ```rust,ignore
/// async fn me(AuthExtractor(auth): AuthExtractor) -> Json<AuthContext> {
///     Json(auth)
/// }
/// ```
///
/// Routes using it must sit behind [`authenticate_middleware`]; without it
/// the extractor rejects with 401.
#[derive(Debug, Clone)]
pub struct AuthExtractor(pub AuthContext);

#[async_trait]
impl<S> FromRequestParts<S> for AuthExtractor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .map(AuthExtractor)
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

impl std::ops::Deref for AuthExtractor {
    type Target = AuthContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

// ============================================================================
// TESTS
// ============================================================================
