//! HTTP Routes Module
//!
//! Assembles the complete router:
//! - every resource package, mounted under `/{name}` and gated by the auth
//!   pipeline (authentication, then authorization)
//! - public routes: `/` banner, `/ping`, `/health/*`, `/metrics`
//! - observability and CORS around everything

pub mod generic;
pub mod health;

use std::time::Duration;

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Json, Router,
};
use hive_core::MountError;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use crate::auth::{AuthConfig, TOKEN_HEADER};
use crate::middleware::{authenticate_middleware, authorize_middleware, AuthState};
use crate::package::mount_many;
use crate::policy::AccessPolicy;
use crate::state::HiveState;
use crate::telemetry::{metrics_handler, observability_middleware};

/// Preflight cache duration.
const CORS_MAX_AGE: Duration = Duration::from_secs(86400);

/// Body of `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Banner {
    pub service: String,
    pub version: String,
}

async fn banner() -> Json<Banner> {
    Json(Banner {
        service: "hive".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Routes reachable without a token.
fn public_routes(state: &HiveState) -> Router {
    Router::new()
        .route("/", get(banner))
        .route("/ping", get(health::ping))
        .nest("/health", health::create_router(state.dispatcher.clone()))
        .route("/metrics", get(metrics_handler))
}

/// Build the CORS layer. No configured origins means allow all.
pub fn build_cors_layer(cors_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(TOKEN_HEADER),
        ])
        .max_age(CORS_MAX_AGE);

    if cors_origins.is_empty() {
        tracing::info!("CORS: allowing all origins");
        cors.allow_origin(Any)
    } else {
        tracing::info!(origins = ?cors_origins, "CORS: allowing configured origins");
        let origins: Vec<HeaderValue> = cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

/// Create the complete router with the default access policy.
///
/// # Middleware Order (outer to inner)
/// 1. CORS - answers preflight requests
/// 2. Observability - span, log line and metrics per request
/// 3. Authentication, then authorization (package routes only)
pub fn create_router(
    state: &HiveState,
    auth_config: AuthConfig,
    cors_origins: &[String],
) -> Result<Router, MountError> {
    create_router_with_policy(state, auth_config, AccessPolicy::default(), cors_origins)
}

pub fn create_router_with_policy(
    state: &HiveState,
    auth_config: AuthConfig,
    policy: AccessPolicy,
    cors_origins: &[String],
) -> Result<Router, MountError> {
    let auth_state: AuthState = state.auth_state(auth_config).with_policy(policy);

    let protected = mount_many(Router::new(), &state.system, state.descriptors())?
        .layer(from_fn_with_state(auth_state.clone(), authorize_middleware))
        .layer(from_fn_with_state(auth_state, authenticate_middleware));

    Ok(protected
        .merge(public_routes(state))
        .layer(from_fn(observability_middleware))
        .layer(build_cors_layer(cors_origins)))
}
