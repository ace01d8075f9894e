//! Hive API - HTTP Server Layer
//!
//! Serves every hive resource package over REST (Axum), gated by a
//! token-authentication and ACL-authorization pipeline, and streams live
//! state changes to subscribers as server-sent events.

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod package;
pub mod packages;
pub mod policy;
pub mod resource;
pub mod routes;
pub mod sse;
pub mod state;
pub mod telemetry;

// Re-export commonly used types
pub use auth::{
    authenticate, AuthConfig, AuthContext, DirectoryUser, EmptyDirectory, UserDirectory,
    TOKEN_HEADER,
};
pub use config::ServerConfig;
pub use error::{ApiError, ApiResult, ErrorBody, ErrorCode};
pub use middleware::{authenticate_middleware, authorize_middleware, AuthExtractor, AuthState};
pub use package::{mount_many, mount_package, PackageDescriptor, RouteRegistrar};
pub use policy::{authorize, AccessPolicy, RoleRequirement};
pub use resource::Resource;
pub use routes::{build_cors_layer, create_router, create_router_with_policy};
pub use state::HiveState;
