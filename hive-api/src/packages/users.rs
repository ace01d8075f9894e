//! User accounts.
//!
//! Besides the standard CRUD routes the package serves `GET /users/me` and
//! backs token authentication through [`UsersPackage::directory`].

use std::sync::Arc;

use axum::{routing::get, Json};
use hive_storage::{Cache, CacheSlot};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthContext, DirectoryUser, UserDirectory};
use crate::error::ApiResult;
use crate::middleware::AuthExtractor;
use crate::package::PackageDescriptor;
use crate::resource::{require_field, Resource};
use crate::routes::generic::crud_routes;

pub const PACKAGE: &str = "users";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub full_name: String,
    /// Pre-shared token, compared by equality
    pub token_hash: String,
    #[serde(default)]
    pub roles: Vec<String>,
    /// First path segments this user may reach
    #[serde(default)]
    pub acl: Vec<String>,
    #[serde(default)]
    pub active: bool,
}

impl Resource for User {
    const KIND: &'static str = "User";

    fn validate(&self) -> ApiResult<()> {
        require_field("token_hash", &self.token_hash)
    }
}

// ============================================================================
// PACKAGE
// ============================================================================

#[derive(Debug, Clone)]
pub struct UsersPackage {
    slot: Arc<CacheSlot<User>>,
}

impl Default for UsersPackage {
    fn default() -> Self {
        Self::new()
    }
}

impl UsersPackage {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(CacheSlot::new(PACKAGE)),
        }
    }

    pub fn cache(&self) -> Arc<Cache<User>> {
        self.slot.cache()
    }

    pub fn descriptor(&self) -> PackageDescriptor {
        let slot = Arc::clone(&self.slot);
        PackageDescriptor::new(PACKAGE)
            .with_cache(self.slot.clone())
            .with_routes(move |router| {
                router
                    .route("/me", get(me_route))
                    .merge(crud_routes(slot.cache()))
            })
            .generic()
    }

    /// Token lookup over this package's cache.
    pub fn directory(&self) -> Arc<dyn UserDirectory> {
        Arc::new(CacheDirectory {
            slot: Arc::clone(&self.slot),
        })
    }
}

async fn me_route(AuthExtractor(auth): AuthExtractor) -> Json<AuthContext> {
    Json(auth)
}

// ============================================================================
// DIRECTORY
// ============================================================================

struct CacheDirectory {
    slot: Arc<CacheSlot<User>>,
}

impl UserDirectory for CacheDirectory {
    fn find_user_by_token(&self, token: &str) -> Option<DirectoryUser> {
        // An unmounted users package knows nobody.
        let cache = self.slot.get().ok()?;
        let (key, user) = cache.find(|user| user.active && user.token_hash == token)?;
        let name = if user.nickname.trim().is_empty() {
            key
        } else {
            user.nickname
        };
        Some(DirectoryUser {
            name,
            roles: user.roles,
            acl: user.acl,
        })
    }
}
