//! Introspection of the running server.
//!
//! The package is always mounted last by [`mount_many`](crate::package::mount_many),
//! which records every mounted package name here.
//!
//! Its single collection holds values of different shapes, so they are kept
//! as a closed [`SystemRecord`] enum and read back through accessors that
//! report a wrong variant as [`StorageError::TypeMismatch`].

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use hive_core::{StorageError, Timestamp};
use hive_storage::{Cache, CacheSlot};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::package::PackageDescriptor;

pub const SYSTEM_PACKAGE: &str = "system";

const KEY_PACKAGES: &str = "packages";
const KEY_GENERIC: &str = "generic";
const KEY_VERSION: &str = "version";
const KEY_STARTED_AT: &str = "started_at";

/// A value stored in the system collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SystemRecord {
    PackageList(Vec<String>),
    Version(String),
    StartedAt(Timestamp),
}

impl SystemRecord {
    pub fn kind(&self) -> &'static str {
        match self {
            SystemRecord::PackageList(_) => "package list",
            SystemRecord::Version(_) => "version",
            SystemRecord::StartedAt(_) => "timestamp",
        }
    }
}

/// Body of `GET /system/info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemInfo {
    pub version: String,
    pub started_at: Timestamp,
    pub uptime_secs: i64,
    pub packages: Vec<String>,
}

// ============================================================================
// PACKAGE
// ============================================================================

#[derive(Debug, Clone)]
pub struct SystemPackage {
    slot: Arc<CacheSlot<SystemRecord>>,
}

impl Default for SystemPackage {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemPackage {
    pub fn new() -> Self {
        let package = Self {
            slot: Arc::new(CacheSlot::new(SYSTEM_PACKAGE)),
        };
        let cache = package.cache();
        cache.set(
            KEY_VERSION,
            SystemRecord::Version(env!("CARGO_PKG_VERSION").to_string()),
        );
        cache.set(KEY_STARTED_AT, SystemRecord::StartedAt(Utc::now().timestamp()));
        package
    }

    pub fn cache(&self) -> Arc<Cache<SystemRecord>> {
        self.slot.cache()
    }

    pub fn descriptor(&self) -> PackageDescriptor {
        let package = self.clone();
        PackageDescriptor::new(SYSTEM_PACKAGE)
            .with_cache(self.slot.clone())
            .with_routes(move |router| {
                router.merge(
                    Router::new()
                        .route("/info", get(info_route))
                        .route("/packages", get(packages_route))
                        .route("/packages/generic", get(generic_route))
                        .with_state(package),
                )
            })
    }

    /// Store the mounted package names and the generic subset.
    pub fn record_packages(&self, names: Vec<String>, generic: Vec<String>) {
        let cache = self.cache();
        cache.set(KEY_PACKAGES, SystemRecord::PackageList(names));
        cache.set(KEY_GENERIC, SystemRecord::PackageList(generic));
    }

    /// Every mounted package, sorted. Empty before mounting.
    pub fn packages(&self) -> Result<Vec<String>, StorageError> {
        self.package_list(KEY_PACKAGES)
    }

    /// Packages serving the standard CRUD shape, sorted.
    pub fn generic_packages(&self) -> Result<Vec<String>, StorageError> {
        self.package_list(KEY_GENERIC)
    }

    pub fn version(&self) -> Result<String, StorageError> {
        match self.cache().get(KEY_VERSION) {
            None => Ok(String::new()),
            Some(SystemRecord::Version(version)) => Ok(version),
            Some(other) => Err(mismatch(KEY_VERSION, "version", &other)),
        }
    }

    pub fn started_at(&self) -> Result<Timestamp, StorageError> {
        match self.cache().get(KEY_STARTED_AT) {
            None => Ok(0),
            Some(SystemRecord::StartedAt(at)) => Ok(at),
            Some(other) => Err(mismatch(KEY_STARTED_AT, "timestamp", &other)),
        }
    }

    fn package_list(&self, key: &str) -> Result<Vec<String>, StorageError> {
        match self.cache().get(key) {
            None => Ok(Vec::new()),
            Some(SystemRecord::PackageList(names)) => Ok(names),
            Some(other) => Err(mismatch(key, "package list", &other)),
        }
    }
}

fn mismatch(key: &str, expected: &'static str, found: &SystemRecord) -> StorageError {
    StorageError::TypeMismatch {
        key: key.to_string(),
        expected,
        found: found.kind(),
    }
}

// ============================================================================
// ROUTES
// ============================================================================

async fn packages_route(State(system): State<SystemPackage>) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(system.packages()?))
}

async fn generic_route(State(system): State<SystemPackage>) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(system.generic_packages()?))
}

async fn info_route(State(system): State<SystemPackage>) -> ApiResult<Json<SystemInfo>> {
    let started_at = system.started_at()?;
    Ok(Json(SystemInfo {
        version: system.version()?,
        started_at,
        uptime_secs: (Utc::now().timestamp() - started_at).max(0),
        packages: system.packages()?,
    }))
}
