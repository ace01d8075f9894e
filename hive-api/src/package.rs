//! Package descriptors and mounting.
//!
//! A resource package describes itself with a [`PackageDescriptor`]: its
//! name, the cache slots it owns, and a function that registers its routes.
//! The server mounts descriptors without knowing the packages' value types.
//!
//! Every failure here is a startup configuration mistake; the binary logs
//! it and exits.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use axum::Router;
use hive_core::MountError;
use hive_storage::CacheHandle;
use tracing::{debug, info};

use crate::packages::system::{SystemPackage, SYSTEM_PACKAGE};

/// Registers a package's routes on a router scoped at `/{name}`.
pub type RouteRegistrar = Box<dyn FnOnce(Router) -> Router + Send>;

// ============================================================================
// DESCRIPTOR
// ============================================================================

pub struct PackageDescriptor {
    name: String,
    caches: Vec<Arc<dyn CacheHandle>>,
    registrar: Option<RouteRegistrar>,
    generic: bool,
}

impl fmt::Debug for PackageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let caches: Vec<&str> = self.caches.iter().map(|cache| cache.name()).collect();
        f.debug_struct("PackageDescriptor")
            .field("name", &self.name)
            .field("caches", &caches)
            .field("has_registrar", &self.registrar.is_some())
            .field("generic", &self.generic)
            .finish()
    }
}

impl PackageDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            caches: Vec::new(),
            registrar: None,
            generic: false,
        }
    }

    /// Declare a cache slot owned by this package.
    pub fn with_cache(mut self, cache: Arc<dyn CacheHandle>) -> Self {
        self.caches.push(cache);
        self
    }

    pub fn with_routes<F>(mut self, registrar: F) -> Self
    where
        F: FnOnce(Router) -> Router + Send + 'static,
    {
        self.registrar = Some(Box::new(registrar));
        self
    }

    /// Mark the package as following the standard CRUD shape.
    pub fn generic(mut self) -> Self {
        self.generic = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_generic(&self) -> bool {
        self.generic
    }

    pub fn caches(&self) -> &[Arc<dyn CacheHandle>] {
        &self.caches
    }
}

// ============================================================================
// MOUNT
// ============================================================================

/// Mount one package under `/{name}`.
///
/// Validates the descriptor, initializes every unset cache slot it lists,
/// then nests the routes its registrar produces.
pub fn mount_package(router: Router, descriptor: PackageDescriptor) -> Result<Router, MountError> {
    let PackageDescriptor {
        name,
        caches,
        registrar,
        generic,
    } = descriptor;

    let name = name.trim();
    if name.is_empty() {
        return Err(MountError::BlankName);
    }
    let registrar = registrar.ok_or_else(|| MountError::MissingRegistrar {
        name: name.to_string(),
    })?;

    for cache in &caches {
        if cache.ensure_initialized() {
            debug!(package = name, cache = cache.name(), "Cache initialized");
        }
    }

    let routes = registrar(Router::new());
    info!(
        package = name,
        caches = caches.len(),
        generic,
        "Package mounted"
    );
    Ok(router.nest(&format!("/{}", name), routes))
}

/// Mount every package plus the system package, and record what was mounted.
///
/// Unlike [`mount_package`], this rejects a name used twice.
pub fn mount_many(
    mut router: Router,
    system: &SystemPackage,
    descriptors: Vec<PackageDescriptor>,
) -> Result<Router, MountError> {
    let mut seen: HashSet<String> = HashSet::from([SYSTEM_PACKAGE.to_string()]);
    let mut names = Vec::with_capacity(descriptors.len() + 1);
    let mut generic = Vec::new();

    for descriptor in descriptors {
        let name = descriptor.name().trim().to_string();
        if !name.is_empty() && !seen.insert(name.clone()) {
            return Err(MountError::DuplicateName { name });
        }
        let is_generic = descriptor.is_generic();

        router = mount_package(router, descriptor)?;

        if is_generic {
            generic.push(name.clone());
        }
        names.push(name);
    }

    router = mount_package(router, system.descriptor())?;
    names.push(SYSTEM_PACKAGE.to_string());

    names.sort();
    generic.sort();
    system.record_packages(names, generic);

    Ok(router)
}
