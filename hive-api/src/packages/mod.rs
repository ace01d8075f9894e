//! Resource packages mounted by the server.
//!
//! Most packages are a single collection served through the generic CRUD
//! routes ([`CrudPackage`]). `users` adds `/users/me` and backs token
//! lookup, `dish` serves monitored sockets and their live status stream,
//! and `system` reports what was mounted.

pub mod backups;
pub mod dish;
pub mod infra;
pub mod links;
pub mod projects;
pub mod system;
pub mod users;

use std::sync::Arc;

use hive_storage::{Cache, CacheSlot};

use crate::package::PackageDescriptor;
use crate::resource::Resource;
use crate::routes::generic::crud_routes;

pub use backups::Backup;
pub use dish::{DishPackage, Socket};
pub use infra::Host;
pub use links::Link;
pub use projects::Project;
pub use system::{SystemPackage, SystemRecord};
pub use users::{User, UsersPackage};

/// A package holding one collection of `T`, served with the standard CRUD shape.
#[derive(Debug)]
pub struct CrudPackage<T> {
    name: &'static str,
    slot: Arc<CacheSlot<T>>,
}

impl<T: Resource> CrudPackage<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            slot: Arc::new(CacheSlot::new(name)),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The package cache, created on first use.
    pub fn cache(&self) -> Arc<Cache<T>> {
        self.slot.cache()
    }

    pub fn descriptor(&self) -> PackageDescriptor {
        let slot = Arc::clone(&self.slot);
        PackageDescriptor::new(self.name)
            .with_cache(self.slot.clone())
            .with_routes(move |router| router.merge(crud_routes(slot.cache())))
            .generic()
    }
}
