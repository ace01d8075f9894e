//! Shared server state: every resource package plus the event dispatcher.

use std::sync::Arc;

use hive_events::Dispatcher;

use crate::auth::{AuthConfig, UserDirectory};
use crate::middleware::AuthState;
use crate::package::PackageDescriptor;
use crate::packages::{
    backups, infra, links, projects, Backup, CrudPackage, DishPackage, Host, Link, Project,
    SystemPackage, UsersPackage,
};

#[derive(Debug, Clone)]
pub struct HiveState {
    pub dispatcher: Dispatcher,
    pub system: SystemPackage,
    pub users: UsersPackage,
    pub dish: DishPackage,
    pub links: Arc<CrudPackage<Link>>,
    pub projects: Arc<CrudPackage<Project>>,
    pub backups: Arc<CrudPackage<Backup>>,
    pub infra: Arc<CrudPackage<Host>>,
}

impl HiveState {
    /// Fresh, empty packages around a running dispatcher.
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            system: SystemPackage::new(),
            users: UsersPackage::new(),
            dish: DishPackage::new(dispatcher.clone()),
            links: Arc::new(links::package()),
            projects: Arc::new(projects::package()),
            backups: Arc::new(backups::package()),
            infra: Arc::new(infra::package()),
            dispatcher,
        }
    }

    /// Descriptors of every package except `system`, which the mount step adds.
    pub fn descriptors(&self) -> Vec<PackageDescriptor> {
        vec![
            self.users.descriptor(),
            self.links.descriptor(),
            self.projects.descriptor(),
            self.backups.descriptor(),
            self.infra.descriptor(),
            self.dish.descriptor(),
        ]
    }

    pub fn directory(&self) -> Arc<dyn UserDirectory> {
        self.users.directory()
    }

    /// Auth middleware state resolving user tokens against the users package.
    pub fn auth_state(&self, config: AuthConfig) -> AuthState {
        AuthState::new(config, self.directory())
    }
}
