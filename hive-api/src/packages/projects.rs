//! Portfolio projects.

use serde::{Deserialize, Serialize};

use super::CrudPackage;
use crate::error::ApiResult;
use crate::resource::{require_field, Resource};

pub const PACKAGE: &str = "projects";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub published: bool,
}

impl Resource for Project {
    const KIND: &'static str = "Project";

    fn validate(&self) -> ApiResult<()> {
        require_field("name", &self.name)
    }
}

pub fn package() -> CrudPackage<Project> {
    CrudPackage::new(PACKAGE)
}
