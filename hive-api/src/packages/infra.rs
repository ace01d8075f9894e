//! Infrastructure inventory.

use serde::{Deserialize, Serialize};

use super::CrudPackage;
use crate::error::ApiResult;
use crate::resource::{require_field, Resource};

pub const PACKAGE: &str = "infra";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    pub hostname: String,
    pub address: String,
    #[serde(default)]
    pub domains: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub active: bool,
}

impl Resource for Host {
    const KIND: &'static str = "Host";

    fn validate(&self) -> ApiResult<()> {
        require_field("hostname", &self.hostname)?;
        require_field("address", &self.address)
    }
}

pub fn package() -> CrudPackage<Host> {
    CrudPackage::new(PACKAGE)
}
