//! Backup job definitions.

use serde::{Deserialize, Serialize};

use super::CrudPackage;
use crate::error::ApiResult;
use crate::resource::{require_field, Resource};

pub const PACKAGE: &str = "backups";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Backup {
    pub name: String,
    pub source: String,
    pub destination: String,
    /// Cron-style schedule, free-form
    #[serde(default)]
    pub schedule: Option<String>,
    #[serde(default)]
    pub active: bool,
}

impl Resource for Backup {
    const KIND: &'static str = "Backup";

    fn validate(&self) -> ApiResult<()> {
        require_field("name", &self.name)?;
        require_field("source", &self.source)?;
        require_field("destination", &self.destination)
    }
}

pub fn package() -> CrudPackage<Backup> {
    CrudPackage::new(PACKAGE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_backup_requires_destination() {
        let backup = Backup {
            name: "nightly".to_string(),
            source: "/srv".to_string(),
            destination: " ".to_string(),
            schedule: None,
            active: true,
        };
        let err = backup.validate().unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingField);
        assert!(err.message.contains("destination"));
    }
}
