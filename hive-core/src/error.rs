//! Error types for hive operations

use thiserror::Error;

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    /// A value was stored under `key` with a different shape than the caller expects.
    #[error("Type mismatch for key '{key}': expected {expected}, found {found}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Cache '{name}' is not initialized")]
    Uninitialized { name: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Package mounting errors.
///
/// All of these are startup-time configuration mistakes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MountError {
    #[error("Package name must not be blank")]
    BlankName,

    #[error("Package '{name}' has no route registrar")]
    MissingRegistrar { name: String },

    #[error("Package '{name}' is already mounted")]
    DuplicateName { name: String },
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_mismatch_display() {
        let err = StorageError::TypeMismatch {
            key: "packages".to_string(),
            expected: "package list",
            found: "version",
        };
        let msg = err.to_string();
        assert!(msg.contains("packages"));
        assert!(msg.contains("package list"));
        assert!(msg.contains("version"));
    }

    #[test]
    fn test_config_error_display_missing() {
        let err = ConfigError::MissingRequired {
            field: "HIVE_ROOT_TOKEN".to_string(),
        };
        assert!(err.to_string().contains("HIVE_ROOT_TOKEN"));
    }

    #[test]
    fn test_mount_error_display() {
        let err = MountError::MissingRegistrar {
            name: "links".to_string(),
        };
        assert!(err.to_string().contains("links"));
        assert_eq!(MountError::BlankName.to_string(), "Package name must not be blank");
    }
}
