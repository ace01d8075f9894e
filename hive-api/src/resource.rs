//! Resource trait implemented by every item type served through the
//! generic CRUD routes.

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{ApiError, ApiResult};

/// An item stored in a package cache and exchanged as JSON.
pub trait Resource: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Human-readable kind used in error messages ("Link", "User", ...).
    const KIND: &'static str;

    /// Presence checks run before an item is stored.
    fn validate(&self) -> ApiResult<()> {
        Ok(())
    }
}

/// Reject a blank string field.
pub fn require_field(field: &str, value: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        Err(ApiError::missing_field(field))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_require_field() {
        assert!(require_field("name", "sd").is_ok());
        let err = require_field("name", "   ").unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingField);
        assert!(err.message.contains("name"));
    }
}
