//! Bookmarked links.

use serde::{Deserialize, Serialize};

use super::CrudPackage;
use crate::error::ApiResult;
use crate::resource::{require_field, Resource};

pub const PACKAGE: &str = "links";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub active: bool,
}

impl Resource for Link {
    const KIND: &'static str = "Link";

    fn validate(&self) -> ApiResult<()> {
        require_field("name", &self.name)?;
        require_field("url", &self.url)
    }
}

pub fn package() -> CrudPackage<Link> {
    CrudPackage::new(PACKAGE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_requires_url() {
        let link = Link {
            name: "sd".to_string(),
            url: String::new(),
            active: true,
        };
        assert!(link.validate().is_err());
    }

    #[test]
    fn test_active_defaults_to_false() -> Result<(), serde_json::Error> {
        let link: Link = serde_json::from_str(r#"{"name":"sd","url":"https://example.com"}"#)?;
        assert!(!link.active);
        Ok(())
    }
}
