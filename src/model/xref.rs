//! Cross-references between documents.

use crate::entity::{BridgeEntity, EntityValidity};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the target of an xref is rendered in its source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum XRefType {
    #[default]
    None,
    Embed,
    Transclude,
    Image,
    Math,
    Alternate,
}

impl fmt::Display for XRefType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            XRefType::None => "none",
            XRefType::Embed => "embed",
            XRefType::Transclude => "transclude",
            XRefType::Image => "image",
            XRefType::Math => "math",
            XRefType::Alternate => "alternate",
        };
        f.write_str(text)
    }
}

/// A cross-reference. Like comments, xrefs are only addressable by id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct XRef {
    pub id: Option<i64>,
    pub source_uri_id: Option<i64>,
    pub target_uri_id: Option<i64>,
    pub target_href: Option<String>,
    pub target_media_type: Option<String>,
    pub xref_type: XRefType,
    pub title: Option<String>,
    pub reverse_link: bool,
}

impl Default for XRef {
    fn default() -> Self {
        XRef {
            id: None,
            source_uri_id: None,
            target_uri_id: None,
            target_href: None,
            target_media_type: None,
            xref_type: XRefType::None,
            title: None,
            reverse_link: true,
        }
    }
}

impl XRef {
    pub fn new(id: i64) -> Self {
        XRef {
            id: Some(id),
            ..Default::default()
        }
    }

    pub fn linking(mut self, source_uri_id: i64, target_uri_id: i64) -> Self {
        self.source_uri_id = Some(source_uri_id);
        self.target_uri_id = Some(target_uri_id);
        self
    }

    pub fn with_type(mut self, xref_type: XRefType) -> Self {
        self.xref_type = xref_type;
        self
    }

    pub fn with_target_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.target_media_type = Some(media_type.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

impl BridgeEntity for XRef {
    fn id(&self) -> Option<i64> {
        self.id
    }

    fn key(&self) -> Option<String> {
        self.id.map(|id| id.to_string())
    }

    fn kind() -> &'static str {
        "xref"
    }

    fn is_identifiable(&self) -> bool {
        self.id.is_some()
    }

    fn check_valid(&self) -> EntityValidity {
        match (self.xref_type, self.target_media_type.as_deref()) {
            (XRefType::Image, Some(media_type)) if !media_type.starts_with("image/") => {
                EntityValidity::ImageXrefTargetNotImage
            }
            _ => EntityValidity::Ok,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_xref_must_target_image() {
        let logo = XRef::new(4)
            .linking(10, 11)
            .with_type(XRefType::Image)
            .with_target_media_type("image/png");
        assert!(logo.is_valid());

        let broken = logo.clone().with_target_media_type("application/pdf");
        assert_eq!(broken.check_valid(), EntityValidity::ImageXrefTargetNotImage);

        let embed = broken.with_type(XRefType::Embed);
        assert!(embed.is_valid());
    }

    #[test]
    fn test_xref_identity() {
        let xref = XRef::new(8);
        assert_eq!(xref.key(), Some("8".to_string()));
        assert!(!XRef::default().is_identifiable());
        assert_eq!(XRefType::Transclude.to_string(), "transclude");
    }
}
