//! Documents addressed by URI.

use crate::entity::{exceeds, BridgeEntity, EntityValidity};
use serde::{Deserialize, Serialize};

/// A document, keyed by its canonical URL.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: Option<i64>,
    pub url: Option<String>,
    pub docid: Option<String>,
    pub title: Option<String>,
    pub media_type: Option<String>,
    pub labels: Vec<String>,
}

impl Document {
    pub fn new(id: i64) -> Self {
        Document {
            id: Some(id),
            ..Default::default()
        }
    }

    pub fn at(url: impl Into<String>) -> Self {
        Document {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_docid(mut self, docid: impl Into<String>) -> Self {
        self.docid = Some(docid.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    fn labels_too_long(&self) -> bool {
        let mut length = 0;
        self.labels.iter().any(|label| {
            length += label.chars().count() + 1;
            length > 250
        })
    }
}

impl BridgeEntity for Document {
    fn id(&self) -> Option<i64> {
        self.id
    }

    fn key(&self) -> Option<String> {
        self.url.clone()
    }

    fn kind() -> &'static str {
        "document"
    }

    fn check_valid(&self) -> EntityValidity {
        if exceeds(self.docid.as_deref(), 100) {
            return EntityValidity::DocumentDocidIsTooLong;
        }
        if exceeds(self.media_type.as_deref(), 100) || exceeds(self.title.as_deref(), 250) {
            return EntityValidity::DocumentTitleIsTooLong;
        }
        if self.labels_too_long() {
            return EntityValidity::DocumentLabelsAreTooLong;
        }
        if self.media_type.as_deref() == Some("folder") {
            return EntityValidity::DocumentIsAFolder;
        }
        EntityValidity::Ok
    }
}
