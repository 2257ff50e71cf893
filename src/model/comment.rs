//! Comments and tasks.

use crate::entity::BridgeEntity;
use serde::{Deserialize, Serialize};

/// A comment. Comments have no public key of their own; the id doubles as key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub media_type: String,
    pub author: Option<String>,
    pub context_url: Option<String>,
    pub labels: Vec<String>,
}

impl Default for Comment {
    fn default() -> Self {
        Comment {
            id: None,
            title: None,
            content: None,
            media_type: "text/plain".to_string(),
            author: None,
            context_url: None,
            labels: Vec::new(),
        }
    }
}

impl Comment {
    pub fn new(id: i64) -> Self {
        Comment {
            id: Some(id),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>, media_type: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self.media_type = media_type.into();
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn on(mut self, context_url: impl Into<String>) -> Self {
        self.context_url = Some(context_url.into());
        self
    }
}

impl BridgeEntity for Comment {
    fn id(&self) -> Option<i64> {
        self.id
    }

    fn key(&self) -> Option<String> {
        self.id.map(|id| id.to_string())
    }

    fn kind() -> &'static str {
        "comment"
    }

    fn is_identifiable(&self) -> bool {
        self.id.is_some()
    }
}
