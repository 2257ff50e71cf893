//! Groups and projects.

use crate::entity::{exceeds, BridgeEntity, EntityValidity};
use serde::{Deserialize, Serialize};

/// Project names that cannot prefix a group name.
pub const RESERVED_GROUP_NAMES: [&str; 19] = [
    "page",
    "block",
    "tree",
    "uri",
    "fullpage",
    "embed",
    "psadmin",
    "bundle",
    "service",
    "error",
    "weborganic",
    "woconfig",
    "servlet",
    "psdoc",
    "filter",
    "group",
    "home",
    "member",
    "project",
];

/// A group (or project), keyed by its full name, e.g. `acme-marketing`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub owner: Option<String>,
    pub description: Option<String>,
    pub detail_type: Option<String>,
    pub template: Option<String>,
}

impl Group {
    pub fn new(id: i64) -> Self {
        Group {
            id: Some(id),
            ..Default::default()
        }
    }

    /// A group known only by name, not yet resolved against the server.
    pub fn named(name: impl Into<String>) -> Self {
        Group {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_detail_type(mut self, detail_type: impl Into<String>) -> Self {
        self.detail_type = Some(detail_type.into());
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// The project part of the name: everything before the first `-`.
    pub fn project(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(|name| name.split('-').next().unwrap_or(name))
    }
}

/// Whether `name` is acceptable as a group name on the server.
///
/// Names start with a lowercase letter, continue with lowercase letters, digits,
/// `_`, `~` or `-`, never contain `--`, never end with `-silent`, and their project
/// prefix is not reserved.
pub fn is_valid_group_name(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_well = chars.next().is_some_and(|c| c.is_ascii_lowercase());
    let rest_ok = name.len() > 1
        && chars.all(|c| {
            c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '~' | '-')
        });
    let project = name.split('-').next().unwrap_or(name);

    starts_well
        && rest_ok
        && !RESERVED_GROUP_NAMES.contains(&project)
        && !name.ends_with("-silent")
        && !name.contains("--")
}

impl BridgeEntity for Group {
    fn id(&self) -> Option<i64> {
        self.id
    }

    fn key(&self) -> Option<String> {
        self.name.clone()
    }

    fn kind() -> &'static str {
        "group"
    }

    fn check_valid(&self) -> EntityValidity {
        if exceeds(self.name.as_deref(), 60) {
            return EntityValidity::GroupNameIsTooLong;
        }
        if exceeds(self.owner.as_deref(), 100) {
            return EntityValidity::GroupOwnerIsTooLong;
        }
        if exceeds(self.description.as_deref(), 250) {
            return EntityValidity::GroupDescriptionIsTooLong;
        }
        if exceeds(self.detail_type.as_deref(), 150) {
            return EntityValidity::GroupDetailTypeIsTooLong;
        }
        if exceeds(self.template.as_deref(), 60) {
            return EntityValidity::GroupTemplateIsTooLong;
        }
        match self.name.as_deref() {
            Some(name) if is_valid_group_name(name) => EntityValidity::Ok,
            _ => EntityValidity::GroupNameIsInvalid,
        }
    }
}
