//! Memberships: a member in a group.

use super::{Group, Member};
use crate::entity::{exceeds, BridgeEntity, EntityValidity};
use serde::{Deserialize, Serialize};

/// A membership, keyed by `"{group name}/{username}"`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Membership {
    pub id: Option<i64>,
    pub group: Option<Group>,
    pub member: Option<Member>,
    pub role: Option<String>,
    pub listed: bool,
    /// Values of the group's custom details fields, in field order.
    pub details: Vec<String>,
}

impl Default for Membership {
    fn default() -> Self {
        Membership {
            id: None,
            group: None,
            member: None,
            role: None,
            listed: true,
            details: Vec::new(),
        }
    }
}

impl Membership {
    pub fn new(id: i64) -> Self {
        Membership {
            id: Some(id),
            ..Default::default()
        }
    }

    pub fn between(member: Member, group: Group) -> Self {
        Membership {
            group: Some(group),
            member: Some(member),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_group(mut self, group: Group) -> Self {
        self.group = Some(group);
        self
    }

    pub fn with_member(mut self, member: Member) -> Self {
        self.member = Some(member);
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_detail(mut self, value: impl Into<String>) -> Self {
        self.details.push(value.into());
        self
    }
}

impl BridgeEntity for Membership {
    fn id(&self) -> Option<i64> {
        self.id
    }

    fn key(&self) -> Option<String> {
        let group = self.group.as_ref()?.key()?;
        let member = self.member.as_ref()?.key()?;
        Some(format!("{}/{}", group, member))
    }

    fn kind() -> &'static str {
        "membership"
    }

    fn is_identifiable(&self) -> bool {
        if self.id.is_some() {
            return true;
        }
        match (&self.group, &self.member) {
            (Some(group), Some(member)) => group.is_identifiable() && member.is_identifiable(),
            _ => false,
        }
    }

    /// Only the membership's own id; the pair is not a server identifier.
    fn identifier(&self) -> Option<String> {
        self.id.map(|id| id.to_string())
    }

    fn check_valid(&self) -> EntityValidity {
        if self.details.iter().any(|value| exceeds(Some(value.as_str()), 100)) {
            EntityValidity::DetailFieldValueIsTooLong
        } else {
            EntityValidity::Ok
        }
    }
}
