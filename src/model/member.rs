//! Members (user accounts).

use crate::entity::{exceeds, BridgeEntity, EntityValidity};
use serde::{Deserialize, Serialize};

/// A member, keyed by username.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: Option<i64>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub firstname: Option<String>,
    pub surname: Option<String>,
    pub activated: bool,
}

impl Member {
    pub fn new(id: i64) -> Self {
        Member {
            id: Some(id),
            ..Default::default()
        }
    }

    /// A member known only by username.
    pub fn with_only_username(username: impl Into<String>) -> Self {
        Member {
            username: Some(username.into()),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_name(mut self, firstname: impl Into<String>, surname: impl Into<String>) -> Self {
        self.firstname = Some(firstname.into());
        self.surname = Some(surname.into());
        self
    }

    pub fn with_activated(mut self, activated: bool) -> Self {
        self.activated = activated;
        self
    }
}

impl BridgeEntity for Member {
    fn id(&self) -> Option<i64> {
        self.id
    }

    fn key(&self) -> Option<String> {
        self.username.clone()
    }

    fn kind() -> &'static str {
        "member"
    }

    fn check_valid(&self) -> EntityValidity {
        if exceeds(self.firstname.as_deref(), 50) {
            EntityValidity::MemberFirstnameIsTooLong
        } else if exceeds(self.surname.as_deref(), 50) {
            EntityValidity::MemberSurnameIsTooLong
        } else if exceeds(self.username.as_deref(), 100) {
            EntityValidity::MemberUsernameIsTooLong
        } else if exceeds(self.email.as_deref(), 100) {
            EntityValidity::MemberEmailIsTooLong
        } else {
            EntityValidity::Ok
        }
    }
}
