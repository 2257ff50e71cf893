//! Core entity trait that every cached server resource implements.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trait for entities mirrored from the remote content-management server.
///
/// An entity carries a server-assigned numeric `id` (absent until the server has
/// persisted it) and optionally a human-readable `key` such as a username, group
/// name or canonical URL. Either one is enough to identify the entity remotely,
/// but only entities with an `id` can be stored in an
/// [`EntityStore`](crate::store::EntityStore).
///
/// # Example
///
/// ```
/// use bridge_cache::BridgeEntity;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Serialize, Deserialize)]
/// pub struct Project {
///     pub id: Option<i64>,
///     pub name: Option<String>,
/// }
///
/// impl BridgeEntity for Project {
///     fn id(&self) -> Option<i64> {
///         self.id
///     }
///
///     fn key(&self) -> Option<String> {
///         self.name.clone()
///     }
///
///     fn kind() -> &'static str {
///         "project"
///     }
/// }
/// ```
pub trait BridgeEntity: Send + Sync + Clone + Serialize + DeserializeOwned + 'static {
    /// The private id of the entity in the server database.
    fn id(&self) -> Option<i64>;

    /// The public, human-readable key of the entity, if this kind has one.
    fn key(&self) -> Option<String>;

    /// Name of this entity kind, used to label its store in logs and snapshots.
    ///
    /// Example: "member", "group"
    fn kind() -> &'static str;

    /// Whether the entity can be identified on the server.
    ///
    /// Kinds whose key is only a rendering of the id (comments, xrefs) override
    /// this to require the id.
    fn is_identifiable(&self) -> bool {
        self.id().is_some() || self.key().is_some()
    }

    /// The identifier to use when addressing the server.
    ///
    /// The private id takes precedence over the public key.
    fn identifier(&self) -> Option<String> {
        self.id().map(|id| id.to_string()).or_else(|| self.key())
    }

    /// Check the entity against the server's constraints.
    fn check_valid(&self) -> EntityValidity {
        EntityValidity::Ok
    }

    /// Whether [`check_valid`](Self::check_valid) reports no violation.
    fn is_valid(&self) -> bool {
        self.check_valid() == EntityValidity::Ok
    }
}

/// Outcome of validating an entity against server constraints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityValidity {
    /// The entity appears valid.
    Ok,
    /// Document id longer than 100 characters.
    DocumentDocidIsTooLong,
    /// Document title (or media type) too long.
    DocumentTitleIsTooLong,
    /// Document labels exceed 250 characters once joined.
    DocumentLabelsAreTooLong,
    /// The URI is a folder and cannot be represented as a document.
    DocumentIsAFolder,
    /// Group name longer than 60 characters.
    GroupNameIsTooLong,
    /// Group owner longer than 100 characters.
    GroupOwnerIsTooLong,
    /// Group description longer than 250 characters.
    GroupDescriptionIsTooLong,
    /// Group detail type longer than 150 characters.
    GroupDetailTypeIsTooLong,
    /// Group template longer than 60 characters.
    GroupTemplateIsTooLong,
    /// Group name is reserved or uses an invalid character.
    GroupNameIsInvalid,
    /// Member first name longer than 50 characters.
    MemberFirstnameIsTooLong,
    /// Member surname longer than 50 characters.
    MemberSurnameIsTooLong,
    /// Member username longer than 100 characters.
    MemberUsernameIsTooLong,
    /// Member email longer than 100 characters.
    MemberEmailIsTooLong,
    /// A membership details field longer than 100 characters.
    DetailFieldValueIsTooLong,
    /// An image xref points to something that is not an image.
    ImageXrefTargetNotImage,
}

impl fmt::Display for EntityValidity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            EntityValidity::Ok => "ok",
            EntityValidity::DocumentDocidIsTooLong => "document docid is too long",
            EntityValidity::DocumentTitleIsTooLong => "document title is too long",
            EntityValidity::DocumentLabelsAreTooLong => "document labels are too long",
            EntityValidity::DocumentIsAFolder => "document is a folder",
            EntityValidity::GroupNameIsTooLong => "group name is too long",
            EntityValidity::GroupOwnerIsTooLong => "group owner is too long",
            EntityValidity::GroupDescriptionIsTooLong => "group description is too long",
            EntityValidity::GroupDetailTypeIsTooLong => "group detail type is too long",
            EntityValidity::GroupTemplateIsTooLong => "group template is too long",
            EntityValidity::GroupNameIsInvalid => "group name is invalid",
            EntityValidity::MemberFirstnameIsTooLong => "member firstname is too long",
            EntityValidity::MemberSurnameIsTooLong => "member surname is too long",
            EntityValidity::MemberUsernameIsTooLong => "member username is too long",
            EntityValidity::MemberEmailIsTooLong => "member email is too long",
            EntityValidity::DetailFieldValueIsTooLong => "details field value is too long",
            EntityValidity::ImageXrefTargetNotImage => "image xref target is not an image",
        };
        f.write_str(text)
    }
}

/// True when `value` is present and longer than `max` characters.
pub(crate) fn exceeds(value: Option<&str>, max: usize) -> bool {
    value.is_some_and(|v| v.chars().count() > max)
}
