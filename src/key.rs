//! Addressing entities by primary id or secondary key.

use crate::entity::BridgeEntity;
use std::fmt;

/// How a caller addresses an entity: by server id or by public key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Lookup {
    /// The server-assigned primary id.
    Id(i64),
    /// The human-readable key (username, group name, URL...).
    Key(String),
}

impl Lookup {
    /// Build a lookup from a public key.
    pub fn key(key: impl Into<String>) -> Self {
        Lookup::Key(key.into())
    }

    /// The lookup to send to the server for `entity`.
    ///
    /// The private id takes precedence over the key, matching
    /// [`BridgeEntity::identifier`]. Returns `None` when the entity cannot be
    /// identified.
    pub fn of<E: BridgeEntity>(entity: &E) -> Option<Self> {
        if !entity.is_identifiable() {
            return None;
        }
        entity.id().map(Lookup::Id).or_else(|| entity.key().map(Lookup::Key))
    }

    /// Label used in logs and metrics, e.g. `member#7` or `member:alice`.
    pub fn label(&self, kind: &str) -> String {
        match self {
            Lookup::Id(id) => LabelBuilder::id(kind, *id),
            Lookup::Key(key) => LabelBuilder::key(kind, key),
        }
    }
}

impl From<i64> for Lookup {
    fn from(id: i64) -> Self {
        Lookup::Id(id)
    }
}

impl From<&str> for Lookup {
    fn from(key: &str) -> Self {
        Lookup::Key(key.to_string())
    }
}

impl From<String> for Lookup {
    fn from(key: String) -> Self {
        Lookup::Key(key)
    }
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookup::Id(id) => write!(f, "#{}", id),
            Lookup::Key(key) => write!(f, "{}", key),
        }
    }
}

/// Builder for the labels stores and managers put in log lines.
pub struct LabelBuilder;

impl LabelBuilder {
    /// Label for an id lookup.
    pub fn id(kind: &str, id: i64) -> String {
        format!("{}#{}", kind, id)
    }

    /// Label for a key lookup.
    pub fn key(kind: &str, key: &str) -> String {
        format!("{}:{}", kind, key)
    }

    /// Label for an entity, using whatever identifies it.
    pub fn entity<E: BridgeEntity>(entity: &E) -> String {
        match Lookup::of(entity) {
            Some(lookup) => lookup.label(E::kind()),
            None => format!("{}:<unidentified>", E::kind()),
        }
    }
}
