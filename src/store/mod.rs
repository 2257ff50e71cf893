//! Per-type entity stores indexed by primary id and secondary key.
//!
//! Every entity kind gets its own [`EntityStore`]. Entries live in a primary
//! index keyed by the server id; a [`KeyResolver`] maps public keys (usernames,
//! group names, URLs) onto those ids. A key lookup is always the two-step
//! `key -> id -> entry` indirection, so one logical entity is never held twice.
//!
//! ```
//! use bridge_cache::model::Member;
//! use bridge_cache::store::{EntityCache, EntityStore};
//!
//! let store = EntityStore::<Member>::new();
//! store.put(Member::new(7).with_username("alice")).unwrap();
//!
//! assert!(store.get(7).is_some());
//! assert!(store.get_by_key("alice").is_some());
//!
//! store.remove("alice");
//! assert!(store.get(7).is_none());
//! ```

mod inmemory;
mod resolver;

pub use inmemory::EntityStore;
pub use resolver::KeyResolver;

use crate::entity::BridgeEntity;
use crate::error::Result;
use crate::key::Lookup;
use std::sync::Arc;
use std::time::Duration;

/// Write time of an entry in milliseconds since the Unix epoch.
///
/// Strictly increasing within one store. Used for change detection only, never
/// for conflict resolution: the last put wins.
pub type Version = u64;

/// Operations a store offers for one entity type.
///
/// Absence is never an error. Entities are shared, not copied: `get` hands out
/// the `Arc` that the last `put` stored.
pub trait EntityCache<E: BridgeEntity>: Send + Sync {
    /// The entity stored under `id`.
    fn get(&self, id: i64) -> Option<Arc<E>>;

    /// The entity whose key is currently mapped to a live entry.
    ///
    /// Unmapped keys and stale mappings both yield `None`.
    fn get_by_key(&self, key: &str) -> Option<Arc<E>>;

    /// Store `entity`, replacing the entry for its id.
    ///
    /// Fails with [`Error::NonIdentifiableEntity`](crate::Error::NonIdentifiableEntity)
    /// when the entity has no id, leaving the store untouched.
    fn put(&self, entity: E) -> Result<Arc<E>>;

    /// Like [`put`](Self::put) with an explicit TTL for this entry.
    fn put_with_ttl(&self, entity: E, ttl: Option<Duration>) -> Result<Arc<E>>;

    /// Write time of the entry currently mapped from `key`.
    fn get_version(&self, key: &str) -> Option<Version>;

    /// Remove the entry addressed by `key`. Unmapped keys are ignored.
    fn remove(&self, key: &str);

    /// Remove the entry stored under `id` together with its key mapping.
    fn remove_by_id(&self, id: i64);

    /// Drop every entry and key mapping at once.
    fn remove_all(&self);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lookup by an id that may be missing.
    fn find(&self, id: Option<i64>) -> Option<Arc<E>> {
        id.and_then(|id| self.get(id))
    }

    /// The cached copy of `entity`.
    ///
    /// Entities that cannot be identified are not looked up. The key is
    /// preferred over the id when both are present.
    fn get_entity(&self, entity: &E) -> Option<Arc<E>> {
        if !entity.is_identifiable() {
            return None;
        }
        match entity.key() {
            Some(key) => self.get_by_key(&key),
            None => self.find(entity.id()),
        }
    }

    /// Dispatch a [`Lookup`] to [`get`](Self::get) or [`get_by_key`](Self::get_by_key).
    fn lookup(&self, lookup: &Lookup) -> Option<Arc<E>> {
        match lookup {
            Lookup::Id(id) => self.get(*id),
            Lookup::Key(key) => self.get_by_key(key),
        }
    }
}
