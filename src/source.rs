//! Where entities come from on a cache miss.
//!
//! The real source issues an HTTP request to the server and maps the XML
//! response onto an entity; that layer lives outside this crate. It plugs in by
//! implementing [`EntitySource`]. [`InMemorySource`] stands in for it in tests
//! and demos.
//!
//! # Error Handling
//!
//! Return `Ok(None)` when the server reports that the entity does not exist.
//! Return `Err(Error::SourceError(..))` for transport or server failures; the
//! manager retries those when asked to.

use crate::entity::BridgeEntity;
use crate::error::{Error, Result};
use crate::key::Lookup;
use dashmap::DashMap;
use futures::future::try_join_all;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::time::Duration;

/// Fetches entities from the server.
#[allow(async_fn_in_trait)]
pub trait EntitySource<E: BridgeEntity>: Send + Sync {
    /// Fetch the entity addressed by `lookup`.
    ///
    /// `seed` is the previously cached instance, if any. Implementations may
    /// copy fields the response does not carry from it into the new value; the
    /// cache itself never merges.
    ///
    /// # Returns
    /// - `Ok(Some(entity))` - Entity found
    /// - `Ok(None)` - Entity not found (not an error)
    /// - `Err(e)` - Server or transport failure
    async fn fetch(&self, lookup: &Lookup, seed: Option<&E>) -> Result<Option<E>>;

    /// Fetch several entities, results in lookup order.
    ///
    /// Default implementation runs `fetch()` for every lookup concurrently,
    /// without seeds, and fails on the first error.
    async fn fetch_many(&self, lookups: &[Lookup]) -> Result<Vec<Option<E>>> {
        try_join_all(lookups.iter().map(|lookup| self.fetch(lookup, None))).await
    }
}

/// In-memory source for tests and demos.
///
/// Holds the "server side" copy of each entity, indexed by id and key, and
/// counts how often it is asked. Failures and latency can be injected to
/// exercise retries and timeouts.
pub struct InMemorySource<E: BridgeEntity> {
    by_id: DashMap<i64, E>,
    ids_by_key: DashMap<String, i64>,
    fetches: AtomicUsize,
    seeded_fetches: AtomicUsize,
    failures: AtomicU32,
    latency: Option<Duration>,
}

impl<E: BridgeEntity> InMemorySource<E> {
    pub fn new() -> Self {
        InMemorySource {
            by_id: DashMap::new(),
            ids_by_key: DashMap::new(),
            fetches: AtomicUsize::new(0),
            seeded_fetches: AtomicUsize::new(0),
            failures: AtomicU32::new(0),
            latency: None,
        }
    }

    /// Delay every fetch by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Store the server copy of `entity`. Entities without an id are ignored.
    pub fn insert(&self, entity: E) {
        let Some(id) = entity.id() else {
            return;
        };
        if let Some(previous) = self.by_id.get(&id).and_then(|previous| previous.value().key()) {
            self.ids_by_key.remove_if(&previous, |_, mapped| *mapped == id);
        }
        if let Some(key) = entity.key() {
            self.ids_by_key.insert(key, id);
        }
        self.by_id.insert(id, entity);
    }

    /// Delete the server copy with `id`.
    pub fn delete(&self, id: i64) {
        if let Some((_, entity)) = self.by_id.remove(&id) {
            if let Some(key) = entity.key() {
                self.ids_by_key.remove_if(&key, |_, mapped| *mapped == id);
            }
        }
    }

    /// Make the next `count` fetches fail with `Error::SourceError`.
    pub fn fail_next(&self, count: u32) {
        self.failures.store(count, Ordering::SeqCst);
    }

    /// Number of fetches served or failed so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Number of fetches that received a seed.
    pub fn seeded_fetch_count(&self) -> usize {
        self.seeded_fetches.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    fn take_failure(&self) -> bool {
        self.failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok()
    }
}

impl<E: BridgeEntity> Default for InMemorySource<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: BridgeEntity> EntitySource<E> for InMemorySource<E> {
    async fn fetch(&self, lookup: &Lookup, seed: Option<&E>) -> Result<Option<E>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if seed.is_some() {
            self.seeded_fetches.fetch_add(1, Ordering::SeqCst);
        }
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.take_failure() {
            return Err(Error::SourceError(format!(
                "injected failure fetching {}",
                lookup.label(E::kind())
            )));
        }

        let id = match lookup {
            Lookup::Id(id) => Some(*id),
            Lookup::Key(key) => self.ids_by_key.get(key).map(|id| *id),
        };
        Ok(id.and_then(|id| self.by_id.get(&id).map(|entity| entity.value().clone())))
    }
}
