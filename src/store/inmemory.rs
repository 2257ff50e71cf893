//! In-memory entity store (thread-safe, synchronous).
//!
//! The primary index is a DashMap keyed by id. Writers lock the id's shard
//! through the entry API and update the key index while still holding it, so a
//! put or remove and its key mapping change form one unit. Locks are always
//! taken primary index first, key index second.

use super::{EntityCache, KeyResolver, Version};
use crate::config::CacheConfig;
use crate::entity::BridgeEntity;
use crate::error::{Error, Result};
use crate::key::LabelBuilder;
use crate::observability::{CacheMetrics, NoOpMetrics, StoreCounters, StoreStats};
use crate::serialization::{self, StoreSnapshot};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Entry of the primary index.
struct CachedEntity<E> {
    entity: Arc<E>,
    /// Key the entity carried when it was put.
    key: Option<String>,
    version: Version,
    expires_at: Option<Instant>,
}

impl<E> CachedEntity<E> {
    fn new(entity: Arc<E>, key: Option<String>, version: Version, ttl: Option<Duration>) -> Self {
        CachedEntity {
            entity,
            key,
            version,
            // A TTL beyond what `Instant` can represent never expires.
            expires_at: ttl.and_then(|ttl| Instant::now().checked_add(ttl)),
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Instant::now() > exp)
    }

    fn has_key(&self, key: &str) -> bool {
        self.key.as_deref() == Some(key)
    }
}

struct StoreInner<E> {
    by_id: DashMap<i64, CachedEntity<E>>,
    keys: KeyResolver,
    clock: AtomicU64,
    /// Writers share it, `remove_all` takes it exclusively.
    gate: RwLock<()>,
    ttl: Option<Duration>,
    metrics: Arc<dyn CacheMetrics>,
    counters: StoreCounters,
}

impl<E> StoreInner<E> {
    fn shared_gate(&self) -> RwLockReadGuard<'_, ()> {
        self.gate.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn exclusive_gate(&self) -> RwLockWriteGuard<'_, ()> {
        self.gate.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_version(&self) -> Version {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or_default();
        let advance = |last: Version| last.saturating_add(1).max(now);
        match self
            .clock
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(advance(last)))
        {
            Ok(last) | Err(last) => advance(last),
        }
    }
}

/// Thread-safe store for one entity type.
///
/// Cloning is cheap and yields a handle to the same store. Gets never block each
/// other; puts and removes for the same id are serialized, different ids proceed
/// in parallel unless they share a shard.
///
/// # Example
///
/// ```
/// use bridge_cache::model::Group;
/// use bridge_cache::store::{EntityCache, EntityStore};
///
/// let store = EntityStore::<Group>::new();
/// store.put(Group::new(3).with_name("acme-web")).unwrap();
///
/// let v1 = store.get_version("acme-web").unwrap();
/// store.put(Group::new(3).with_name("acme-web").with_owner("ACME")).unwrap();
/// assert!(store.get_version("acme-web").unwrap() > v1);
/// ```
pub struct EntityStore<E: BridgeEntity> {
    inner: Arc<StoreInner<E>>,
}

impl<E: BridgeEntity> EntityStore<E> {
    /// Create an empty store with eternal entries and no metrics.
    pub fn new() -> Self {
        Self::with_config(&CacheConfig::default(), Arc::new(NoOpMetrics))
    }

    /// Create an empty store sized and expired according to `config`.
    pub fn with_config(config: &CacheConfig, metrics: Arc<dyn CacheMetrics>) -> Self {
        EntityStore {
            inner: Arc::new(StoreInner {
                by_id: DashMap::with_capacity(config.capacity_hint),
                keys: KeyResolver::with_capacity(config.capacity_hint),
                clock: AtomicU64::new(0),
                gate: RwLock::new(()),
                ttl: config.ttl_for(E::kind()),
                metrics,
                counters: StoreCounters::default(),
            }),
        }
    }

    /// Entity kind held by this store.
    pub fn kind(&self) -> &'static str {
        E::kind()
    }

    /// TTL applied by [`put`](EntityCache::put), `None` for eternal entries.
    pub fn default_ttl(&self) -> Option<Duration> {
        self.inner.ttl
    }

    /// Whether both handles point to the same store.
    pub fn same_store(&self, other: &EntityStore<E>) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Get statistics about the store.
    pub fn stats(&self) -> StoreStats {
        let mut stats = StoreStats {
            kind: E::kind().to_string(),
            entries: self.inner.by_id.len(),
            key_mappings: self.inner.keys.len(),
            expired_entries: self
                .inner
                .by_id
                .iter()
                .filter(|entry| entry.is_expired())
                .count(),
            ..Default::default()
        };
        self.inner.counters.fill(&mut stats);
        stats
    }

    /// Print store statistics to debug log.
    pub fn log_stats(&self) {
        let stats = self.stats();
        debug!(
            "Store Stats [{}]: {} entries ({} expired), {} keys, {} hits, {} misses",
            stats.kind,
            stats.entries,
            stats.expired_entries,
            stats.key_mappings,
            stats.hits,
            stats.misses
        );
    }

    /// Serialize every live entity, in write order, into a snapshot.
    ///
    /// The snapshot also lists the entries their key currently resolves to, so
    /// [`import`](Self::import) restores key lookups as well as id lookups.
    pub fn export(&self) -> Result<Vec<u8>> {
        let keys = &self.inner.keys;
        let mut live: Vec<(Version, Arc<E>, bool)> = self
            .inner
            .by_id
            .iter()
            .filter(|entry| !entry.is_expired())
            .map(|entry| {
                let owns_key = entry
                    .key
                    .as_deref()
                    .is_some_and(|key| keys.resolve(key) == Some(*entry.key()));
                (entry.version, Arc::clone(&entry.entity), owns_key)
            })
            .collect();
        live.sort_by_key(|(version, _, _)| *version);

        let mut snapshot = StoreSnapshot {
            kind: E::kind().to_string(),
            entities: Vec::with_capacity(live.len()),
            key_owners: Vec::new(),
        };
        for (_, entity, owns_key) in live {
            if owns_key {
                snapshot.key_owners.extend(entity.id());
            }
            snapshot.entities.push((*entity).clone());
        }

        let bytes = serialization::encode(&snapshot)?;
        info!(
            "Exported {} {} entities ({} bytes)",
            snapshot.entities.len(),
            E::kind(),
            bytes.len()
        );
        Ok(bytes)
    }

    /// Put every entity of a snapshot written by [`export`](Self::export).
    ///
    /// Entities are put in their original write order and keys the exporting
    /// store no longer resolved to an entry are dropped again. Imported entries
    /// get fresh versions. Returns the number of entities put.
    pub fn import(&self, bytes: &[u8]) -> Result<usize> {
        let snapshot: StoreSnapshot<E> = serialization::decode(bytes)?;
        if snapshot.kind != E::kind() {
            return Err(Error::InvalidSnapshot(format!(
                "snapshot of the {} store cannot be imported into the {} store",
                snapshot.kind,
                E::kind()
            )));
        }

        let count = snapshot.entities.len();
        let owners: HashSet<i64> = snapshot.key_owners.iter().copied().collect();
        let mut unowned = Vec::new();
        for entity in snapshot.entities {
            let entity = self.put(entity)?;
            if let (Some(id), Some(key)) = (entity.id(), entity.key()) {
                if !owners.contains(&id) {
                    unowned.push((id, key));
                }
            }
        }
        for (id, key) in unowned {
            let _gate = self.inner.shared_gate();
            if let Some(entry) = self.inner.by_id.get(&id) {
                if entry.has_key(&key) {
                    self.inner.keys.invalidate_if(&key, id);
                }
            }
        }
        info!("Imported {} {} entities", count, E::kind());
        Ok(count)
    }

    /// The live entry under `id`, optionally required to carry `key`.
    fn live(&self, id: i64, key: Option<&str>) -> Option<(Arc<E>, Version)> {
        match self.inner.by_id.get(&id) {
            None => return None,
            Some(entry) => {
                if key.is_some_and(|key| !entry.has_key(key)) {
                    return None;
                }
                if !entry.is_expired() {
                    return Some((Arc::clone(&entry.entity), entry.version));
                }
            }
        }
        self.evict_expired(id);
        None
    }

    fn evict_expired(&self, id: i64) {
        let _gate = self.inner.shared_gate();
        if let Entry::Occupied(slot) = self.inner.by_id.entry(id) {
            if slot.get().is_expired() {
                if let Some(key) = slot.get().key.as_deref() {
                    self.inner.keys.invalidate_if(key, id);
                }
                slot.remove();
                debug!("✓ Store EVICT {} (expired)", LabelBuilder::id(E::kind(), id));
            }
        }
    }

    fn observe(&self, label: &str, found: Option<Arc<E>>, started: Instant) -> Option<Arc<E>> {
        match &found {
            Some(_) => {
                self.inner.counters.hit();
                self.inner.metrics.record_hit(label, started.elapsed());
                debug!("✓ Store GET {} -> HIT", label);
            }
            None => {
                self.inner.counters.miss();
                self.inner.metrics.record_miss(label, started.elapsed());
                debug!("✓ Store GET {} -> MISS", label);
            }
        }
        found
    }

    fn removed(&self, label: &str, started: Instant) {
        self.inner.counters.removal();
        self.inner.metrics.record_remove(label, started.elapsed());
        debug!("✓ Store REMOVE {}", label);
    }
}

impl<E: BridgeEntity> EntityCache<E> for EntityStore<E> {
    fn get(&self, id: i64) -> Option<Arc<E>> {
        let started = Instant::now();
        let found = self.live(id, None).map(|(entity, _)| entity);
        self.observe(&LabelBuilder::id(E::kind(), id), found, started)
    }

    fn get_by_key(&self, key: &str) -> Option<Arc<E>> {
        let started = Instant::now();
        let found = self
            .inner
            .keys
            .resolve(key)
            .and_then(|id| self.live(id, Some(key)))
            .map(|(entity, _)| entity);
        self.observe(&LabelBuilder::key(E::kind(), key), found, started)
    }

    fn put(&self, entity: E) -> Result<Arc<E>> {
        let ttl = self.inner.ttl;
        self.put_with_ttl(entity, ttl)
    }

    fn put_with_ttl(&self, entity: E, ttl: Option<Duration>) -> Result<Arc<E>> {
        let started = Instant::now();
        let Some(id) = entity.id() else {
            let label = LabelBuilder::entity(&entity);
            self.inner
                .metrics
                .record_error(&label, "entity has no primary id");
            warn!("Rejected put of {}: entity has no primary id", label);
            return Err(Error::NonIdentifiableEntity(format!(
                "{} has no primary id",
                label
            )));
        };

        let key = entity.key();
        let entity = Arc::new(entity);
        let inner = &self.inner;
        let _gate = inner.shared_gate();

        let entry = inner.by_id.entry(id);
        let cached = CachedEntity::new(Arc::clone(&entity), key.clone(), inner.next_version(), ttl);
        let (slot, previous_key) = match entry {
            Entry::Occupied(mut slot) => {
                let previous = slot.insert(cached);
                (slot.into_ref(), previous.key)
            }
            Entry::Vacant(slot) => (slot.insert(cached), None),
        };
        if let Some(previous_key) = previous_key.filter(|previous| Some(previous) != key.as_ref()) {
            inner.keys.invalidate_if(&previous_key, id);
        }
        if let Some(key) = &key {
            inner.keys.update(key, id);
        }
        drop(slot);

        let label = LabelBuilder::id(E::kind(), id);
        inner.counters.put();
        inner.metrics.record_put(&label, started.elapsed());
        match ttl {
            Some(ttl) => debug!("✓ Store PUT {} (TTL: {:?})", label, ttl),
            None => debug!("✓ Store PUT {}", label),
        }
        Ok(entity)
    }

    fn get_version(&self, key: &str) -> Option<Version> {
        let id = self.inner.keys.resolve(key)?;
        self.live(id, Some(key)).map(|(_, version)| version)
    }

    fn remove(&self, key: &str) {
        let started = Instant::now();
        let inner = &self.inner;
        let _gate = inner.shared_gate();

        let Some(id) = inner.keys.resolve(key) else {
            debug!("✓ Store REMOVE {} (not mapped)", LabelBuilder::key(E::kind(), key));
            return;
        };

        match inner.by_id.entry(id) {
            Entry::Occupied(slot) if slot.get().has_key(key) => {
                inner.keys.invalidate_if(key, id);
                slot.remove();
                self.removed(&LabelBuilder::key(E::kind(), key), started);
            }
            _ => {
                // The key moved on or its entry is gone: only the mapping is dead.
                inner.keys.invalidate_if(key, id);
                debug!("✓ Store REMOVE {} (stale mapping)", LabelBuilder::key(E::kind(), key));
            }
        }
    }

    fn remove_by_id(&self, id: i64) {
        let started = Instant::now();
        let inner = &self.inner;
        let _gate = inner.shared_gate();

        if let Entry::Occupied(slot) = inner.by_id.entry(id) {
            if let Some(key) = slot.get().key.as_deref() {
                inner.keys.invalidate_if(key, id);
            }
            slot.remove();
            self.removed(&LabelBuilder::id(E::kind(), id), started);
        }
    }

    fn remove_all(&self) {
        let inner = &self.inner;
        let _gate = inner.exclusive_gate();
        let entries = inner.by_id.len();
        inner.by_id.clear();
        inner.keys.clear();
        inner.metrics.record_flush(E::kind(), entries);
        debug!("✓ Store FLUSH {} ({} entries)", E::kind(), entries);
    }

    fn len(&self) -> usize {
        self.inner.by_id.len()
    }
}

impl<E: BridgeEntity> Clone for EntityStore<E> {
    fn clone(&self) -> Self {
        EntityStore {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: BridgeEntity> Default for EntityStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: BridgeEntity> fmt::Debug for EntityStore<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityStore")
            .field("kind", &E::kind())
            .field("entries", &self.inner.by_id.len())
            .field("key_mappings", &self.inner.keys.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Comment, Group, Member};
    use crate::observability::ExpiryPolicy;
    use std::thread;

    fn alice(id: i64) -> Member {
        Member::new(id).with_username("alice")
    }

    #[test]
    fn test_put_and_get_by_id_and_key() {
        let store = EntityStore::<Member>::new();
        let stored = store.put(alice(7).with_email("alice@example.org")).unwrap();

        let by_id = store.get(7).unwrap();
        let by_key = store.get_by_key("alice").unwrap();
        assert!(Arc::ptr_eq(&stored, &by_id));
        assert!(Arc::ptr_eq(&by_id, &by_key));
        assert_eq!(by_id.email.as_deref(), Some("alice@example.org"));
    }

    #[test]
    fn test_get_missing() {
        let store = EntityStore::<Member>::new();
        assert!(store.get(1).is_none());
        assert!(store.get_by_key("nobody").is_none());
        assert!(store.find(None).is_none());
        assert!(store.get_version("nobody").is_none());
    }

    #[test]
    fn test_put_without_id_is_rejected() {
        let store = EntityStore::<Member>::new();
        let result = store.put(Member::with_only_username("ghost"));

        assert!(matches!(result, Err(Error::NonIdentifiableEntity(_))));
        assert!(store.get_by_key("ghost").is_none());
        assert!(store.is_empty());
        assert_eq!(store.stats().key_mappings, 0);
    }

    #[test]
    fn test_last_write_wins_without_merge() {
        let store = EntityStore::<Member>::new();
        store.put(alice(7).with_email("alice@example.org")).unwrap();
        store.put(alice(7).with_name("Alice", "Liddell")).unwrap();

        let current = store.get(7).unwrap();
        assert_eq!(current.firstname.as_deref(), Some("Alice"));
        assert_eq!(current.email, None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_rename_drops_old_key() {
        let store = EntityStore::<Group>::new();
        store.put(Group::new(3).with_name("acme-web")).unwrap();
        store.put(Group::new(3).with_name("acme-site")).unwrap();

        assert!(store.get_by_key("acme-web").is_none());
        assert_eq!(store.get_by_key("acme-site").unwrap().id, Some(3));
        assert_eq!(store.stats().key_mappings, 1);
    }

    #[test]
    fn test_key_reassigned_to_other_id() {
        let store = EntityStore::<Member>::new();
        store.put(alice(1)).unwrap();
        store.put(alice(2)).unwrap();

        assert_eq!(store.get_by_key("alice").unwrap().id, Some(2));
        assert_eq!(store.get(1).unwrap().id, Some(1));

        // Removing by key only touches the entry the key resolves to.
        store.remove("alice");
        assert!(store.get(2).is_none());
        assert!(store.get(1).is_some());
        assert!(store.get_by_key("alice").is_none());
    }

    #[test]
    fn test_stale_mapping_is_not_a_hit() {
        let store = EntityStore::<Member>::new();
        store.put(alice(1)).unwrap();
        store.put(alice(2)).unwrap();
        // Entry 2 renamed: "alice" still maps to 2 but 2 no longer carries it.
        store.put(Member::new(2).with_username("alicia")).unwrap();

        assert!(store.get_by_key("alice").is_none());
        assert!(store.get_version("alice").is_none());

        store.remove("alice");
        assert!(store.get(1).is_some());
        assert!(store.get(2).is_some());
    }

    #[test]
    fn test_remove_by_key() {
        let store = EntityStore::<Member>::new();
        store.put(Member::new(7).with_username("bob")).unwrap();
        store.put(alice(8)).unwrap();

        store.remove("bob");
        assert!(store.get_by_key("bob").is_none());
        assert!(store.get(7).is_none());

        store.remove("nonexistent-key");
        assert!(store.get(8).is_some());
        assert_eq!(store.stats().removals, 1);
    }

    #[test]
    fn test_remove_by_id() {
        let store = EntityStore::<Member>::new();
        store.put(alice(7)).unwrap();
        store.remove_by_id(7);
        store.remove_by_id(99);

        assert!(store.get_by_key("alice").is_none());
        assert_eq!(store.stats().key_mappings, 0);
    }

    #[test]
    fn test_remove_all() {
        let store = EntityStore::<Member>::new();
        for id in 1..=5 {
            store
                .put(Member::new(id).with_username(format!("user{}", id)))
                .unwrap();
        }

        store.remove_all();
        assert!(store.is_empty());
        for id in 1..=5 {
            assert!(store.get(id).is_none());
            assert!(store.get_by_key(&format!("user{}", id)).is_none());
        }
    }

    #[test]
    fn test_versions_strictly_increase() {
        let store = EntityStore::<Member>::new();
        store.put(alice(7)).unwrap();
        let first = store.get_version("alice").unwrap();
        store.put(alice(7)).unwrap();
        let second = store.get_version("alice").unwrap();

        assert!(second > first);
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_millis() as u64;
        assert!(second <= now + 2);
    }

    #[test]
    fn test_get_entity_prefers_key() {
        let store = EntityStore::<Member>::new();
        store.put(alice(7)).unwrap();

        assert!(store.get_entity(&Member::with_only_username("alice")).is_some());
        assert!(store.get_entity(&Member::new(7)).is_some());
        // Key wins over id: this key is unknown even though id 7 is cached.
        assert!(store
            .get_entity(&Member::new(7).with_username("carol"))
            .is_none());
        assert!(store.get_entity(&Member::default()).is_none());
    }

    #[test]
    fn test_comment_keyed_by_id() {
        let store = EntityStore::<Comment>::new();
        store.put(Comment::new(55).with_title("Typo")).unwrap();
        assert!(store.get_by_key("55").is_some());
        assert!(store.get_entity(&Comment::new(55)).is_some());
    }

    #[test]
    fn test_expired_entries_are_evicted() {
        let store = EntityStore::<Member>::new();
        store
            .put_with_ttl(alice(7), Some(Duration::from_millis(20)))
            .unwrap();
        store.put(Member::new(8).with_username("bob")).unwrap();
        assert!(store.get_by_key("alice").is_some());

        thread::sleep(Duration::from_millis(50));
        assert_eq!(store.stats().expired_entries, 1);
        assert!(store.get(7).is_none());
        assert!(store.get_by_key("alice").is_none());
        assert!(store.get(8).is_some());
        assert_eq!(store.len(), 1);
        assert_eq!(store.stats().key_mappings, 1);
    }

    #[test]
    fn test_unrepresentable_ttl_never_expires() {
        let store = EntityStore::<Member>::new();
        store.put_with_ttl(alice(7), Some(Duration::MAX)).unwrap();
        assert!(store.get_by_key("alice").is_some());
        assert_eq!(store.stats().expired_entries, 0);
    }

    #[test]
    fn test_config_ttl_applies_per_kind() {
        let config = CacheConfig::default().with_expiry(ExpiryPolicy::Fixed(Duration::from_secs(60)));
        let store = EntityStore::<Member>::with_config(&config, Arc::new(NoOpMetrics));
        assert_eq!(store.default_ttl(), Some(Duration::from_secs(60)));
        assert_eq!(EntityStore::<Member>::new().default_ttl(), None);
    }

    #[test]
    fn test_clones_share_state() {
        let store = EntityStore::<Member>::new();
        let handle = store.clone();
        handle.put(alice(7)).unwrap();

        assert!(store.same_store(&handle));
        assert!(!store.same_store(&EntityStore::new()));
        assert!(store.get(7).is_some());
    }

    #[test]
    fn test_stats_counters() {
        let store = EntityStore::<Member>::new();
        store.put(alice(7)).unwrap();
        store.get(7);
        store.get_by_key("alice");
        store.get(8);
        store.log_stats();

        let stats = store.stats();
        assert_eq!(stats.kind, "member");
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.puts, 1);
    }

    #[test]
    fn test_export_import() {
        let store = EntityStore::<Member>::new();
        store.put(alice(2)).unwrap();
        store.put(Member::new(1).with_username("bob")).unwrap();
        let bytes = store.export().unwrap();

        let restored = EntityStore::<Member>::new();
        assert_eq!(restored.import(&bytes).unwrap(), 2);
        assert_eq!(restored.get_by_key("alice").unwrap().id, Some(2));
        assert_eq!(restored.get(1).unwrap().username.as_deref(), Some("bob"));
    }

    #[test]
    fn test_import_replays_write_order() {
        let store = EntityStore::<Member>::new();
        store.put(alice(3)).unwrap();
        store.put(alice(1)).unwrap();
        assert_eq!(store.get_by_key("alice").unwrap().id, Some(1));

        let restored = EntityStore::<Member>::new();
        restored.import(&store.export().unwrap()).unwrap();
        assert_eq!(restored.get_by_key("alice").unwrap().id, Some(1));
        assert!(restored.get(3).is_some());
    }

    #[test]
    fn test_import_keeps_released_keys_unmapped() {
        let store = EntityStore::<Member>::new();
        store.put(alice(1)).unwrap();
        store.put(alice(2)).unwrap();
        store.put(Member::new(2).with_username("bob")).unwrap();
        assert!(store.get_by_key("alice").is_none());

        let restored = EntityStore::<Member>::new();
        restored.import(&store.export().unwrap()).unwrap();
        assert!(restored.get_by_key("alice").is_none());
        assert_eq!(restored.get_by_key("bob").unwrap().id, Some(2));
        assert_eq!(restored.get(1).unwrap().username.as_deref(), Some("alice"));
    }

    #[test]
    fn test_import_rejects_other_kind() {
        let groups = EntityStore::<Group>::new();
        groups.put(Group::new(1).with_name("acme-web")).unwrap();
        let bytes = groups.export().unwrap();

        let members = EntityStore::<Member>::new();
        assert!(matches!(
            members.import(&bytes),
            Err(Error::InvalidSnapshot(_))
        ));
        assert!(members.is_empty());
    }

    #[test]
    fn test_concurrent_puts_same_id_leave_one_writer() {
        let store = EntityStore::<Member>::new();
        let handles: Vec<_> = (0..8)
            .map(|writer| {
                let store = store.clone();
                thread::spawn(move || {
                    for round in 0..100 {
                        let name = format!("w{}-{}", writer, round);
                        store
                            .put(Member::new(1).with_username(name.clone()).with_email(name))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let current = store.get(1).unwrap();
        assert_eq!(current.username, current.email);
        let username = current.username.clone().unwrap();
        assert!(store.get_by_key(&username).is_some());
        assert_eq!(store.len(), 1);
    }
}
