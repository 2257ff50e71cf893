//! One store per entity type, built on first use.

use crate::config::CacheConfig;
use crate::entity::BridgeEntity;
use crate::observability::{CacheMetrics, NoOpMetrics, StoreStats};
use crate::store::{EntityCache, EntityStore};
use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::sync::{Arc, OnceLock};

/// Type-erased view of an [`EntityStore`] for registry-wide operations.
trait ErasedStore: Send + Sync {
    fn kind(&self) -> &'static str;
    fn remove_all(&self);
    fn stats(&self) -> StoreStats;
    fn as_any(&self) -> &dyn Any;
}

impl<E: BridgeEntity> ErasedStore for EntityStore<E> {
    fn kind(&self) -> &'static str {
        E::kind()
    }

    fn remove_all(&self) {
        EntityCache::remove_all(self);
    }

    fn stats(&self) -> StoreStats {
        EntityStore::stats(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct RegistryInner {
    /// Shared by every registry derived with [`CacheRegistry::with_metrics`].
    stores: Arc<DashMap<TypeId, Arc<dyn ErasedStore>>>,
    config: CacheConfig,
    metrics: Arc<dyn CacheMetrics>,
}

/// Hands out the shared [`EntityStore`] of each entity type.
///
/// Requesting a store for a type that already has one returns a handle to the
/// existing store, so every caller holding the same registry sees one cache per
/// type. Tests build a fresh registry each; code that cannot have one injected
/// uses [`CacheRegistry::global`].
///
/// # Example
///
/// ```
/// use bridge_cache::model::Member;
/// use bridge_cache::store::EntityCache;
/// use bridge_cache::CacheRegistry;
///
/// let registry = CacheRegistry::new();
/// registry.store::<Member>().put(Member::new(7).with_username("alice")).unwrap();
///
/// assert!(registry.store::<Member>().get_by_key("alice").is_some());
/// ```
#[derive(Clone)]
pub struct CacheRegistry {
    inner: Arc<RegistryInner>,
}

impl CacheRegistry {
    /// Create a registry with the default configuration.
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Create a registry whose stores follow `config`.
    pub fn with_config(config: CacheConfig) -> Self {
        CacheRegistry {
            inner: Arc::new(RegistryInner {
                stores: Arc::new(DashMap::new()),
                config,
                metrics: Arc::new(NoOpMetrics),
            }),
        }
    }

    /// Set the metrics handler of every store built from now on.
    ///
    /// The returned registry shares its stores with `self` and with every clone
    /// of it, so each type still has one store. Stores that already exist keep
    /// their handler; call this before the first [`store`](Self::store).
    pub fn with_metrics(self, metrics: Arc<dyn CacheMetrics>) -> Self {
        CacheRegistry {
            inner: Arc::new(RegistryInner {
                stores: Arc::clone(&self.inner.stores),
                config: self.inner.config.clone(),
                metrics,
            }),
        }
    }

    /// The process-wide registry.
    pub fn global() -> &'static CacheRegistry {
        static GLOBAL: OnceLock<CacheRegistry> = OnceLock::new();
        GLOBAL.get_or_init(CacheRegistry::new)
    }

    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    /// The store for `E`, created on first request.
    pub fn store<E: BridgeEntity>(&self) -> EntityStore<E> {
        let erased = self
            .inner
            .stores
            .entry(TypeId::of::<E>())
            .or_insert_with(|| {
                info!("Creating {} store", E::kind());
                let store: Arc<dyn ErasedStore> = Arc::new(EntityStore::<E>::with_config(
                    &self.inner.config,
                    Arc::clone(&self.inner.metrics),
                ));
                store
            })
            .clone();

        match erased.as_any().downcast_ref::<EntityStore<E>>() {
            Some(store) => store.clone(),
            None => unreachable!("store registered under the TypeId of {}", E::kind()),
        }
    }

    /// Flush every store. Handles stay valid and see the stores empty.
    pub fn remove_all(&self) {
        let stores: Vec<Arc<dyn ErasedStore>> = self
            .inner
            .stores
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        for store in &stores {
            store.remove_all();
        }
        warn!("Flushed {} entity stores", stores.len());
    }

    /// Kinds of the stores built so far, sorted.
    pub fn kinds(&self) -> Vec<&'static str> {
        let mut kinds: Vec<&'static str> = self
            .inner
            .stores
            .iter()
            .map(|entry| entry.value().kind())
            .collect();
        kinds.sort_unstable();
        kinds
    }

    /// Statistics of every store built so far, sorted by kind.
    pub fn stats(&self) -> Vec<StoreStats> {
        let mut stats: Vec<StoreStats> = self
            .inner
            .stores
            .iter()
            .map(|entry| entry.value().stats())
            .collect();
        stats.sort_by(|a, b| a.kind.cmp(&b.kind));
        stats
    }
}

impl Default for CacheRegistry {
    fn default() -> Self {
        Self::new()
    }
}
