//! Read-through / write-through manager over a store and a source.

use crate::entity::{BridgeEntity, EntityValidity};
use crate::error::{Error, Result};
use crate::key::{LabelBuilder, Lookup};
use crate::registry::CacheRegistry;
use crate::source::EntitySource;
use crate::store::{EntityCache, EntityStore};
use crate::strategy::CacheStrategy;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Per-operation overrides.
///
/// Setup-time behaviour (expiry, metrics) comes from the
/// [`CacheRegistry`] the manager's store belongs to. `OperationConfig` adjusts a
/// single lookup.
///
/// # Example
///
/// ```ignore
/// use bridge_cache::OperationConfig;
/// use std::time::Duration;
///
/// let config = OperationConfig::default()
///     .with_ttl(Duration::from_secs(300))
///     .with_retry(3)
///     .with_timeout(Duration::from_secs(5));
///
/// manager.get_with_config(&lookup, CacheStrategy::Refresh, config).await?;
/// ```
#[derive(Clone, Debug, Default)]
pub struct OperationConfig {
    /// TTL for an entity put by this operation.
    ///
    /// - **If `Some(duration)`**: Use this override (takes precedence)
    /// - **If `None`**: Fall back to the store's expiry policy
    pub ttl_override: Option<Duration>,

    /// Number of retry attempts after a retryable failure (0 = no retry).
    ///
    /// Retries back off exponentially: 100ms, 200ms, 400ms...
    pub retry_count: u32,

    /// Upper bound for each fetch from the source.
    pub timeout: Option<Duration>,
}

impl OperationConfig {
    /// Override TTL for this operation.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl_override = Some(ttl);
        self
    }

    /// Set retry count for this operation.
    pub fn with_retry(mut self, count: u32) -> Self {
        self.retry_count = count;
        self
    }

    /// Bound each fetch by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Longest wait between two attempts.
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Delay after the `attempt`-th failure: 100ms, 200ms, 400ms... capped at
/// [`MAX_BACKOFF`].
fn backoff(attempt: u32) -> Duration {
    2_u64
        .checked_pow(attempt.saturating_sub(1))
        .and_then(|factor| factor.checked_mul(100))
        .map_or(MAX_BACKOFF, |millis| Duration::from_millis(millis).min(MAX_BACKOFF))
}

/// Combines the store for `E` with the source that fills it.
///
/// This is the cache protocol of a server-side manager: check the store, fetch on
/// a miss, put what came back, and mirror successful remote writes with
/// [`record`](Self::record).
///
/// # Example
///
/// ```
/// use bridge_cache::model::Member;
/// use bridge_cache::source::InMemorySource;
/// use bridge_cache::{CacheRegistry, CacheStrategy, EntityManager, Lookup};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> bridge_cache::Result<()> {
/// let source = InMemorySource::new();
/// source.insert(Member::new(7).with_username("alice"));
///
/// let registry = CacheRegistry::new();
/// let members = EntityManager::<Member, _>::new(&registry, source);
///
/// let alice = members.get(&Lookup::key("alice"), CacheStrategy::Refresh).await?;
/// assert_eq!(alice.and_then(|m| m.id), Some(7));
/// assert_eq!(members.source().fetch_count(), 1);
///
/// // Now served from the store.
/// members.get(&Lookup::Id(7), CacheStrategy::Refresh).await?;
/// assert_eq!(members.source().fetch_count(), 1);
/// # Ok(())
/// # }
/// ```
pub struct EntityManager<E: BridgeEntity, S: EntitySource<E>> {
    store: EntityStore<E>,
    source: S,
}

impl<E: BridgeEntity, S: EntitySource<E>> EntityManager<E, S> {
    /// Manager over the registry's store for `E`.
    pub fn new(registry: &CacheRegistry, source: S) -> Self {
        Self::with_store(registry.store::<E>(), source)
    }

    pub fn with_store(store: EntityStore<E>, source: S) -> Self {
        EntityManager { store, source }
    }

    pub fn store(&self) -> &EntityStore<E> {
        &self.store
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Look up an entity under `strategy`.
    ///
    /// # Errors
    ///
    /// - `Error::SourceError`: the source failed
    /// - `Error::NonIdentifiableEntity`: the source returned an entity without id
    pub async fn get(&self, lookup: &Lookup, strategy: CacheStrategy) -> Result<Option<Arc<E>>> {
        self.get_with_config(lookup, strategy, OperationConfig::default())
            .await
    }

    /// Look up an entity with per-operation overrides.
    ///
    /// Retryable failures (see [`Error::is_retryable`]) are retried up to
    /// `config.retry_count` times with exponential backoff; other errors are
    /// returned at once.
    ///
    /// # Errors
    ///
    /// - `Error::SourceError`: the source failed on every attempt
    /// - `Error::Timeout`: a fetch exceeded `config.timeout` on every attempt
    /// - `Error::NonIdentifiableEntity`: the source returned an entity without id
    pub async fn get_with_config(
        &self,
        lookup: &Lookup,
        strategy: CacheStrategy,
        config: OperationConfig,
    ) -> Result<Option<Arc<E>>> {
        let mut attempts = 0;
        let max_attempts = config.retry_count.saturating_add(1);

        loop {
            attempts += 1;

            match self.execute(lookup, strategy, &config).await {
                Ok(found) => return Ok(found),
                Err(e) if e.is_retryable() && attempts < max_attempts => {
                    debug!(
                        "Lookup of {} failed (attempt {}/{}): {}, retrying...",
                        lookup.label(E::kind()),
                        attempts,
                        max_attempts,
                        e
                    );
                    tokio::time::sleep(backoff(attempts)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Look up the current copy of `entity`, addressed by its id or else its key.
    ///
    /// Unlike [`EntityCache::get_entity`], which prefers the key, this may reach
    /// the server, and the server addresses entities by id first (see
    /// [`BridgeEntity::identifier`]): a handle whose key was renamed remotely is
    /// still found by its id.
    ///
    /// # Errors
    ///
    /// Returns `Error::NonIdentifiableEntity` when `entity` has neither.
    pub async fn get_entity(&self, entity: &E, strategy: CacheStrategy) -> Result<Option<Arc<E>>> {
        let lookup = Lookup::of(entity).ok_or_else(|| {
            Error::NonIdentifiableEntity(format!("{} cannot be looked up", LabelBuilder::entity(entity)))
        })?;
        self.get(&lookup, strategy).await
    }

    /// Mirror a successful remote write into the store.
    pub fn record(&self, entity: E) -> Result<Arc<E>> {
        self.store.put(entity)
    }

    /// Drop the cached entity addressed by `key`, e.g. after a remote rename.
    pub fn invalidate(&self, key: &str) {
        self.store.remove(key);
    }

    async fn execute(
        &self,
        lookup: &Lookup,
        strategy: CacheStrategy,
        config: &OperationConfig,
    ) -> Result<Option<Arc<E>>> {
        let timer = Instant::now();
        let label = lookup.label(E::kind());
        debug!("» Lookup of {} (strategy: {})", label, strategy);

        let cached = self.store.lookup(lookup);
        let result = if strategy.always_fetches() {
            if strategy.evicts_cached() {
                match lookup {
                    Lookup::Id(id) => self.store.remove_by_id(*id),
                    Lookup::Key(key) => self.store.remove(key),
                }
                debug!("✓ Cache invalidated for {}", label);
            }
            self.fetch_and_put(lookup, cached.as_deref(), config).await
        } else if cached.is_some() || strategy == CacheStrategy::Fresh {
            Ok(cached)
        } else {
            self.fetch_and_put(lookup, None, config).await
        };

        match &result {
            Ok(Some(_)) => debug!("✓ Lookup of {} succeeded in {:?}", label, timer.elapsed()),
            Ok(None) => debug!("Entity not found for {}", label),
            Err(e) => warn!("Lookup of {} failed: {}", label, e),
        }
        result
    }

    async fn fetch_and_put(
        &self,
        lookup: &Lookup,
        seed: Option<&E>,
        config: &OperationConfig,
    ) -> Result<Option<Arc<E>>> {
        let label = lookup.label(E::kind());
        info!("Fetching {} from source", label);

        let fetch = self.source.fetch(lookup, seed);
        let fetched = match config.timeout {
            Some(limit) => tokio::time::timeout(limit, fetch).await.map_err(|_| {
                Error::Timeout(format!("fetching {} exceeded {:?}", label, limit))
            })??,
            None => fetch.await?,
        };

        let Some(entity) = fetched else {
            return Ok(None);
        };

        let validity = entity.check_valid();
        if validity != EntityValidity::Ok {
            warn!("Source returned invalid {}: {}", label, validity);
        }
        let ttl = config.ttl_override.or_else(|| self.store.default_ttl());
        self.store.put_with_ttl(entity, ttl).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Group, Member};
    use crate::source::InMemorySource;

    fn manager_with(members: &[Member]) -> EntityManager<Member, InMemorySource<Member>> {
        let source = InMemorySource::new();
        for member in members {
            source.insert(member.clone());
        }
        EntityManager::new(&CacheRegistry::new(), source)
    }

    #[tokio::test]
    async fn test_fresh_never_fetches() {
        let manager = manager_with(&[Member::new(1).with_username("alice")]);
        let found = manager.get(&Lookup::Id(1), CacheStrategy::Fresh).await.unwrap();
        assert!(found.is_none());
        assert_eq!(manager.source().fetch_count(), 0);

        manager.record(Member::new(1).with_username("alice")).unwrap();
        let found = manager.get(&Lookup::Id(1), CacheStrategy::Fresh).await.unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn test_refresh_fetches_once() {
        let manager = manager_with(&[Member::new(1).with_username("alice")]);

        let first = manager.get(&Lookup::key("alice"), CacheStrategy::Refresh).await.unwrap();
        let second = manager.get(&Lookup::Id(1), CacheStrategy::Refresh).await.unwrap();
        assert!(Arc::ptr_eq(&first.unwrap(), &second.unwrap()));
        assert_eq!(manager.source().fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_refresh_miss_everywhere() {
        let manager = manager_with(&[]);
        let found = manager.get(&Lookup::key("ghost"), CacheStrategy::Refresh).await.unwrap();
        assert!(found.is_none());
        assert!(manager.store().is_empty());
    }

    #[tokio::test]
    async fn test_invalidate_refetches_with_seed() {
        let manager = manager_with(&[Member::new(1).with_username("alice").with_email("new@example.org")]);
        manager
            .record(Member::new(1).with_username("alice").with_email("old@example.org"))
            .unwrap();

        let found = manager
            .get(&Lookup::key("alice"), CacheStrategy::Invalidate)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.email.as_deref(), Some("new@example.org"));
        assert_eq!(manager.source().seeded_fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_invalidate_after_remote_delete() {
        let manager = manager_with(&[Member::new(1).with_username("alice")]);
        manager.get(&Lookup::Id(1), CacheStrategy::Refresh).await.unwrap();
        manager.source().delete(1);

        let found = manager.get(&Lookup::Id(1), CacheStrategy::Invalidate).await.unwrap();
        assert!(found.is_none());
        assert!(manager.store().get_by_key("alice").is_none());
    }

    #[tokio::test]
    async fn test_bypass_always_fetches() {
        let manager = manager_with(&[Member::new(1).with_username("alice")]);
        manager.get(&Lookup::Id(1), CacheStrategy::Bypass).await.unwrap();
        manager.get(&Lookup::Id(1), CacheStrategy::Bypass).await.unwrap();

        assert_eq!(manager.source().fetch_count(), 2);
        assert_eq!(manager.source().seeded_fetch_count(), 1);
        assert!(manager.store().get(1).is_some());
    }

    #[tokio::test]
    async fn test_retry_on_source_failure() {
        let manager = manager_with(&[Member::new(1)]);
        manager.source().fail_next(1);

        let config = OperationConfig::default().with_retry(2);
        let found = manager
            .get_with_config(&Lookup::Id(1), CacheStrategy::Refresh, config)
            .await
            .unwrap();
        assert!(found.is_some());
        assert_eq!(manager.source().fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_no_retry_by_default() {
        let manager = manager_with(&[Member::new(1)]);
        manager.source().fail_next(1);

        let result = manager.get(&Lookup::Id(1), CacheStrategy::Refresh).await;
        assert!(matches!(result, Err(Error::SourceError(_))));
        assert_eq!(manager.source().fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_timeout() {
        let source = InMemorySource::new().with_latency(Duration::from_millis(200));
        source.insert(Member::new(1));
        let manager = EntityManager::<Member, _>::new(&CacheRegistry::new(), source);

        let config = OperationConfig::default().with_timeout(Duration::from_millis(10));
        let result = manager
            .get_with_config(&Lookup::Id(1), CacheStrategy::Refresh, config)
            .await;
        assert!(matches!(result, Err(Error::Timeout(_))));
        assert!(manager.store().is_empty());
    }

    #[tokio::test]
    async fn test_get_entity_requires_identifier() {
        let manager = manager_with(&[Member::new(1).with_username("alice")]);

        let result = manager.get_entity(&Member::default(), CacheStrategy::Refresh).await;
        assert!(matches!(result, Err(Error::NonIdentifiableEntity(_))));

        let found = manager
            .get_entity(&Member::with_only_username("alice"), CacheStrategy::Refresh)
            .await
            .unwrap();
        assert_eq!(found.unwrap().id, Some(1));
    }

    #[tokio::test]
    async fn test_get_entity_follows_id_after_remote_rename() {
        let manager = manager_with(&[Member::new(1).with_username("alice.liddell")]);
        let handle = Member::new(1).with_username("alice");

        let found = manager
            .get_entity(&handle, CacheStrategy::Refresh)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.username.as_deref(), Some("alice.liddell"));
        assert!(manager.store().get_by_key("alice").is_none());
    }

    #[test]
    fn test_backoff_doubles_then_caps() {
        assert_eq!(backoff(1), Duration::from_millis(100));
        assert_eq!(backoff(3), Duration::from_millis(400));
        assert_eq!(backoff(9), Duration::from_millis(25_600));
        assert_eq!(backoff(10), MAX_BACKOFF);
        assert_eq!(backoff(64), MAX_BACKOFF);
        assert_eq!(backoff(u32::MAX), MAX_BACKOFF);
    }

    #[tokio::test]
    async fn test_ttl_override() {
        let manager = manager_with(&[Member::new(1)]);
        let config = OperationConfig::default().with_ttl(Duration::from_millis(20));
        manager
            .get_with_config(&Lookup::Id(1), CacheStrategy::Refresh, config)
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(manager.store().get(1).is_none());
    }

    #[tokio::test]
    async fn test_invalid_entities_are_still_cached() {
        let source = InMemorySource::new();
        source.insert(Group::new(5).with_name("Not A Valid Name"));
        let manager = EntityManager::<Group, _>::new(&CacheRegistry::new(), source);

        let found = manager.get(&Lookup::Id(5), CacheStrategy::Refresh).await.unwrap();
        assert!(found.is_some());
        assert!(manager.store().get_by_key("Not A Valid Name").is_some());
    }

    #[tokio::test]
    async fn test_invalidate_by_key() {
        let manager = manager_with(&[]);
        manager.record(Member::new(3).with_username("carol")).unwrap();
        manager.invalidate("carol");
        assert!(manager.store().get(3).is_none());
    }
}
