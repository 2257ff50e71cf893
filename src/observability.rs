//! Observability and expiry for entity stores.
//!
//! Stores report every operation through a [`CacheMetrics`] implementation and
//! keep lock-free counters that can be read back as a [`StoreStats`] snapshot.
//!
//! # Metrics
//!
//! Implement `CacheMetrics` to forward store events to a monitoring system:
//!
//! ```ignore
//! use bridge_cache::observability::CacheMetrics;
//! use std::time::Duration;
//!
//! struct PrometheusMetrics;
//!
//! impl CacheMetrics for PrometheusMetrics {
//!     fn record_hit(&self, label: &str, duration: Duration) {
//!         // counter!("bridge_cache_hits").inc();
//!     }
//! }
//!
//! // let registry = CacheRegistry::new().with_metrics(Arc::new(PrometheusMetrics));
//! ```
//!
//! Methods that are not overridden log through the `log` crate.
//! [`NoOpMetrics`] silences everything.
//!
//! # Expiry
//!
//! Entries are eternal unless an [`ExpiryPolicy`] gives their kind a TTL:
//!
//! ```
//! use bridge_cache::observability::ExpiryPolicy;
//! use std::collections::HashMap;
//! use std::time::Duration;
//!
//! let policy = ExpiryPolicy::PerKind(HashMap::from([
//!     ("document".to_string(), Duration::from_secs(600)),
//! ]));
//!
//! assert_eq!(policy.ttl_for("document"), Some(Duration::from_secs(600)));
//! assert_eq!(policy.ttl_for("member"), None);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Hooks for store events.
///
/// `label` identifies the addressed entity, e.g. `member#7` or `member:alice`.
pub trait CacheMetrics: Send + Sync {
    /// Record a lookup that found a live entry.
    fn record_hit(&self, label: &str, duration: Duration) {
        debug!("Cache HIT: {} took {:?}", label, duration);
    }

    /// Record a lookup that found nothing.
    fn record_miss(&self, label: &str, duration: Duration) {
        debug!("Cache MISS: {} took {:?}", label, duration);
    }

    /// Record a successful put.
    fn record_put(&self, label: &str, duration: Duration) {
        debug!("Cache PUT: {} took {:?}", label, duration);
    }

    /// Record a removal that dropped an entry.
    fn record_remove(&self, label: &str, duration: Duration) {
        debug!("Cache REMOVE: {} took {:?}", label, duration);
    }

    /// Record a rejected operation.
    fn record_error(&self, label: &str, error: &str) {
        warn!("Cache ERROR for {}: {}", label, error);
    }

    /// Record a full flush of the store for `kind`.
    fn record_flush(&self, kind: &str, entries: usize) {
        warn!("Cache FLUSH: {} store dropped {} entries", kind, entries);
    }
}

/// Metrics implementation that discards every event.
#[derive(Clone, Debug, Default)]
pub struct NoOpMetrics;

impl CacheMetrics for NoOpMetrics {
    fn record_hit(&self, _label: &str, _duration: Duration) {}
    fn record_miss(&self, _label: &str, _duration: Duration) {}
    fn record_put(&self, _label: &str, _duration: Duration) {}
    fn record_remove(&self, _label: &str, _duration: Duration) {}
    fn record_error(&self, _label: &str, _error: &str) {}
    fn record_flush(&self, _kind: &str, _entries: usize) {}
}

/// Metrics implementation that keeps the default logging behaviour.
#[derive(Clone, Debug, Default)]
pub struct LogMetrics;

impl CacheMetrics for LogMetrics {}

/// How long entries of a kind stay valid after their last put.
///
/// Serialized with durations in whole seconds:
/// `"eternal"`, `{"fixed": 300}`, `{"per_kind": {"document": 600}}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryPolicy {
    /// Entries live until removed.
    #[default]
    Eternal,

    /// Every entry expires after the same duration.
    Fixed(#[serde(with = "duration_secs")] Duration),

    /// TTL per entity kind; kinds not listed are eternal.
    PerKind(#[serde(with = "duration_secs_map")] HashMap<String, Duration>),
}

impl ExpiryPolicy {
    /// TTL for entries of `kind`, `None` when they never expire.
    pub fn ttl_for(&self, kind: &str) -> Option<Duration> {
        match self {
            ExpiryPolicy::Eternal => None,
            ExpiryPolicy::Fixed(ttl) => Some(*ttl),
            ExpiryPolicy::PerKind(ttls) => ttls.get(kind).copied(),
        }
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

mod duration_secs_map {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::{BTreeMap, HashMap};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(
        value: &HashMap<String, Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let secs: BTreeMap<&str, u64> = value
            .iter()
            .map(|(kind, ttl)| (kind.as_str(), ttl.as_secs()))
            .collect();
        secs.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<HashMap<String, Duration>, D::Error> {
        let secs = HashMap::<String, u64>::deserialize(deserializer)?;
        Ok(secs
            .into_iter()
            .map(|(kind, secs)| (kind, Duration::from_secs(secs)))
            .collect())
    }
}

/// Point-in-time statistics of one store.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    /// Entity kind of the store.
    pub kind: String,
    /// Entries in the primary index, expired ones included.
    pub entries: usize,
    /// Mappings in the key index, stale ones included.
    pub key_mappings: usize,
    /// Entries whose TTL has elapsed but which have not been evicted yet.
    pub expired_entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub puts: u64,
    pub removals: u64,
}

impl StoreStats {
    /// Fraction of lookups that hit, `0.0` before any lookup.
    pub fn hit_ratio(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

/// Lock-free event counters behind [`StoreStats`].
#[derive(Debug, Default)]
pub(crate) struct StoreCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    puts: AtomicU64,
    removals: AtomicU64,
}

impl StoreCounters {
    pub(crate) fn hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn put(&self) {
        self.puts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn removal(&self) {
        self.removals.fetch_add(1, Ordering::Relaxed);
    }

    /// Fill the counter fields of `stats`.
    pub(crate) fn fill(&self, stats: &mut StoreStats) {
        stats.hits = self.hits.load(Ordering::Relaxed);
        stats.misses = self.misses.load(Ordering::Relaxed);
        stats.puts = self.puts.load(Ordering::Relaxed);
        stats.removals = self.removals.load(Ordering::Relaxed);
    }
}
