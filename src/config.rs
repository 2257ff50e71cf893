//! Registry-wide configuration.

use crate::error::Result;
use crate::observability::ExpiryPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings applied to every store a [`CacheRegistry`](crate::CacheRegistry) builds.
///
/// # Example
///
/// ```
/// use bridge_cache::CacheConfig;
/// use std::time::Duration;
///
/// let config = CacheConfig::from_json(r#"{ "expiry": { "fixed": 300 } }"#).unwrap();
/// assert_eq!(config.ttl_for("member"), Some(Duration::from_secs(300)));
/// assert_eq!(config.capacity_hint, 0);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Expiry of cached entries. Eternal unless configured.
    pub expiry: ExpiryPolicy,

    /// Initial capacity of each store's indexes.
    pub capacity_hint: usize,
}

impl CacheConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config = serde_json::from_str(json)?;
        Ok(config)
    }

    pub fn with_expiry(mut self, expiry: ExpiryPolicy) -> Self {
        self.expiry = expiry;
        self
    }

    pub fn with_capacity_hint(mut self, capacity: usize) -> Self {
        self.capacity_hint = capacity;
        self
    }

    /// TTL for entries of `kind` under this configuration.
    pub fn ttl_for(&self, kind: &str) -> Option<Duration> {
        self.expiry.ttl_for(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.expiry, ExpiryPolicy::Eternal);
        assert_eq!(config.ttl_for("group"), None);
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let config = CacheConfig::from_json("{}").unwrap();
        assert_eq!(config, CacheConfig::default());
    }

    #[test]
    fn test_builders() {
        let config = CacheConfig::default()
            .with_expiry(ExpiryPolicy::Fixed(Duration::from_secs(60)))
            .with_capacity_hint(1024);
        assert_eq!(config.capacity_hint, 1024);
        assert_eq!(config.ttl_for("document"), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let result = CacheConfig::from_json(r#"{ "capacity_hint": "lots" }"#);
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }
}
