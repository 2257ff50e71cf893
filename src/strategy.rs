//! How a manager lookup combines the store with the source.
//!
//! | Strategy | Cached | Not cached | Typical caller |
//! |----------|--------|------------|----------------|
//! | **Fresh** | return it | `None`, no fetch | offline reads, known-warm store |
//! | **Refresh** | return it | fetch + put | default |
//! | **Invalidate** | remove, fetch + put | fetch + put | after a rename or archive |
//! | **Bypass** | fetch + put | fetch + put | reads that must reflect the server |
//!
//! Invalidate and Bypass hand the cached instance to the source as a seed so
//! fields a response omits can be carried forward.
//!
//! ```
//! use bridge_cache::CacheStrategy;
//!
//! let strategy: CacheStrategy = Default::default();
//! assert_eq!(strategy, CacheStrategy::Refresh);
//! assert!(!strategy.always_fetches());
//! assert!(CacheStrategy::Invalidate.evicts_cached());
//! ```

use std::fmt;

/// Strategy of a single manager lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum CacheStrategy {
    /// Store only.
    Fresh,
    /// Store first, fetch on a miss.
    #[default]
    Refresh,
    /// Drop the cached copy, then fetch.
    Invalidate,
    /// Fetch even when cached; the result still replaces the cached copy.
    Bypass,
}

impl CacheStrategy {
    /// Whether a cached copy is ignored and the source always asked.
    pub fn always_fetches(self) -> bool {
        matches!(self, CacheStrategy::Invalidate | CacheStrategy::Bypass)
    }

    /// Whether the cached copy is removed before fetching.
    pub fn evicts_cached(self) -> bool {
        self == CacheStrategy::Invalidate
    }
}

impl fmt::Display for CacheStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CacheStrategy::Fresh => "fresh",
            CacheStrategy::Refresh => "refresh",
            CacheStrategy::Invalidate => "invalidate",
            CacheStrategy::Bypass => "bypass",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_lowercase() {
        let labels: Vec<String> = [
            CacheStrategy::Fresh,
            CacheStrategy::Refresh,
            CacheStrategy::Invalidate,
            CacheStrategy::Bypass,
        ]
        .iter()
        .map(ToString::to_string)
        .collect();
        assert_eq!(labels, ["fresh", "refresh", "invalidate", "bypass"]);
    }

    #[test]
    fn test_fetch_and_evict_flags() {
        assert!(!CacheStrategy::Fresh.always_fetches());
        assert!(!CacheStrategy::Refresh.always_fetches());
        assert!(CacheStrategy::Invalidate.always_fetches());
        assert!(CacheStrategy::Bypass.always_fetches());

        assert!(CacheStrategy::Invalidate.evicts_cached());
        assert!(!CacheStrategy::Bypass.evicts_cached());
    }
}
