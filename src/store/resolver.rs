//! Secondary key to primary id side table.

use dashmap::DashMap;

/// Maps public keys to the primary id of the entry that last claimed them.
///
/// The resolver never holds entities. A mapping may outlive the entry it points
/// to, or point to an entry that has since been renamed; the owning store checks
/// the entry's own key before trusting a resolution and drops such stale mappings
/// lazily.
#[derive(Debug, Default)]
pub struct KeyResolver {
    ids: DashMap<String, i64>,
}

impl KeyResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        KeyResolver {
            ids: DashMap::with_capacity(capacity),
        }
    }

    /// The id last mapped from `key`, without fallback.
    pub fn resolve(&self, key: &str) -> Option<i64> {
        self.ids.get(key).map(|id| *id)
    }

    /// Point `key` at `id`, replacing any previous mapping.
    pub fn update(&self, key: &str, id: i64) {
        self.ids.insert(key.to_string(), id);
    }

    /// Drop the mapping for `key`, whatever it points to.
    pub fn invalidate(&self, key: &str) {
        self.ids.remove(key);
    }

    /// Drop the mapping for `key` only while it still points at `id`.
    ///
    /// Returns whether a mapping was removed. A key reassigned to another id in
    /// the meantime is left alone.
    pub fn invalidate_if(&self, key: &str, id: i64) -> bool {
        self.ids.remove_if(key, |_, mapped| *mapped == id).is_some()
    }

    pub fn clear(&self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
