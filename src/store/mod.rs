//! Store Module
//!
//! The in-memory state: a flat string map, a two-level hash map, and a
//! directory of sorted sets.
//!
//! ## Locking Discipline
//!
//! Each map carries its own `RwLock`; readers run concurrently and are
//! exclusive with writers. `del` takes the string and hash write locks
//! sequentially, so concurrent readers see a consistent per-store view but
//! not a cross-store-atomic one. The sorted-set directory lock is held only
//! to look up or lazily create a set; tree work happens under the set's own
//! lock.

mod treap;
mod zset;

pub use treap::Treap;
pub use zset::SortedSet;

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

/// The shared in-memory stores
#[derive(Default)]
pub struct Store {
    strings: RwLock<HashMap<String, String>>,
    hashes: RwLock<HashMap<String, HashMap<String, String>>>,
    zsets: RwLock<HashMap<String, Arc<SortedSet>>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // String store
    // =========================================================================

    /// Upsert a string key
    pub fn set(&self, key: &str, value: &str) {
        self.strings
            .write()
            .insert(key.to_string(), value.to_string());
    }

    /// Look up a string key
    pub fn get(&self, key: &str) -> Option<String> {
        self.strings.read().get(key).cloned()
    }

    // =========================================================================
    // Hash store
    // =========================================================================

    /// Upsert a hash field, lazily creating the outer map
    pub fn hset(&self, hash: &str, field: &str, value: &str) {
        self.hashes
            .write()
            .entry(hash.to_string())
            .or_default()
            .insert(field.to_string(), value.to_string());
    }

    /// Look up a hash field
    pub fn hget(&self, hash: &str, field: &str) -> Option<String> {
        self.hashes
            .read()
            .get(hash)
            .and_then(|fields| fields.get(field))
            .cloned()
    }

    // =========================================================================
    // Deletion
    // =========================================================================

    /// Remove a key from the string and hash stores.
    ///
    /// The two write locks are taken one after the other, not atomically
    /// across both.
    pub fn del(&self, key: &str) -> bool {
        let removed_string = self.strings.write().remove(key).is_some();
        let removed_hash = self.hashes.write().remove(key).is_some();
        removed_string || removed_hash
    }

    // =========================================================================
    // Sorted-set directory
    // =========================================================================

    /// Fetch the sorted set for `key`, creating it on first use.
    ///
    /// The directory lock is released before the caller touches the set.
    pub fn zset_entry(&self, key: &str) -> Arc<SortedSet> {
        Arc::clone(
            self.zsets
                .write()
                .entry(key.to_string())
                .or_default(),
        )
    }

    /// Fetch the sorted set for `key` without creating it
    pub fn zset(&self, key: &str) -> Option<Arc<SortedSet>> {
        self.zsets.read().get(key).cloned()
    }

    // =========================================================================
    // Persistence helpers
    // =========================================================================

    /// Copy of the string store, consistent under its read lock
    pub fn dump_strings(&self) -> Vec<(String, String)> {
        self.strings
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Copy of the hash store, consistent under its read lock
    pub fn dump_hashes(&self) -> Vec<(String, Vec<(String, String)>)> {
        self.hashes
            .read()
            .iter()
            .map(|(k, fields)| {
                (
                    k.clone(),
                    fields.iter().map(|(f, v)| (f.clone(), v.clone())).collect(),
                )
            })
            .collect()
    }

    /// Replace the string store's contents
    pub fn restore_strings(&self, entries: HashMap<String, String>) {
        *self.strings.write() = entries;
    }

    /// Replace the hash store's contents
    pub fn restore_hashes(&self, entries: HashMap<String, HashMap<String, String>>) {
        *self.hashes.write() = entries;
    }
}
