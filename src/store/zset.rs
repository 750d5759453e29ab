//! Sorted set
//!
//! Pairs a rank-indexed [`Treap`] with a member→score index so a re-add with
//! a new score is an O(log n) erase of the old node followed by an insert of
//! the new one. The index always agrees with tree membership: an indexed
//! member maps to the score of exactly the node holding it.
//!
//! One `RwLock` guards the tree and the index together. A write lock is held
//! across a whole ZADD pair list so no reader observes a transient
//! "member missing" state mid-update.

use std::collections::HashMap;

use parking_lot::RwLock;

use super::treap::Treap;

struct Inner {
    tree: Treap,
    index: HashMap<String, i64>,
}

/// A concurrent sorted set keyed by `(score, member)`
pub struct SortedSet {
    inner: RwLock<Inner>,
}

impl SortedSet {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                tree: Treap::new(),
                index: HashMap::new(),
            }),
        }
    }

    /// Upsert a list of `(score, member)` pairs under one write lock.
    ///
    /// A member that is already present has its old node erased before the
    /// new pair is inserted; the insert cannot fail after that erase. Returns
    /// the number of pairs processed.
    pub fn add(&self, pairs: &[(i64, String)]) -> usize {
        let mut inner = self.inner.write();
        for (score, member) in pairs {
            let old_score = inner.index.get(member).copied();
            if let Some(old_score) = old_score {
                inner.tree.erase(old_score, member);
            }
            inner.tree.insert(*score, member);
            inner.index.insert(member.clone(), *score);
        }
        pairs.len()
    }

    /// Tracked member count
    pub fn card(&self) -> usize {
        self.inner.read().tree.len()
    }

    /// The member's current score, if present
    pub fn score(&self, member: &str) -> Option<i64> {
        self.inner.read().index.get(member).copied()
    }

    /// Inclusive rank slice in ascending `(score, member)` order.
    ///
    /// Negative offsets count from the end; both bounds are normalized with
    /// `((i % n) + n) % n`. Returns `None` when `start > stop` after
    /// normalization.
    pub fn range(&self, start: i64, stop: i64) -> Option<Vec<String>> {
        let inner = self.inner.read();
        let size = inner.tree.len() as i64;
        if size == 0 {
            return Some(Vec::new());
        }

        let start = ((start % size) + size) % size;
        let stop = ((stop % size) + size) % size;
        if start > stop {
            return None;
        }

        let mut members = Vec::with_capacity((stop - start + 1) as usize);
        for rank in start + 1..=stop + 1 {
            if let Some((_, member)) = inner.tree.get_by_rank(rank as usize) {
                members.push(member.to_string());
            }
        }
        Some(members)
    }

    /// All `(score, member)` pairs in ascending order
    pub fn entries(&self) -> Vec<(i64, String)> {
        self.inner.read().tree.in_order()
    }
}

impl Default for SortedSet {
    fn default() -> Self {
        Self::new()
    }
}
