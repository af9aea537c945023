//! Bounded verdict store with first-in-first-out eviction.
//!
//! Eviction follows insertion order only; lookups never refresh an entry.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

pub struct VerdictCache<K> {
    capacity: usize,
    order: VecDeque<K>,
    verdicts: HashMap<K, bool>,
}

impl<K: Hash + Eq + Clone> VerdictCache<K> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity + 1),
            verdicts: HashMap::with_capacity(capacity + 1),
        }
    }

    pub fn get(&self, key: &K) -> Option<bool> {
        self.verdicts.get(key).copied()
    }

    /// Store `verdict`, returning the key evicted to stay within capacity.
    ///
    /// Overwriting an existing key keeps its original insertion slot.
    pub fn put(&mut self, key: K, verdict: bool) -> Option<K> {
        if let Some(existing) = self.verdicts.get_mut(&key) {
            *existing = verdict;
            return None;
        }

        self.order.push_back(key.clone());
        self.verdicts.insert(key, verdict);

        if self.order.len() > self.capacity {
            let evicted = self.order.pop_front()?;
            self.verdicts.remove(&evicted);
            return Some(evicted);
        }
        None
    }

    pub fn len(&self) -> usize {
        self.verdicts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verdicts.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
