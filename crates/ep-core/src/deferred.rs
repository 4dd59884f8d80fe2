//! `DeferredQueue<T>` — work items keyed by the tick they become due.
//!
//! Modules use this for everything that happens "N ticks from now": disease
//! progression deadlines, laboratory results, quarantine expiry.  Draining
//! returns every item whose tick is at or before the given tick, ordered by
//! due tick and then by insertion order, so replays are deterministic.
//!
//! `BTreeMap` gives O(log W) insert and pop where W is the number of distinct
//! due ticks currently enqueued.

use std::collections::BTreeMap;

use crate::Tick;

#[derive(Clone, Debug)]
pub struct DeferredQueue<T> {
    inner: BTreeMap<Tick, Vec<T>>,
    /// Cached total item count for O(1) `len()`.
    total: usize,
}

impl<T> Default for DeferredQueue<T> {
    fn default() -> Self {
        Self { inner: BTreeMap::new(), total: 0 }
    }
}

impl<T> DeferredQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `item` to fall due at `tick`.
    pub fn push(&mut self, tick: Tick, item: T) {
        self.inner.entry(tick).or_default().push(item);
        self.total += 1;
    }

    /// Remove and return everything due at or before `now`.
    pub fn drain_due(&mut self, now: Tick) -> Vec<T> {
        let later = self.inner.split_off(&Tick(now.0.saturating_add(1)));
        let due = std::mem::replace(&mut self.inner, later);
        let mut out = Vec::new();
        for (_, items) in due {
            self.total -= items.len();
            out.extend(items);
        }
        out
    }

    /// Drop every queued item for which `keep` returns `false`.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&T) -> bool,
    {
        let mut removed = 0;
        for items in self.inner.values_mut() {
            let before = items.len();
            items.retain(&mut keep);
            removed += before - items.len();
        }
        self.inner.retain(|_, items| !items.is_empty());
        self.total -= removed;
    }

    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}
