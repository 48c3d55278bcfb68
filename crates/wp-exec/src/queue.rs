//! `EventQueue`: the future event list of a simulation run.
//!
//! Events are keyed by [`SimTime`] in a `BTreeMap`; events scheduled for the
//! same instant are kept in a `VecDeque` and come out in insertion order.
//! That FIFO rule is the only tie-break, so a run is a pure function of its
//! inputs and seed.

use std::collections::{BTreeMap, VecDeque};

use wp_core::SimTime;

/// A time-ordered queue of pending events.
#[derive(Debug)]
pub struct EventQueue<E> {
    inner: BTreeMap<SimTime, VecDeque<E>>,
    /// Cached total event count for O(1) `len()`.
    total: usize,
}

impl<E> Default for EventQueue<E> {
    fn default() -> Self {
        Self { inner: BTreeMap::new(), total: 0 }
    }
}

impl<E> EventQueue<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `event` at `at`, behind anything already queued for `at`.
    pub fn push(&mut self, at: SimTime, event: E) {
        self.inner.entry(at).or_default().push_back(event);
        self.total += 1;
    }

    /// Remove and return the earliest event.
    pub fn pop(&mut self) -> Option<(SimTime, E)> {
        let mut entry = self.inner.first_entry()?;
        let at = *entry.key();
        let event = entry.get_mut().pop_front()?;
        if entry.get().is_empty() {
            entry.remove();
        }
        self.total -= 1;
        Some((at, event))
    }

    /// The earliest instant with at least one queued event.
    pub fn next_time(&self) -> Option<SimTime> {
        self.inner.keys().next().copied()
    }

    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Number of distinct future instants with queued events.
    pub fn instant_count(&self) -> usize {
        self.inner.len()
    }
}
