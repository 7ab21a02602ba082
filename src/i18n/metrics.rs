//! Counters for alternate-URL resolution.
//!
//! Fallbacks and store failures never break a page, so these counters are the
//! only place they become visible.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct ResolutionMetrics {
    /// Translation-link lookups attempted
    lookups: AtomicUsize,

    /// Lookups that found a link with at least one usable entry
    linked: AtomicUsize,

    /// Lookups for documents without a translation link
    unlinked: AtomicUsize,

    /// Content store queries that failed
    store_failures: AtomicUsize,

    /// URLs produced by a static fallback instead of the translation graph
    fallbacks: AtomicUsize,
}

impl ResolutionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_lookup(&self) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_linked(&self) {
        self.linked.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unlinked(&self) {
        self.unlinked.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_store_failure(&self) {
        self.store_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fallback(&self) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot of all counters.
    pub fn report(&self) -> MetricsReport {
        let lookups = self.lookups.load(Ordering::Relaxed);
        let linked = self.linked.load(Ordering::Relaxed);
        let link_rate = if lookups > 0 {
            (linked as f64 / lookups as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            lookups,
            linked,
            unlinked: self.unlinked.load(Ordering::Relaxed),
            store_failures: self.store_failures.load(Ordering::Relaxed),
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
            link_rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReport {
    pub lookups: usize,
    pub linked: usize,
    pub unlinked: usize,
    pub store_failures: usize,
    pub fallbacks: usize,
    /// Percentage of lookups that resolved through a translation link
    pub link_rate: f64,
}
