// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Cache statistics

use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    pub(crate) hits: AtomicUsize,
    pub(crate) misses: AtomicUsize,
    pub(crate) joins: AtomicUsize,
    pub(crate) kernel_invocations: AtomicUsize,
    pub(crate) thunk_invocations: AtomicUsize,
}

impl StatsCounters {
    pub(crate) fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, entries: usize, operations: usize) -> CacheStats {
        CacheStats {
            entries,
            operations,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            joins: self.joins.load(Ordering::Relaxed),
            kernel_invocations: self.kernel_invocations.load(Ordering::Relaxed),
            thunk_invocations: self.thunk_invocations.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of an evaluation context's cache activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CacheStats {
    /// Realized nodes held by the cache
    pub entries: usize,
    /// Registered raw operation thunks
    pub operations: usize,
    pub hits: usize,
    pub misses: usize,
    /// Requests that waited on another caller's in-flight computation
    pub joins: usize,
    pub kernel_invocations: usize,
    pub thunk_invocations: usize,
}

impl CacheStats {
    pub fn requests(&self) -> usize {
        self.hits + self.misses + self.joins
    }

    /// Share of requests served without computing, in percent
    pub fn hit_rate(&self) -> f64 {
        match self.requests() {
            0 => 0.0,
            total => (self.hits + self.joins) as f64 / total as f64 * 100.0,
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} entries, {} hits, {} misses, {} joins ({:.1}% hit rate), {} kernel calls, {} thunk calls",
            self.entries,
            self.hits,
            self.misses,
            self.joins,
            self.hit_rate(),
            self.kernel_invocations,
            self.thunk_invocations
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate() {
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            ..CacheStats::default()
        };
        assert_eq!(stats.hit_rate(), 75.0);
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }
}
