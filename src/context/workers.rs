// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Bound on the helper threads a context runs at once

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

/// Counts live helper threads across every level of a realization, so a
/// wide or deep tree never runs more helpers than the limit. Callers that
/// cannot get a permit do the work on their own thread.
#[derive(Debug)]
pub(crate) struct WorkerBudget {
    live: AtomicUsize,
    limit: usize,
}

impl WorkerBudget {
    pub(crate) fn new(limit: usize) -> Self {
        Self {
            live: AtomicUsize::new(0),
            limit,
        }
    }

    /// One helper per core besides the calling thread
    pub(crate) fn from_available_parallelism() -> Self {
        let cores = thread::available_parallelism().map_or(1, NonZeroUsize::get);
        Self::new(cores.saturating_sub(1))
    }

    pub(crate) fn limit(&self) -> usize {
        self.limit
    }

    pub(crate) fn try_acquire(&self) -> Option<WorkerPermit<'_>> {
        self.live
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |live| {
                (live < self.limit).then_some(live + 1)
            })
            .ok()
            .map(|_| WorkerPermit { budget: self })
    }
}

/// Held by a helper thread for as long as it runs
pub(crate) struct WorkerPermit<'a> {
    budget: &'a WorkerBudget,
}

impl Drop for WorkerPermit<'_> {
    fn drop(&mut self) {
        self.budget.live.fetch_sub(1, Ordering::AcqRel);
    }
}
