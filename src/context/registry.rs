// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Out-of-band thunks for raw operations

use super::EvaluationContext;
use crate::error::EvalResult;
use crate::expr::OperationKey;
use crate::kernel::Concrete;
use ahash::RandomState;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

/// Produces the output of a raw node. Receives the context so it can
/// realize its inputs through the cache.
pub type OperationThunk = dyn Fn(&EvaluationContext) -> EvalResult<Concrete> + Send + Sync;

#[derive(Default)]
pub(crate) struct OperationRegistry {
    thunks: DashMap<OperationKey, Arc<OperationThunk>, RandomState>,
}

impl OperationRegistry {
    /// First registration for a key wins; returns whether this one did
    pub(crate) fn register(&self, key: OperationKey, thunk: Arc<OperationThunk>) -> bool {
        match self.thunks.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(thunk);
                true
            }
        }
    }

    pub(crate) fn get(&self, key: &OperationKey) -> Option<Arc<OperationThunk>> {
        self.thunks.get(key).map(|thunk| thunk.value().clone())
    }

    pub(crate) fn contains(&self, key: &OperationKey) -> bool {
        self.thunks.contains_key(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.thunks.len()
    }
}
