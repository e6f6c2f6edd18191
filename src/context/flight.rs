// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! In-flight computations shared by every caller requesting the same node

use crate::error::EvalResult;
use crate::kernel::Concrete;
use std::sync::{Arc, Condvar, Mutex, PoisonError};

/// One pending realization. The leader completes it exactly once; everyone
/// else blocks in [`Flight::wait`] and receives a clone of the outcome.
#[derive(Debug, Default)]
pub(crate) struct Flight {
    outcome: Mutex<Option<EvalResult<Arc<Concrete>>>>,
    done: Condvar,
}

impl Flight {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn complete(&self, outcome: EvalResult<Arc<Concrete>>) {
        let mut slot = self.outcome.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_none() {
            *slot = Some(outcome);
        }
        self.done.notify_all();
    }

    pub(crate) fn wait(&self) -> EvalResult<Arc<Concrete>> {
        let mut slot = self.outcome.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if let Some(outcome) = slot.as_ref() {
                return outcome.clone();
            }
            slot = self.done.wait(slot).unwrap_or_else(PoisonError::into_inner);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EvalError;
    use crate::expr::Dimension;
    use std::thread;

    #[test]
    fn test_waiters_receive_the_same_outcome() {
        let flight = Arc::new(Flight::new());
        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let flight = flight.clone();
                thread::spawn(move || flight.wait())
            })
            .collect();
        let concrete = Arc::new(Concrete::empty(Dimension::Two));
        flight.complete(Ok(concrete.clone()));
        for waiter in waiters {
            assert!(Arc::ptr_eq(&waiter.join().unwrap().unwrap(), &concrete));
        }
    }

    #[test]
    fn test_first_completion_wins() {
        let flight = Flight::new();
        flight.complete(Err(EvalError::Cancelled));
        flight.complete(Ok(Arc::new(Concrete::empty(Dimension::Three))));
        assert!(matches!(flight.wait(), Err(EvalError::Cancelled)));
    }
}
