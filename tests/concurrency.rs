// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Single-flight realization under concurrent demand

use polyframe_expr::expr::{reals, Shape};
use polyframe_expr::{Concrete, Dimension, EvalError, EvaluationContext, Node, OperationKey};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

const THREADS: usize = 16;

/// A raw node whose thunk counts its invocations and takes a while
fn slow_operation(
    ctx: &EvaluationContext,
    name: &str,
    calls: Arc<AtomicUsize>,
    fail: bool,
) -> Arc<Node> {
    let key = OperationKey::new(name, vec![]);
    ctx.register_operation(
        key.clone(),
        Arc::new(move |ctx: &EvaluationContext| {
            calls.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(100));
            if fail {
                return Err(EvalError::Operation("deliberate failure".to_string()));
            }
            ctx.kernel().primitive(&Shape::Box {
                size: reals([1.0, 2.0, 3.0]),
            })
        }),
    );
    Arc::new(Node::raw(Node::empty(Dimension::Three), key))
}

#[test]
fn test_concurrent_requests_compute_once() {
    let ctx = EvaluationContext::default();
    let calls = Arc::new(AtomicUsize::new(0));
    let node = slow_operation(&ctx, "slow-box", calls.clone(), false);
    let barrier = Barrier::new(THREADS);

    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    ctx.realize(&node)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let first = results[0].as_ref().unwrap();
    for result in &results {
        assert!(Arc::ptr_eq(first, result.as_ref().unwrap()));
    }

    let stats = ctx.stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.joins + stats.hits, THREADS - 1);
    assert_eq!(stats.thunk_invocations, 1);
    assert_eq!(ctx.cache_len(), 1);
}

#[test]
fn test_failure_reaches_every_waiter_and_is_not_cached() {
    let ctx = EvaluationContext::default();
    let calls = Arc::new(AtomicUsize::new(0));
    let node = slow_operation(&ctx, "failing", calls.clone(), true);
    let barrier = Barrier::new(THREADS);

    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    ctx.realize(&node)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for result in &results {
        assert!(matches!(result, Err(EvalError::Operation(_))));
    }
    assert_eq!(ctx.cache_len(), 0);

    // Nothing was published, so a later request computes again
    let before = calls.load(Ordering::SeqCst);
    assert!(ctx.realize(&node).is_err());
    assert_eq!(calls.load(Ordering::SeqCst), before + 1);
}

#[test]
fn test_unrelated_nodes_do_not_wait_on_each_other() {
    let ctx = EvaluationContext::default();
    let calls = Arc::new(AtomicUsize::new(0));
    let slow = slow_operation(&ctx, "slow-unrelated", calls, false);
    let quick = Arc::new(Node::shape(Shape::Box {
        size: reals([1.0, 1.0, 1.0]),
    }));

    thread::scope(|scope| {
        let pending = scope.spawn(|| ctx.realize(&slow));
        // Answered while the slow computation is still in flight
        assert!(ctx.realize(&quick).is_ok());
        assert!(pending.join().unwrap().is_ok());
    });
    assert_eq!(ctx.cache_len(), 2);
}

#[test]
fn test_cancellation_stops_realization() {
    let ctx = EvaluationContext::default();
    let calls = Arc::new(AtomicUsize::new(0));
    let node = slow_operation(&ctx, "cancelled", calls, false);

    thread::scope(|scope| {
        let pending = scope.spawn(|| ctx.realize(&node));
        thread::sleep(Duration::from_millis(20));
        ctx.cancel();
        assert!(matches!(pending.join().unwrap(), Err(EvalError::Cancelled)));
    });
    assert!(ctx.is_cancelled());
    assert_eq!(ctx.cache_len(), 0);
    assert!(matches!(
        ctx.realize(&Arc::new(Node::empty(Dimension::Three))),
        Err(EvalError::Cancelled)
    ));
}

#[test]
fn test_realize_all_keeps_input_order() {
    let ctx = EvaluationContext::default();
    let nodes: Vec<Arc<Node>> = (1..=6)
        .map(|i| {
            Arc::new(Node::shape(Shape::Box {
                size: reals([f64::from(i), 1.0, 1.0]),
            }))
        })
        .collect();
    let concretes = ctx.realize_all(&nodes).unwrap();
    for (i, concrete) in concretes.iter().enumerate() {
        assert_eq!(concrete.bounds().max.x, (i + 1) as f64);
    }
}

/// Raw leaf that records how many leaf computations overlap in time
fn tracked_leaf(ctx: &EvaluationContext, index: usize, live: Arc<AtomicUsize>, peak: Arc<AtomicUsize>) -> Arc<Node> {
    let key = OperationKey::new(format!("tracked-{index}"), vec![]);
    ctx.register_operation(
        key.clone(),
        Arc::new(move |_: &EvaluationContext| {
            let now = live.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(5));
            live.fetch_sub(1, Ordering::SeqCst);
            Ok(Concrete::empty(Dimension::Three))
        }),
    );
    Arc::new(Node::raw(Node::empty(Dimension::Three), key))
}

#[test]
fn test_wide_tree_stays_within_worker_budget() {
    const WORKERS: usize = 3;
    const FANOUT: usize = 12;
    let ctx = EvaluationContext::default().with_max_workers(WORKERS);
    let live = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let groups = (0..FANOUT)
        .map(|group| {
            let leaves = (0..FANOUT)
                .map(|leaf| tracked_leaf(&ctx, group * FANOUT + leaf, live.clone(), peak.clone()))
                .collect();
            Arc::new(Node::union(Dimension::Three, leaves))
        })
        .collect();
    let root = Arc::new(Node::union(Dimension::Three, groups));

    ctx.realize(&root).unwrap();

    // Helpers plus the calling thread
    assert!(peak.load(Ordering::SeqCst) <= WORKERS + 1);
    let stats = ctx.stats();
    assert_eq!(stats.thunk_invocations, FANOUT * FANOUT);
    assert_eq!(stats.misses, FANOUT * FANOUT + FANOUT + 1);
    assert_eq!(ctx.cache_len(), FANOUT * FANOUT + FANOUT + 1);
}

#[test]
fn test_zero_workers_realizes_on_calling_thread() {
    let ctx = EvaluationContext::default().with_max_workers(0);
    let live = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let leaves = (0..8)
        .map(|i| tracked_leaf(&ctx, i, live.clone(), peak.clone()))
        .collect();
    let root = Arc::new(Node::union(Dimension::Three, leaves));

    ctx.realize(&root).unwrap();
    assert_eq!(peak.load(Ordering::SeqCst), 1);
    assert_eq!(ctx.stats().thunk_invocations, 8);
}
