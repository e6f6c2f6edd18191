// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Evaluation context: node cache with single-flight realization
//!
//! Every node is realized at most once per context. The cache entry for a
//! node is the only point where callers synchronize: the first caller
//! registers an in-flight marker and computes outside any lock, concurrent
//! callers for the same node wait on that marker, and callers for other
//! nodes are never blocked. Failed computations are handed to every waiter
//! and never published.
//!
//! Children of a node are realized concurrently on scoped helper threads.
//! A context-wide worker budget caps how many helpers are alive at once;
//! children that find the budget spent are realized on the calling thread.
//!
//! There is no eviction and no persistence; a context lives for one run.

mod flight;
mod registry;
mod stats;
mod targets;
mod workers;

pub use registry::OperationThunk;
pub use stats::CacheStats;
pub use targets::ExportTarget;

use crate::build::{BuildResult, Geometry};
use crate::elements::IsolationMarker;
use crate::environment::Environment;
use crate::error::{EvalError, EvalResult};
use crate::expr::{Node, NodeKind, OperationKey, RawOperation};
use crate::kernel::{Concrete, Kernel, Measurements, ReferenceKernel};
use ahash::RandomState;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use flight::Flight;
use registry::OperationRegistry;
use stats::StatsCounters;
use workers::WorkerBudget;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::{debug, trace};

enum Slot {
    Ready(Arc<Concrete>),
    Pending(Arc<Flight>),
}

enum Lookup {
    Lead(Arc<Flight>),
    Join(Arc<Flight>),
}

enum Child<'scope, 'node> {
    Ready(Arc<Concrete>),
    Inline(&'node Arc<Node>),
    Spawned(thread::ScopedJoinHandle<'scope, EvalResult<Arc<Concrete>>>),
}

/// A built geometry and the realization of its output node
#[derive(Debug, Clone)]
pub struct EvaluatedGeometry {
    pub result: BuildResult,
    pub concrete: Arc<Concrete>,
}

pub struct EvaluationContext {
    kernel: Arc<dyn Kernel>,
    cache: DashMap<Arc<Node>, Slot, RandomState>,
    operations: OperationRegistry,
    cancelled: AtomicBool,
    stats: StatsCounters,
    workers: WorkerBudget,
}

impl EvaluationContext {
    pub fn new(kernel: Arc<dyn Kernel>) -> Self {
        Self {
            kernel,
            cache: DashMap::with_hasher(RandomState::new()),
            operations: OperationRegistry::default(),
            cancelled: AtomicBool::new(false),
            stats: StatsCounters::default(),
            workers: WorkerBudget::from_available_parallelism(),
        }
    }

    /// Cap the helper threads alive at once. Zero realizes everything on
    /// the calling thread.
    pub fn with_max_workers(mut self, limit: usize) -> Self {
        self.workers = WorkerBudget::new(limit);
        self
    }

    pub fn max_workers(&self) -> usize {
        self.workers.limit()
    }

    pub fn kernel(&self) -> &dyn Kernel {
        self.kernel.as_ref()
    }

    /// Resolve a geometry into its node and elements
    pub fn build(&self, geometry: &dyn Geometry, env: &Environment) -> EvalResult<BuildResult> {
        if self.is_cancelled() {
            return Err(EvalError::Cancelled);
        }
        geometry.build(env, self)
    }

    /// Build and realize a geometry. An isolated subtree, when present,
    /// is realized in place of the whole.
    pub fn evaluate(&self, geometry: &dyn Geometry, env: &Environment) -> EvalResult<EvaluatedGeometry> {
        let result = self.build(geometry, env)?;
        let target = match result.elements.get_ref::<IsolationMarker>().and_then(IsolationMarker::isolated) {
            Some(isolated) => isolated.node.clone(),
            None => result.node.clone(),
        };
        let concrete = self.realize(&target)?;
        Ok(EvaluatedGeometry { result, concrete })
    }

    /// Concrete geometry of `node`, computed at most once per context
    pub fn realize(&self, node: &Arc<Node>) -> EvalResult<Arc<Concrete>> {
        if self.is_cancelled() {
            return Err(EvalError::Cancelled);
        }

        let lookup = match self.cache.entry(node.clone()) {
            Entry::Occupied(entry) => match entry.get() {
                Slot::Ready(concrete) => {
                    StatsCounters::bump(&self.stats.hits);
                    trace!(operation = node.kind.name(), "cache hit");
                    return Ok(concrete.clone());
                }
                Slot::Pending(flight) => Lookup::Join(flight.clone()),
            },
            Entry::Vacant(entry) => {
                let flight = Arc::new(Flight::new());
                entry.insert(Slot::Pending(flight.clone()));
                Lookup::Lead(flight)
            }
        };

        match lookup {
            Lookup::Join(flight) => {
                StatsCounters::bump(&self.stats.joins);
                trace!(operation = node.kind.name(), "joining in-flight computation");
                flight.wait()
            }
            Lookup::Lead(flight) => {
                StatsCounters::bump(&self.stats.misses);
                trace!(operation = node.kind.name(), "cache miss");
                let guard = FlightGuard {
                    context: self,
                    node,
                    flight,
                    finished: false,
                };
                let outcome = self.compute(node).and_then(|concrete| {
                    if self.is_cancelled() {
                        Err(EvalError::Cancelled)
                    } else {
                        Ok(Arc::new(concrete))
                    }
                });
                guard.finish(outcome)
            }
        }
    }

    /// Realize several nodes concurrently; results keep the input order
    pub fn realize_all(&self, nodes: &[Arc<Node>]) -> EvalResult<Vec<Arc<Concrete>>> {
        let [first, rest @ ..] = nodes else {
            return Ok(Vec::new());
        };
        if rest.is_empty() {
            return Ok(vec![self.realize(first)?]);
        }

        thread::scope(|scope| {
            let pending: Vec<_> = rest
                .iter()
                .map(|node| match self.ready(node) {
                    Some(concrete) => Child::Ready(concrete),
                    None => match self.workers.try_acquire() {
                        Some(permit) => Child::Spawned(scope.spawn(move || {
                            let _permit = permit;
                            self.realize(node)
                        })),
                        None => Child::Inline(node),
                    },
                })
                .collect();

            let mut results = Vec::with_capacity(nodes.len());
            results.push(self.realize(first));
            for child in pending {
                results.push(match child {
                    Child::Ready(concrete) => Ok(concrete),
                    Child::Inline(node) => self.realize(node),
                    Child::Spawned(handle) => handle
                        .join()
                        .unwrap_or_else(|panic| std::panic::resume_unwind(panic)),
                });
            }
            results.into_iter().collect()
        })
    }

    pub fn measure(&self, node: &Arc<Node>) -> EvalResult<Measurements> {
        let concrete = self.realize(node)?;
        Ok(self.kernel.measure(&concrete))
    }

    /// Structural emptiness; never realizes anything. A raw node without a
    /// registered thunk answers through its fallback.
    pub fn is_empty(&self, node: &Node) -> bool {
        match &node.kind {
            NodeKind::Empty => true,
            NodeKind::Raw(raw) => !self.operations.contains(&raw.key) && self.is_empty(&raw.fallback),
            _ => false,
        }
    }

    /// Register the thunk producing raw nodes keyed by `key`. The first
    /// registration for a key wins; returns whether this call registered.
    pub fn register_operation(&self, key: OperationKey, thunk: Arc<OperationThunk>) -> bool {
        let registered = self.operations.register(key.clone(), thunk);
        if registered {
            debug!(key = %key, "registered operation");
        } else {
            trace!(key = %key, "operation already registered");
        }
        registered
    }

    /// Stop the run: pending and future realizations fail with
    /// [`EvalError::Cancelled`]
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            debug!(entries = self.cache_len(), "evaluation cancelled");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Number of realized nodes in the cache
    pub fn cache_len(&self) -> usize {
        self.cache
            .iter()
            .filter(|entry| matches!(entry.value(), Slot::Ready(_)))
            .count()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.cache_len(), self.operations.len())
    }

    fn ready(&self, node: &Arc<Node>) -> Option<Arc<Concrete>> {
        let entry = self.cache.get(node)?;
        match entry.value() {
            Slot::Ready(concrete) => {
                StatsCounters::bump(&self.stats.hits);
                Some(concrete.clone())
            }
            Slot::Pending(_) => None,
        }
    }

    fn invoke(&self, node: &Node, operation: impl FnOnce(&dyn Kernel) -> EvalResult<Concrete>) -> EvalResult<Concrete> {
        StatsCounters::bump(&self.stats.kernel_invocations);
        trace!(operation = node.kind.name(), dimension = %node.dimension, "kernel invocation");
        operation(self.kernel.as_ref())
    }

    fn run_operation(&self, raw: &RawOperation) -> EvalResult<Concrete> {
        let thunk = self
            .operations
            .get(&raw.key)
            .ok_or_else(|| EvalError::UnregisteredOperation(raw.key.clone()))?;
        StatsCounters::bump(&self.stats.thunk_invocations);
        debug!(key = %raw.key, "invoking operation");
        thunk(self)
    }

    /// Children first, then the node's own kernel operation
    fn compute(&self, node: &Node) -> EvalResult<Concrete> {
        match &node.kind {
            NodeKind::Empty => Ok(Concrete::empty(node.dimension)),
            NodeKind::Raw(raw) => self.run_operation(raw),
            NodeKind::Shape(shape) => self.invoke(node, |k| k.primitive(shape)),
            NodeKind::Transform { child, transform } => {
                let input = self.realize(child)?;
                self.invoke(node, |k| k.transform(&input, transform))
            }
            NodeKind::Boolean { children, op } => {
                let inputs = self.realize_all(children)?;
                self.invoke(node, |k| k.boolean(node.dimension, &inputs, *op))
            }
            NodeKind::Extrusion { child, extrusion } => {
                let input = self.realize(child)?;
                self.invoke(node, |k| k.extrude(&input, extrusion))
            }
            NodeKind::Projection { child, projection } => {
                let input = self.realize(child)?;
                self.invoke(node, |k| k.project(&input, projection))
            }
            NodeKind::Refine {
                child,
                max_edge_length,
            } => {
                let input = self.realize(child)?;
                self.invoke(node, |k| k.refine(&input, max_edge_length.0))
            }
            NodeKind::Simplify { child, tolerance } => {
                let input = self.realize(child)?;
                self.invoke(node, |k| k.simplify(&input, tolerance.0))
            }
            NodeKind::Offset {
                child,
                amount,
                join,
                miter_limit,
                segments,
            } => {
                let input = self.realize(child)?;
                self.invoke(node, |k| {
                    k.offset(&input, amount.0, *join, miter_limit.0, *segments)
                })
            }
            NodeKind::ConvexHull { child } => {
                let input = self.realize(child)?;
                self.invoke(node, |k| k.convex_hull(&input))
            }
            NodeKind::Decompose { child } => {
                let input = self.realize(child)?;
                self.invoke(node, |k| {
                    Ok(Concrete::merged(node.dimension, &k.decompose(&input)?))
                })
            }
            NodeKind::Select { child, index } => {
                let input = self.realize(child)?;
                self.invoke(node, |k| k.select(node.dimension, k.decompose(&input)?, *index))
            }
            NodeKind::Trim { child, plane } => {
                let input = self.realize(child)?;
                self.invoke(node, |k| k.trim(&input, plane))
            }
        }
    }
}

impl Default for EvaluationContext {
    fn default() -> Self {
        Self::new(Arc::new(ReferenceKernel::new()))
    }
}

impl fmt::Debug for EvaluationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvaluationContext")
            .field("stats", &self.stats())
            .field("cancelled", &self.is_cancelled())
            .field("max_workers", &self.max_workers())
            .finish()
    }
}

/// Retires an in-flight marker exactly once, also when the leader unwinds
struct FlightGuard<'a> {
    context: &'a EvaluationContext,
    node: &'a Arc<Node>,
    flight: Arc<Flight>,
    finished: bool,
}

impl FlightGuard<'_> {
    fn finish(mut self, outcome: EvalResult<Arc<Concrete>>) -> EvalResult<Arc<Concrete>> {
        match &outcome {
            Ok(concrete) => {
                self.context
                    .cache
                    .insert(self.node.clone(), Slot::Ready(concrete.clone()));
            }
            Err(error) => {
                debug!(operation = self.node.kind.name(), %error, "realization failed");
                self.context.cache.remove(self.node);
            }
        }
        self.flight.complete(outcome.clone());
        self.finished = true;
        outcome
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.context.cache.remove(self.node);
            self.flight.complete(Err(EvalError::Operation(format!(
                "{} computation panicked",
                self.node.kind.name()
            ))));
        }
    }
}
