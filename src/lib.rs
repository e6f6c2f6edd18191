// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polyframe expression core
//!
//! Geometry descriptions ([`build::Geometry`]) are resolved against an
//! [`Environment`] into declarative [`Node`] trees carrying result elements
//! (parts, tags, anchors, isolation). An [`EvaluationContext`] realizes those
//! trees through a [`Kernel`], memoizing every node and running each distinct
//! computation at most once, even when many threads ask for it.

pub mod build;
pub mod context;
pub mod elements;
pub mod environment;
pub mod error;
pub mod expr;
pub mod geometry;
pub mod io;
pub mod kernel;

pub use build::{BuildResult, Geometry, GeometryExt, GeometryRef, IntoGeometry};
pub use context::{CacheStats, EvaluatedGeometry, EvaluationContext};
pub use elements::{Anchor, PartIdentity, ResultElement, ResultElements, Tag};
pub use environment::{Environment, EnvironmentConfig, EnvironmentOverrides, Segmentation};
pub use error::{EvalError, EvalResult, ExportError, ImportError};
pub use expr::{AffineTransform, Dimension, Node, NodeKind, OperationKey};
pub use kernel::{Concrete, Kernel, Measurements, ReferenceKernel};
