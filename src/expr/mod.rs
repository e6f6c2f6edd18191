// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Resolved geometry expressions
//!
//! A [`Node`] is the environment independent, fully parameterized form of a
//! geometry. It is structurally comparable, hashable and serializable, and it
//! doubles as the evaluation cache key.

mod codec;
mod key;
mod node;
mod real;
mod simplify;
mod transform;

pub use key::{OperationKey, ParamValue};
pub use node::{
    BooleanOp, Dimension, Extrusion, JoinStyle, Node, NodeKind, Plane, Projection, RawOperation,
    Shape,
};
pub use real::{reals, Real};
pub use transform::AffineTransform;
