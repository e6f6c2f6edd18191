// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Resolved geometry nodes

use super::{AffineTransform, OperationKey, Real};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Dimensionality of a node and of the concrete geometry it realizes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Dimension {
    Two,
    Three,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Two => write!(f, "2D"),
            Dimension::Three => write!(f, "3D"),
        }
    }
}

/// A fully parameterized, environment independent geometric operation.
///
/// Nodes are immutable values compared and hashed structurally, so a node is
/// its own cache key. Build them through the constructors on `Node`, which
/// keep every tree in simplified form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Node {
    pub dimension: Dimension,
    pub kind: NodeKind,
}

/// Operation performed by a node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Empty,
    Shape(Shape),
    Transform {
        child: Arc<Node>,
        transform: AffineTransform,
    },
    Boolean {
        children: Vec<Arc<Node>>,
        op: BooleanOp,
    },
    Extrusion {
        child: Arc<Node>,
        extrusion: Extrusion,
    },
    Projection {
        child: Arc<Node>,
        projection: Projection,
    },
    Refine {
        child: Arc<Node>,
        max_edge_length: Real,
    },
    Simplify {
        child: Arc<Node>,
        tolerance: Real,
    },
    Offset {
        child: Arc<Node>,
        amount: Real,
        join: JoinStyle,
        miter_limit: Real,
        segments: u32,
    },
    ConvexHull {
        child: Arc<Node>,
    },
    Decompose {
        child: Arc<Node>,
    },
    Select {
        child: Arc<Node>,
        index: usize,
    },
    Trim {
        child: Arc<Node>,
        plane: Plane,
    },
    Raw(RawOperation),
}

impl NodeKind {
    /// Direct children, in evaluation order
    pub fn children(&self) -> Vec<&Arc<Node>> {
        match self {
            NodeKind::Empty | NodeKind::Shape(_) | NodeKind::Raw(_) => Vec::new(),
            NodeKind::Boolean { children, .. } => children.iter().collect(),
            NodeKind::Transform { child, .. }
            | NodeKind::Extrusion { child, .. }
            | NodeKind::Projection { child, .. }
            | NodeKind::Refine { child, .. }
            | NodeKind::Simplify { child, .. }
            | NodeKind::Offset { child, .. }
            | NodeKind::ConvexHull { child }
            | NodeKind::Decompose { child }
            | NodeKind::Select { child, .. }
            | NodeKind::Trim { child, .. } => vec![child],
        }
    }

    /// Short operation name used in logs and errors
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Empty => "empty",
            NodeKind::Shape(_) => "shape",
            NodeKind::Transform { .. } => "transform",
            NodeKind::Boolean { .. } => "boolean",
            NodeKind::Extrusion { .. } => "extrusion",
            NodeKind::Projection { .. } => "projection",
            NodeKind::Refine { .. } => "refine",
            NodeKind::Simplify { .. } => "simplify",
            NodeKind::Offset { .. } => "offset",
            NodeKind::ConvexHull { .. } => "convex_hull",
            NodeKind::Decompose { .. } => "decompose",
            NodeKind::Select { .. } => "select",
            NodeKind::Trim { .. } => "trim",
            NodeKind::Raw(_) => "raw",
        }
    }
}

/// Primitive shapes with every parameter resolved
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shape {
    Rectangle {
        size: [Real; 2],
    },
    Circle {
        radius: Real,
        segments: u32,
    },
    Polygon {
        points: Vec<[Real; 2]>,
    },
    Box {
        size: [Real; 3],
    },
    Sphere {
        radius: Real,
        segments: u32,
    },
    Cylinder {
        bottom_radius: Real,
        top_radius: Real,
        height: Real,
        segments: u32,
    },
    Polyhedron {
        vertices: Vec<[Real; 3]>,
        faces: Vec<[u32; 3]>,
    },
}

impl Shape {
    pub fn dimension(&self) -> Dimension {
        match self {
            Shape::Rectangle { .. } | Shape::Circle { .. } | Shape::Polygon { .. } => {
                Dimension::Two
            }
            Shape::Box { .. }
            | Shape::Sphere { .. }
            | Shape::Cylinder { .. }
            | Shape::Polyhedron { .. } => Dimension::Three,
        }
    }

    /// True when the shape encloses no area or volume
    pub fn is_degenerate(&self) -> bool {
        match self {
            Shape::Rectangle { size } => size.iter().any(|v| !(v.0 > 0.0)),
            Shape::Circle { radius, segments } => !(radius.0 > 0.0) || *segments < 3,
            Shape::Polygon { points } => points.len() < 3,
            Shape::Box { size } => size.iter().any(|v| !(v.0 > 0.0)),
            Shape::Sphere { radius, segments } => !(radius.0 > 0.0) || *segments < 3,
            Shape::Cylinder {
                bottom_radius,
                top_radius,
                height,
                segments,
            } => {
                !(height.0 > 0.0)
                    || (bottom_radius.0 <= 0.0 && top_radius.0 <= 0.0)
                    || bottom_radius.0 < 0.0
                    || top_radius.0 < 0.0
                    || *segments < 3
            }
            Shape::Polyhedron { vertices, faces } => vertices.len() < 4 || faces.is_empty(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BooleanOp {
    Union,
    Intersection,
    /// First child minus every following child
    Difference,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Extrusion {
    /// Extrude along +Z; `twist` is in degrees over the full height
    Linear {
        height: Real,
        twist: Real,
        scale_top: [Real; 2],
        divisions: u32,
    },
    /// Revolve the XY profile (X as radius) around the Z axis; `angle` in degrees
    Rotational { angle: Real, segments: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Projection {
    /// Shadow of the whole solid on the XY plane
    Full,
    /// Cross section at height `z`
    Slice { z: Real },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinStyle {
    Round,
    Miter,
    Square,
}

/// Oriented plane: points `p` with `normal · p == offset`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Plane {
    pub normal: [Real; 3],
    pub offset: Real,
}

impl Plane {
    pub fn new(normal: [f64; 3], offset: f64) -> Self {
        Self {
            normal: normal.map(Real),
            offset: Real(offset),
        }
    }

    /// Horizontal plane at height `z`, facing up
    pub fn z(z: f64) -> Self {
        Self::new([0.0, 0.0, 1.0], z)
    }
}

/// Opaque operation embedded in a node tree.
///
/// Equality and hashing look only at `key`; `fallback` is a structural
/// placeholder standing in for the operation's input. The output itself is
/// produced by a thunk registered with the evaluation context under the same
/// key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawOperation {
    pub fallback: Arc<Node>,
    pub key: OperationKey,
}

impl PartialEq for RawOperation {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for RawOperation {}

impl Hash for RawOperation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}
