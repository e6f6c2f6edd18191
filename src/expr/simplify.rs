// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Node constructors and algebraic normalization
//!
//! Every constructor returns the canonical form of the node it describes, so
//! a tree assembled through them is already simplified. [`Node::simplified`]
//! rebuilds an arbitrary tree through the same constructors.

use super::{
    AffineTransform, BooleanOp, Dimension, Extrusion, JoinStyle, Node, NodeKind, OperationKey,
    Plane, Projection, RawOperation, Real, Shape,
};
use std::sync::Arc;

impl Node {
    fn from_kind(dimension: Dimension, kind: NodeKind) -> Self {
        Self { dimension, kind }
    }

    pub fn empty(dimension: Dimension) -> Self {
        Self::from_kind(dimension, NodeKind::Empty)
    }

    /// True for the canonical empty node; never consults a kernel
    pub fn is_empty(&self) -> bool {
        matches!(self.kind, NodeKind::Empty)
    }

    pub fn shape(shape: Shape) -> Self {
        let dimension = shape.dimension();
        if shape.is_degenerate() {
            Self::empty(dimension)
        } else {
            Self::from_kind(dimension, NodeKind::Shape(shape))
        }
    }

    pub fn transform(child: impl Into<Arc<Node>>, transform: AffineTransform) -> Self {
        let child = child.into();
        if child.is_empty() || transform.is_identity() {
            return unwrap_arc(child);
        }
        if let NodeKind::Transform {
            child: inner,
            transform: inner_transform,
        } = &child.kind
        {
            return Self::transform(inner.clone(), inner_transform.concatenated(&transform));
        }
        Self::from_kind(child.dimension, NodeKind::Transform { child, transform })
    }

    pub fn boolean(dimension: Dimension, op: BooleanOp, children: Vec<Arc<Node>>) -> Self {
        let children: Vec<Arc<Node>> = match op {
            BooleanOp::Union => children.into_iter().filter(|c| !c.is_empty()).collect(),
            BooleanOp::Intersection => {
                if children.iter().any(|c| c.is_empty()) {
                    return Self::empty(dimension);
                }
                children
            }
            BooleanOp::Difference => {
                let mut iter = children.into_iter();
                let base = match iter.next() {
                    Some(base) if !base.is_empty() => base,
                    _ => return Self::empty(dimension),
                };
                std::iter::once(base)
                    .chain(iter.filter(|c| !c.is_empty()))
                    .collect()
            }
        };

        match children.len() {
            0 => Self::empty(dimension),
            1 => children.into_iter().next().map(unwrap_arc).unwrap_or_else(|| Self::empty(dimension)),
            _ => Self::from_kind(dimension, NodeKind::Boolean { children, op }),
        }
    }

    pub fn union(dimension: Dimension, children: Vec<Arc<Node>>) -> Self {
        Self::boolean(dimension, BooleanOp::Union, children)
    }

    pub fn intersection(dimension: Dimension, children: Vec<Arc<Node>>) -> Self {
        Self::boolean(dimension, BooleanOp::Intersection, children)
    }

    pub fn difference(dimension: Dimension, children: Vec<Arc<Node>>) -> Self {
        Self::boolean(dimension, BooleanOp::Difference, children)
    }

    /// Extrude a 2D node into a solid
    pub fn extrusion(child: impl Into<Arc<Node>>, extrusion: Extrusion) -> Self {
        let child = child.into();
        debug_assert_eq!(child.dimension, Dimension::Two, "extrusion of a 3D node");
        if child.is_empty() {
            return Self::empty(Dimension::Three);
        }
        Self::from_kind(Dimension::Three, NodeKind::Extrusion { child, extrusion })
    }

    /// Project a solid onto the XY plane
    pub fn projection(child: impl Into<Arc<Node>>, projection: Projection) -> Self {
        let child = child.into();
        debug_assert_eq!(child.dimension, Dimension::Three, "projection of a 2D node");
        if child.is_empty() {
            return Self::empty(Dimension::Two);
        }
        Self::from_kind(Dimension::Two, NodeKind::Projection { child, projection })
    }

    pub fn refine(child: impl Into<Arc<Node>>, max_edge_length: f64) -> Self {
        Self::unary(child.into(), |child| NodeKind::Refine {
            child,
            max_edge_length: Real(max_edge_length),
        })
    }

    pub fn simplify(child: impl Into<Arc<Node>>, tolerance: f64) -> Self {
        Self::unary(child.into(), |child| NodeKind::Simplify {
            child,
            tolerance: Real(tolerance),
        })
    }

    /// Grow (positive amount) or shrink a 2D node
    pub fn offset(
        child: impl Into<Arc<Node>>,
        amount: f64,
        join: JoinStyle,
        miter_limit: f64,
        segments: u32,
    ) -> Self {
        let child = child.into();
        debug_assert_eq!(child.dimension, Dimension::Two, "offset of a 3D node");
        if amount == 0.0 {
            return unwrap_arc(child);
        }
        Self::unary(child, |child| NodeKind::Offset {
            child,
            amount: Real(amount),
            join,
            miter_limit: Real(miter_limit),
            segments,
        })
    }

    pub fn convex_hull(child: impl Into<Arc<Node>>) -> Self {
        Self::unary(child.into(), |child| NodeKind::ConvexHull { child })
    }

    pub fn decompose(child: impl Into<Arc<Node>>) -> Self {
        Self::unary(child.into(), |child| NodeKind::Decompose { child })
    }

    /// Pick one connected component of `child`
    pub fn select(child: impl Into<Arc<Node>>, index: usize) -> Self {
        Self::unary(child.into(), |child| NodeKind::Select { child, index })
    }

    /// Keep the part of `child` on the side the plane normal points to
    pub fn trim(child: impl Into<Arc<Node>>, plane: Plane) -> Self {
        Self::unary(child.into(), |child| NodeKind::Trim { child, plane })
    }

    /// Opaque operation identified by `key`, with `fallback` as its placeholder.
    ///
    /// Raw nodes are never simplified away, even over an empty fallback.
    pub fn raw(fallback: impl Into<Arc<Node>>, key: OperationKey) -> Self {
        let fallback = fallback.into();
        Self::from_kind(fallback.dimension, NodeKind::Raw(RawOperation { fallback, key }))
    }

    fn unary(child: Arc<Node>, make: impl FnOnce(Arc<Node>) -> NodeKind) -> Self {
        if child.is_empty() {
            return Self::empty(child.dimension);
        }
        let dimension = child.dimension;
        Self::from_kind(dimension, make(child))
    }

    /// Rebuild the tree bottom-up through the canonical constructors.
    ///
    /// Idempotent: simplifying a simplified tree returns an equal tree.
    pub fn simplified(&self) -> Node {
        let simplify_child = |child: &Arc<Node>| Arc::new(child.simplified());
        match &self.kind {
            NodeKind::Empty => self.clone(),
            NodeKind::Shape(shape) => Node::shape(shape.clone()),
            NodeKind::Transform { child, transform } => {
                Node::transform(simplify_child(child), *transform)
            }
            NodeKind::Boolean { children, op } => Node::boolean(
                self.dimension,
                *op,
                children.iter().map(simplify_child).collect(),
            ),
            NodeKind::Extrusion { child, extrusion } => {
                Node::extrusion(simplify_child(child), extrusion.clone())
            }
            NodeKind::Projection { child, projection } => {
                Node::projection(simplify_child(child), projection.clone())
            }
            NodeKind::Refine {
                child,
                max_edge_length,
            } => Node::refine(simplify_child(child), max_edge_length.0),
            NodeKind::Simplify { child, tolerance } => {
                Node::simplify(simplify_child(child), tolerance.0)
            }
            NodeKind::Offset {
                child,
                amount,
                join,
                miter_limit,
                segments,
            } => Node::offset(
                simplify_child(child),
                amount.0,
                *join,
                miter_limit.0,
                *segments,
            ),
            NodeKind::ConvexHull { child } => Node::convex_hull(simplify_child(child)),
            NodeKind::Decompose { child } => Node::decompose(simplify_child(child)),
            NodeKind::Select { child, index } => Node::select(simplify_child(child), *index),
            NodeKind::Trim { child, plane } => Node::trim(simplify_child(child), plane.clone()),
            NodeKind::Raw(raw) => Node::from_kind(
                self.dimension,
                NodeKind::Raw(RawOperation {
                    fallback: simplify_child(&raw.fallback),
                    key: raw.key.clone(),
                }),
            ),
        }
    }

    /// Number of nodes in the tree, counting shared subtrees once per use
    pub fn node_count(&self) -> usize {
        1 + self
            .kind
            .children()
            .into_iter()
            .map(|child| child.node_count())
            .sum::<usize>()
    }
}

fn unwrap_arc(node: Arc<Node>) -> Node {
    Arc::try_unwrap(node).unwrap_or_else(|shared| (*shared).clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::reals;

    fn cube(size: f64) -> Arc<Node> {
        Arc::new(Node::shape(Shape::Box {
            size: reals([size, size, size]),
        }))
    }

    fn empty3() -> Arc<Node> {
        Arc::new(Node::empty(Dimension::Three))
    }

    #[test]
    fn test_empty_boolean_is_empty_for_every_op() {
        for op in [BooleanOp::Union, BooleanOp::Intersection, BooleanOp::Difference] {
            assert!(Node::boolean(Dimension::Three, op, vec![]).is_empty());
        }
    }

    #[test]
    fn test_single_union_is_child() {
        let x = cube(2.0);
        assert_eq!(Node::union(Dimension::Three, vec![x.clone()]), *x);
    }

    #[test]
    fn test_difference_rules() {
        let x = cube(2.0);
        assert!(Node::difference(Dimension::Three, vec![empty3(), x.clone()]).is_empty());
        assert_eq!(
            Node::difference(Dimension::Three, vec![x.clone(), empty3(), empty3()]),
            *x
        );
    }

    #[test]
    fn test_intersection_with_empty_is_empty() {
        assert!(Node::intersection(Dimension::Three, vec![cube(1.0), empty3()]).is_empty());
    }

    #[test]
    fn test_union_drops_empty_operands() {
        let node = Node::union(Dimension::Three, vec![cube(1.0), empty3(), cube(2.0)]);
        match node.kind {
            NodeKind::Boolean { children, .. } => assert_eq!(children.len(), 2),
            other => panic!("expected boolean, got {:?}", other),
        }
    }

    #[test]
    fn test_unary_wrappers_of_empty() {
        let e2 = Arc::new(Node::empty(Dimension::Two));
        assert!(Node::transform(empty3(), AffineTransform::translation(1.0, 0.0, 0.0)).is_empty());
        assert!(Node::refine(empty3(), 0.5).is_empty());
        assert!(Node::simplify(empty3(), 0.1).is_empty());
        assert!(Node::convex_hull(empty3()).is_empty());
        assert!(Node::offset(e2.clone(), 1.0, JoinStyle::Round, 2.0, 16).is_empty());
        let extruded = Node::extrusion(
            e2,
            Extrusion::Linear {
                height: Real(5.0),
                twist: Real(0.0),
                scale_top: reals([1.0, 1.0]),
                divisions: 1,
            },
        );
        assert!(extruded.is_empty());
        assert_eq!(extruded.dimension, Dimension::Three);
    }

    #[test]
    fn test_degenerate_shape_is_empty() {
        assert!(Node::shape(Shape::Box {
            size: reals([1.0, 0.0, 1.0])
        })
        .is_empty());
    }

    #[test]
    fn test_nested_transforms_fold() {
        let node = Node::transform(
            Node::transform(cube(1.0), AffineTransform::translation(1.0, 0.0, 0.0)),
            AffineTransform::translation(0.0, 2.0, 0.0),
        );
        match &node.kind {
            NodeKind::Transform { child, transform } => {
                assert_eq!(**child, *cube(1.0));
                assert_eq!(*transform, AffineTransform::translation(1.0, 2.0, 0.0));
            }
            other => panic!("expected transform, got {:?}", other),
        }
    }

    #[test]
    fn test_raw_survives_empty_fallback() {
        let node = Node::raw(empty3(), OperationKey::new("load", vec![]));
        assert!(!node.is_empty());
    }

    #[test]
    fn test_simplified_is_idempotent_on_raw_tree() {
        let raw_tree = Node {
            dimension: Dimension::Three,
            kind: NodeKind::Boolean {
                op: BooleanOp::Union,
                children: vec![
                    Arc::new(Node {
                        dimension: Dimension::Three,
                        kind: NodeKind::Boolean {
                            op: BooleanOp::Union,
                            children: vec![],
                        },
                    }),
                    Arc::new(Node {
                        dimension: Dimension::Three,
                        kind: NodeKind::Transform {
                            child: cube(3.0),
                            transform: AffineTransform::identity(),
                        },
                    }),
                ],
            },
        };
        let once = raw_tree.simplified();
        assert_eq!(once, *cube(3.0));
        assert_eq!(once.simplified(), once);
    }
}
