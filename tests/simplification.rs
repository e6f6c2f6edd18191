// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Simplification and encoding properties over randomly generated trees

use polyframe_expr::expr::{
    reals, BooleanOp, Extrusion, JoinStyle, ParamValue, Plane, Projection, Real, Shape,
};
use polyframe_expr::{AffineTransform, Dimension, Node, NodeKind, OperationKey};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

fn small(rng: &mut StdRng, low: i32, high: i32) -> f64 {
    f64::from(rng.gen_range(low..high))
}

fn random_solid_leaf(rng: &mut StdRng) -> Node {
    match rng.gen_range(0..4) {
        0 => Node::empty(Dimension::Three),
        1 => Node::shape(Shape::Box {
            // Zero sizes exercise degenerate shapes
            size: reals([small(rng, 0, 4), small(rng, 1, 4), small(rng, 1, 4)]),
        }),
        2 => Node::shape(Shape::Sphere {
            radius: small(rng, 1, 5).into(),
            segments: rng.gen_range(3..12),
        }),
        _ => Node::shape(Shape::Cylinder {
            bottom_radius: 1.0.into(),
            top_radius: small(rng, 0, 3).into(),
            height: 2.0.into(),
            segments: 8,
        }),
    }
}

fn random_planar_leaf(rng: &mut StdRng) -> Node {
    match rng.gen_range(0..4) {
        0 => Node::empty(Dimension::Two),
        1 => Node::shape(Shape::Rectangle {
            size: reals([small(rng, 0, 4), small(rng, 1, 4)]),
        }),
        2 => Node::shape(Shape::Circle {
            radius: small(rng, 1, 4).into(),
            segments: rng.gen_range(2..16),
        }),
        _ => {
            // Fewer than three points is degenerate
            let count = rng.gen_range(2..6);
            let points = (0..count)
                .map(|_| reals([small(rng, -3, 3), small(rng, -3, 3)]))
                .collect();
            Node::shape(Shape::Polygon { points })
        }
    }
}

fn random_transform(rng: &mut StdRng) -> AffineTransform {
    match rng.gen_range(0..4) {
        0 => AffineTransform::identity(),
        1 => AffineTransform::translation(small(rng, -5, 5), 0.0, 1.0),
        2 => AffineTransform::rotation(0.0, 0.0, small(rng, 0, 4) * 90.0),
        _ => AffineTransform::scaling(2.0, 1.0, 1.0),
    }
}

fn random_key(rng: &mut StdRng) -> OperationKey {
    let name = ["bend", "wrap", "skew"][rng.gen_range(0..3)];
    let params = match rng.gen_range(0..3) {
        0 => Vec::new(),
        1 => vec![ParamValue::from(small(rng, 0, 10))],
        _ => vec![
            ParamValue::from(i64::from(rng.gen_range(0..4_i32))),
            ParamValue::List(vec![ParamValue::from("axis"), ParamValue::from(rng.gen_bool(0.5))]),
        ],
    };
    OperationKey::new(name, params)
}

fn random_extrusion(rng: &mut StdRng) -> Extrusion {
    if rng.gen_bool(0.6) {
        Extrusion::Linear {
            height: small(rng, 1, 6).into(),
            twist: (small(rng, -2, 3) * 45.0).into(),
            scale_top: reals([small(rng, 0, 3) * 0.5, small(rng, 1, 3) * 0.5]),
            divisions: rng.gen_range(1..16),
        }
    } else {
        Extrusion::Rotational {
            angle: (small(rng, 1, 9) * 45.0).into(),
            segments: rng.gen_range(3..32),
        }
    }
}

fn random_boolean(rng: &mut StdRng, depth: u32, dimension: Dimension) -> Node {
    let op = [BooleanOp::Union, BooleanOp::Intersection, BooleanOp::Difference][rng.gen_range(0..3)];
    let count = rng.gen_range(1..4);
    let children = (0..count).map(|_| random_node(rng, depth - 1, dimension)).collect();
    Node::boolean(dimension, op, children)
}

fn random_planar(rng: &mut StdRng, depth: u32) -> Arc<Node> {
    if depth == 0 || rng.gen_bool(0.25) {
        return Arc::new(random_planar_leaf(rng));
    }
    let node = match rng.gen_range(0..7) {
        0 => Node::transform(random_planar(rng, depth - 1), random_transform(rng)),
        1 | 2 => random_boolean(rng, depth, Dimension::Two),
        3 => {
            let join = [JoinStyle::Round, JoinStyle::Miter, JoinStyle::Square][rng.gen_range(0..3)];
            // Zero amounts fold away
            Node::offset(random_planar(rng, depth - 1), small(rng, -2, 3) * 0.5, join, 2.0, 16)
        }
        4 => Node::convex_hull(random_planar(rng, depth - 1)),
        5 => {
            let projection = if rng.gen_bool(0.5) {
                Projection::Full
            } else {
                Projection::Slice { z: small(rng, 0, 3).into() }
            };
            Node::projection(random_node(rng, depth - 1, Dimension::Three), projection)
        }
        _ => Node::raw(random_planar(rng, depth - 1), random_key(rng)),
    };
    Arc::new(node)
}

fn random_solid(rng: &mut StdRng, depth: u32) -> Arc<Node> {
    if depth == 0 || rng.gen_bool(0.2) {
        return Arc::new(random_solid_leaf(rng));
    }
    let node = match rng.gen_range(0..10) {
        0 => Node::transform(random_solid(rng, depth - 1), random_transform(rng)),
        1..=3 => random_boolean(rng, depth, Dimension::Three),
        4 => Node::convex_hull(random_solid(rng, depth - 1)),
        5 => Node::refine(random_solid(rng, depth - 1), small(rng, 1, 3)),
        6 => Node::trim(random_solid(rng, depth - 1), Plane::z(0.5)),
        7 => Node::select(Node::decompose(random_solid(rng, depth - 1)), rng.gen_range(0..2)),
        8 => Node::extrusion(random_planar(rng, depth - 1), random_extrusion(rng)),
        _ => Node::raw(random_solid(rng, depth - 1), random_key(rng)),
    };
    Arc::new(node)
}

fn random_node(rng: &mut StdRng, depth: u32, dimension: Dimension) -> Arc<Node> {
    match dimension {
        Dimension::Two => random_planar(rng, depth),
        Dimension::Three => random_solid(rng, depth),
    }
}

/// Mixed 2D and 3D roots
fn random_tree(rng: &mut StdRng, depth: u32) -> Arc<Node> {
    if rng.gen_bool(0.3) {
        random_planar(rng, depth)
    } else {
        random_solid(rng, depth)
    }
}

fn std_hash(node: &Node) -> u64 {
    let mut hasher = DefaultHasher::new();
    node.hash(&mut hasher);
    hasher.finish()
}

#[test]
fn test_simplification_is_idempotent() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..300 {
        let node = random_tree(&mut rng, 5);
        let once = node.simplified();
        assert_eq!(once.simplified(), once, "not idempotent for {:?}", node);
        assert_eq!(once, *node, "constructors left work for simplification: {:?}", node);
    }
}

#[test]
fn test_simplified_trees_contain_no_removable_nodes() {
    fn check(node: &Node) {
        match &node.kind {
            NodeKind::Transform { child, transform } => {
                assert!(!transform.is_identity());
                assert!(!child.is_empty());
                assert!(!matches!(child.kind, NodeKind::Transform { .. }));
            }
            NodeKind::Boolean { children, .. } => {
                assert!(children.len() >= 2);
            }
            _ => {}
        }
        for child in node.kind.children() {
            check(child);
        }
    }

    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..300 {
        check(&random_tree(&mut rng, 5).simplified());
    }
}

#[test]
fn test_json_round_trip_preserves_equality_and_fingerprint() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..100 {
        let node = random_tree(&mut rng, 4);
        let decoded = Node::from_json(&node.to_json().unwrap()).unwrap();
        assert_eq!(decoded, *node);
        assert_eq!(decoded.fingerprint(), node.fingerprint());
    }
}

#[test]
fn test_independent_builds_are_equal_and_hash_alike() {
    let mut first = StdRng::seed_from_u64(99);
    let mut second = StdRng::seed_from_u64(99);
    for _ in 0..100 {
        let a = random_tree(&mut first, 5);
        let b = random_tree(&mut second, 5);
        // Separate allocations, same structure
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a, b);
        assert_eq!(std_hash(&a), std_hash(&b));
    }
}

#[test]
fn test_one_changed_parameter_breaks_equality() {
    let profile = |width: f64| {
        Arc::new(Node::shape(Shape::Rectangle {
            size: reals([width, 1.0]),
        }))
    };
    let twisted = |width: f64, twist: f64| {
        Node::extrusion(
            profile(width),
            Extrusion::Linear {
                height: 4.0.into(),
                twist: twist.into(),
                scale_top: reals([1.0, 0.5]),
                divisions: 12,
            },
        )
    };

    let base = twisted(2.0, 90.0);
    assert_eq!(base, twisted(2.0, 90.0));
    assert_eq!(std_hash(&base), std_hash(&twisted(2.0, 90.0)));
    assert_ne!(base, twisted(2.0, 91.0));
    assert_ne!(base, twisted(2.5, 90.0));

    let offset = |amount: f64, join: JoinStyle| Node::offset(profile(2.0), amount, join, 2.0, 16);
    assert_eq!(offset(0.5, JoinStyle::Round), offset(0.5, JoinStyle::Round));
    assert_ne!(offset(0.5, JoinStyle::Round), offset(0.5, JoinStyle::Miter));
    assert_ne!(offset(0.5, JoinStyle::Round), offset(0.25, JoinStyle::Round));
}

#[test]
fn test_raw_identity_is_its_key() {
    let key = |turns: f64| OperationKey::new("coil", vec![ParamValue::Real(Real(turns))]);
    let cube = Node::shape(Shape::Box {
        size: reals([1.0, 1.0, 1.0]),
    });
    let sphere = Node::shape(Shape::Sphere {
        radius: 1.0.into(),
        segments: 12,
    });

    // Different fallbacks, same key
    let a = Node::raw(cube.clone(), key(3.0));
    let b = Node::raw(sphere, key(3.0));
    assert_eq!(a, b);
    assert_eq!(std_hash(&a), std_hash(&b));

    // Same fallback, different keys
    let c = Node::raw(cube, key(4.0));
    assert_ne!(a, c);
    assert!(matches!(c.kind, NodeKind::Raw(_)));
}
