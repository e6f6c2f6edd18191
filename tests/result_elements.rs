// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Parts, anchors, tags and isolation flowing through whole models

use approx::assert_relative_eq;
use polyframe_expr::build::primitives::{Cuboid, Sphere};
use polyframe_expr::build::Captured;
use polyframe_expr::elements::{PartCatalog, TagRegistry};
use polyframe_expr::{
    AffineTransform, Anchor, Environment, EvaluationContext, Geometry, GeometryExt, PartIdentity,
    Tag,
};

#[test]
fn test_same_part_from_addition_and_subtraction_merges() {
    let ctx = EvaluationContext::default();
    let gasket = PartIdentity::solid("gasket");
    let model = Cuboid::cube(10.0)
        .adding(Cuboid::cube(1.0).in_part(gasket.clone()))
        .subtracting(
            Cuboid::cube(1.0)
                .translated(20.0, 0.0, 0.0)
                .in_part(gasket.clone()),
        );

    let result = model.build(&Environment::new(), &ctx).unwrap();
    assert_eq!(result.element::<PartCatalog>().len(), 1);

    let targets = ctx.export_parts(&result).unwrap();
    assert_eq!(targets.len(), 2);
    assert!(targets[0].is_main());
    assert_eq!(targets[1].identity.as_ref(), Some(&gasket));

    let bounds = targets[1].concrete.bounds();
    assert_relative_eq!(bounds.min.x, 0.0, epsilon = 1e-9);
    assert_relative_eq!(bounds.max.x, 21.0, epsilon = 1e-9);

    // The main body is untouched by either contribution
    let main = ctx.kernel().measure(&targets[0].concrete);
    assert_relative_eq!(main.volume, 1000.0, epsilon = 1e-6);
}

#[test]
fn test_parts_follow_enclosing_transforms() {
    let ctx = EvaluationContext::default();
    let peg = PartIdentity::solid("peg");
    let result = Cuboid::cube(1.0)
        .adding(Cuboid::cube(1.0).in_part(peg.clone()))
        .translated(0.0, 0.0, 7.0)
        .build(&Environment::new(), &ctx)
        .unwrap();

    let catalog = result.element::<PartCatalog>();
    let part = catalog.get(&peg).unwrap();
    let bounds = ctx.measure(&part.node).unwrap().bounds;
    assert_relative_eq!(bounds.min.z, 7.0, epsilon = 1e-9);
}

#[test]
#[should_panic(expected = "only one subtree")]
fn test_two_isolated_subtrees_panic() {
    let ctx = EvaluationContext::default();
    let model = Cuboid::cube(1.0).only().adding(Sphere::new(1.0).only());
    let _ = model.build(&Environment::new(), &ctx);
}

#[test]
fn test_reused_isolated_geometry_is_one_marker() {
    let ctx = EvaluationContext::default();
    let isolated = Cuboid::cube(1.0).only();
    let model = isolated.clone().adding(isolated.translated(4.0, 0.0, 0.0));
    assert!(model.build(&Environment::new(), &ctx).is_ok());
}

#[test]
fn test_isolated_subtree_is_what_evaluates() {
    let ctx = EvaluationContext::default();
    let model = Cuboid::cube(10.0).adding(Sphere::new(1.0).translated(30.0, 0.0, 0.0).only());
    let evaluated = ctx.evaluate(&model, &Environment::new()).unwrap();
    let bounds = evaluated.concrete.bounds();
    assert!(bounds.min.x > 28.0);
    assert!(bounds.max.x < 32.0);
}

#[test]
fn test_anchor_defined_after_use_in_construction_order() {
    let ctx = EvaluationContext::default();
    let mount = Anchor::named("mount");
    let model = Sphere::new(1.0)
        .adding(
            Cuboid::cube(1.0)
                .defining_anchor(mount.clone(), AffineTransform::identity())
                .translated(5.0, 0.0, 0.0),
        )
        .anchored_to(mount);

    let evaluated = ctx.evaluate(&model, &Environment::new()).unwrap();
    let bounds = evaluated.concrete.bounds();
    assert_relative_eq!(bounds.min.x, -6.0, epsilon = 0.05);
    assert_relative_eq!(bounds.max.x, 1.0, epsilon = 1e-9);
}

#[test]
fn test_missing_anchor_leaves_body_in_place() {
    let ctx = EvaluationContext::default();
    let env = Environment::new();
    let plain = Cuboid::cube(1.0).build(&env, &ctx).unwrap();
    let anchored = Cuboid::cube(1.0)
        .anchored_to(Anchor::named("nowhere"))
        .build(&env, &ctx)
        .unwrap();
    assert_eq!(anchored.node, plain.node);
}

#[test]
fn test_tag_capture_is_reusable_elsewhere() {
    let ctx = EvaluationContext::default();
    let env = Environment::new();
    let hole = Tag::named("hole");
    let result = Cuboid::cube(1.0)
        .tagged(hole.clone())
        .translated(3.0, 3.0, 3.0)
        .build(&env, &ctx)
        .unwrap();

    // Placed back at the root, the capture sits where it was tagged
    let capture = result.element::<TagRegistry>().get(&hole).cloned().unwrap();
    let hollowed = Cuboid::cube(10.0).subtracting(Captured::new(capture));
    let measured = ctx.measure(&hollowed.build(&env, &ctx).unwrap().node).unwrap();
    assert_relative_eq!(measured.volume, 999.0, epsilon = 1e-6);
}
