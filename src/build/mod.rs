// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry descriptions and their resolution into nodes
//!
//! A [`Geometry`] is an environment dependent description. Building it reads
//! the settings it needs from the [`Environment`], bakes their numeric
//! consequences into a [`Node`](crate::expr::Node) and collects result
//! elements on the way up.

mod combine;
mod import;
mod metadata;
mod modifiers;
pub mod primitives;
mod readers;
mod result;
mod warp;

pub use combine::Boolean;
pub use import::StlImport;
pub use metadata::{AnchoredTo, Captured, DefiningAnchor, InPart, Only, Tagged};
pub use modifiers::{
    Component, ConvexHull, LinearExtrusion, Offset, Projected, Refined, RotationalExtrusion,
    Simplified, Transformed, Trimmed,
};
pub use readers::{Measuring, ReadEnvironment, ReadResult, WithEnvironment};
pub use result::BuildResult;
pub use warp::Warp;

use crate::context::EvaluationContext;
use crate::elements::{Anchor, PartIdentity, Tag};
use crate::environment::{Environment, EnvironmentOverrides};
use crate::error::{EvalError, EvalResult};
use crate::expr::{AffineTransform, Dimension, JoinStyle, ParamValue, Plane};
use crate::kernel::Measurements;
use nalgebra::Point3;
use std::sync::Arc;

pub trait Geometry: Send + Sync {
    fn build(&self, env: &Environment, ctx: &EvaluationContext) -> EvalResult<BuildResult>;
}

/// Shared, type-erased geometry
pub type GeometryRef = Arc<dyn Geometry>;

impl<G: Geometry + ?Sized> Geometry for Arc<G> {
    fn build(&self, env: &Environment, ctx: &EvaluationContext) -> EvalResult<BuildResult> {
        (**self).build(env, ctx)
    }
}

pub trait IntoGeometry {
    fn into_geometry(self) -> GeometryRef;
}

impl<G: Geometry + 'static> IntoGeometry for G {
    fn into_geometry(self) -> GeometryRef {
        Arc::new(self)
    }
}

pub(crate) fn require_dimension(
    result: &BuildResult,
    expected: Dimension,
    operation: &'static str,
) -> EvalResult<()> {
    if result.dimension() == expected {
        Ok(())
    } else {
        Err(EvalError::DimensionMismatch {
            operation,
            expected,
            actual: result.dimension(),
        })
    }
}

/// Fluent combinators available on every geometry
pub trait GeometryExt: IntoGeometry + Sized {
    fn transformed(self, transform: AffineTransform) -> GeometryRef {
        Transformed::new(self.into_geometry(), transform).into_geometry()
    }

    fn translated(self, x: f64, y: f64, z: f64) -> GeometryRef {
        self.transformed(AffineTransform::translation(x, y, z))
    }

    /// Degrees around X, then Y, then Z
    fn rotated(self, x: f64, y: f64, z: f64) -> GeometryRef {
        self.transformed(AffineTransform::rotation(x, y, z))
    }

    fn scaled(self, x: f64, y: f64, z: f64) -> GeometryRef {
        self.transformed(AffineTransform::scaling(x, y, z))
    }

    fn adding(self, other: impl IntoGeometry) -> GeometryRef {
        Boolean::union(vec![self.into_geometry(), other.into_geometry()]).into_geometry()
    }

    fn subtracting(self, other: impl IntoGeometry) -> GeometryRef {
        Boolean::difference(self.into_geometry(), vec![other.into_geometry()]).into_geometry()
    }

    fn intersecting(self, other: impl IntoGeometry) -> GeometryRef {
        Boolean::intersection(vec![self.into_geometry(), other.into_geometry()]).into_geometry()
    }

    fn extruded(self, height: f64) -> GeometryRef {
        LinearExtrusion::new(self.into_geometry(), height).into_geometry()
    }

    /// Revolve `angle` degrees around Z
    fn revolved(self, angle: f64) -> GeometryRef {
        RotationalExtrusion::new(self.into_geometry(), angle).into_geometry()
    }

    fn projected(self) -> GeometryRef {
        Projected::full(self.into_geometry()).into_geometry()
    }

    fn sliced(self, z: f64) -> GeometryRef {
        Projected::slice(self.into_geometry(), z).into_geometry()
    }

    fn refined(self, max_edge_length: f64) -> GeometryRef {
        Refined {
            body: self.into_geometry(),
            max_edge_length,
        }
        .into_geometry()
    }

    /// Simplify with the environment's tolerance
    fn simplified(self) -> GeometryRef {
        Simplified {
            body: self.into_geometry(),
            tolerance: None,
        }
        .into_geometry()
    }

    fn offset(self, amount: f64, join: JoinStyle) -> GeometryRef {
        Offset::new(self.into_geometry(), amount, join).into_geometry()
    }

    fn convex_hull(self) -> GeometryRef {
        ConvexHull {
            body: self.into_geometry(),
        }
        .into_geometry()
    }

    fn trimmed(self, plane: Plane) -> GeometryRef {
        Trimmed {
            body: self.into_geometry(),
            plane,
        }
        .into_geometry()
    }

    fn component(self, index: usize) -> GeometryRef {
        Component {
            body: self.into_geometry(),
            index,
        }
        .into_geometry()
    }

    fn warped(
        self,
        name: impl Into<String>,
        params: Vec<ParamValue>,
        function: impl Fn(Point3<f64>) -> Point3<f64> + Send + Sync + 'static,
    ) -> GeometryRef {
        Warp::new(self.into_geometry(), name, params, Arc::new(function)).into_geometry()
    }

    fn in_part(self, identity: PartIdentity) -> GeometryRef {
        InPart {
            body: self.into_geometry(),
            identity,
        }
        .into_geometry()
    }

    fn tagged(self, tag: Tag) -> GeometryRef {
        Tagged {
            body: self.into_geometry(),
            tag,
        }
        .into_geometry()
    }

    fn defining_anchor(self, anchor: Anchor, transform: AffineTransform) -> GeometryRef {
        DefiningAnchor {
            body: self.into_geometry(),
            anchor,
            transform,
        }
        .into_geometry()
    }

    fn anchored_to(self, anchor: Anchor) -> GeometryRef {
        AnchoredTo {
            body: self.into_geometry(),
            anchor,
        }
        .into_geometry()
    }

    fn only(self) -> GeometryRef {
        Only::new(self.into_geometry()).into_geometry()
    }

    fn with_environment(self, overrides: EnvironmentOverrides) -> GeometryRef {
        WithEnvironment {
            body: self.into_geometry(),
            overrides,
        }
        .into_geometry()
    }

    fn measuring(
        self,
        reader: impl Fn(GeometryRef, &Measurements) -> GeometryRef + Send + Sync + 'static,
    ) -> GeometryRef {
        Measuring {
            body: self.into_geometry(),
            reader: Arc::new(reader),
        }
        .into_geometry()
    }

    fn reading_result(
        self,
        reader: impl Fn(GeometryRef, &BuildResult) -> GeometryRef + Send + Sync + 'static,
    ) -> GeometryRef {
        ReadResult {
            body: self.into_geometry(),
            reader: Arc::new(reader),
        }
        .into_geometry()
    }
}

impl<G: IntoGeometry + Sized> GeometryExt for G {}

#[cfg(test)]
mod tests {
    use super::primitives::{Cuboid, Rectangle};
    use super::*;
    use crate::expr::NodeKind;
    use approx::assert_relative_eq;

    #[test]
    fn test_shared_geometry_builds_like_the_original() {
        let ctx = EvaluationContext::default();
        let env = Environment::new();
        let shared: GeometryRef = Cuboid::cube(2.0).into_geometry();
        let direct = Cuboid::cube(2.0).build(&env, &ctx).unwrap();
        assert_eq!(shared.build(&env, &ctx).unwrap().node, direct.node);
        assert_eq!(shared.clone().into_geometry().build(&env, &ctx).unwrap().node, direct.node);
    }

    #[test]
    fn test_subtracting_a_disjoint_cutter_keeps_volume() {
        let ctx = EvaluationContext::default();
        let model = Cuboid::cube(2.0).subtracting(Cuboid::cube(1.0).translated(5.0, 0.0, 0.0));
        let evaluated = ctx.evaluate(&model, &Environment::new()).unwrap();
        assert!(matches!(evaluated.result.node.kind, NodeKind::Boolean { .. }));
        assert_relative_eq!(ctx.kernel().measure(&evaluated.concrete).volume, 8.0, epsilon = 1e-9);
    }

    #[test]
    fn test_extruded_rectangle_volume() {
        let ctx = EvaluationContext::default();
        let evaluated = ctx
            .evaluate(&Rectangle::new(2.0, 3.0).extruded(4.0), &Environment::new())
            .unwrap();
        assert_relative_eq!(ctx.kernel().measure(&evaluated.concrete).volume, 24.0, epsilon = 1e-9);
    }

    #[test]
    fn test_component_of_two_islands() {
        let ctx = EvaluationContext::default();
        let model = Cuboid::cube(1.0)
            .adding(Cuboid::cube(1.0).translated(3.0, 0.0, 0.0))
            .component(1);
        let evaluated = ctx.evaluate(&model, &Environment::new()).unwrap();
        assert_relative_eq!(evaluated.concrete.bounds().min.x, 3.0);

        let missing = Cuboid::cube(1.0).component(4);
        assert!(ctx.evaluate(&missing, &Environment::new()).unwrap().concrete.is_empty());
    }
}
