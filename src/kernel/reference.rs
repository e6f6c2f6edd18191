// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Reference kernel backed by the crate's own geometry algorithms

use super::{Concrete, ConcreteGeometry, Kernel, Measurements, PointFunction};
use crate::error::{EvalError, EvalResult};
use crate::expr::{
    AffineTransform, BooleanOp, Dimension, Extrusion, JoinStyle, Plane, Projection, Shape,
};
use crate::geometry::{
    analyze, boolean, decompose, extrude, hull, offset, primitives, refine, section, triangulate,
    trim, Mesh, PolygonSet,
};
use nalgebra::{Point2, Point3, Vector2, Vector3};
use tracing::trace;

/// Exact-input, approximate-boolean kernel.
///
/// Booleans classify whole triangles and polygons instead of splitting them,
/// so results are exact only where operand boundaries do not cross.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceKernel;

impl ReferenceKernel {
    pub fn new() -> Self {
        Self
    }
}

fn solid<'a>(operation: &'static str, concrete: &'a Concrete) -> EvalResult<&'a Mesh> {
    concrete.as_mesh().ok_or(EvalError::DimensionMismatch {
        operation,
        expected: Dimension::Three,
        actual: Dimension::Two,
    })
}

fn planar<'a>(operation: &'static str, concrete: &'a Concrete) -> EvalResult<&'a PolygonSet> {
    concrete.as_polygons().ok_or(EvalError::DimensionMismatch {
        operation,
        expected: Dimension::Two,
        actual: Dimension::Three,
    })
}

impl Kernel for ReferenceKernel {
    fn primitive(&self, shape: &Shape) -> EvalResult<Concrete> {
        trace!(shape = ?shape.dimension(), "kernel primitive");
        Ok(match shape {
            Shape::Rectangle { size } => {
                Concrete::planar(primitives::rectangle(Vector2::new(size[0].0, size[1].0)))
            }
            Shape::Circle { radius, segments } => {
                Concrete::planar(primitives::circle(radius.0, *segments))
            }
            Shape::Polygon { points } => Concrete::planar(primitives::polygon(
                points.iter().map(|p| Point2::new(p[0].0, p[1].0)).collect(),
            )),
            Shape::Box { size } => Concrete::solid(primitives::cuboid(Vector3::new(
                size[0].0, size[1].0, size[2].0,
            ))),
            Shape::Sphere { radius, segments } => {
                Concrete::solid(primitives::sphere(radius.0, *segments))
            }
            Shape::Cylinder {
                bottom_radius,
                top_radius,
                height,
                segments,
            } => Concrete::solid(primitives::cylinder(
                bottom_radius.0,
                top_radius.0,
                height.0,
                *segments,
            )),
            Shape::Polyhedron { vertices, faces } => Concrete::solid(primitives::polyhedron(
                vertices.iter().map(|v| Point3::new(v[0].0, v[1].0, v[2].0)).collect(),
                faces,
            )),
        })
    }

    fn boolean(
        &self,
        dimension: Dimension,
        children: &[std::sync::Arc<Concrete>],
        op: BooleanOp,
    ) -> EvalResult<Concrete> {
        trace!(?op, children = children.len(), "kernel boolean");
        match dimension {
            Dimension::Two => {
                let sets = children
                    .iter()
                    .map(|c| planar("boolean", c).cloned())
                    .collect::<EvalResult<Vec<_>>>()?;
                Ok(Concrete::planar(boolean::polygon_boolean(&sets, op)))
            }
            Dimension::Three => {
                let meshes = children
                    .iter()
                    .map(|c| solid("boolean", c).cloned())
                    .collect::<EvalResult<Vec<_>>>()?;
                Ok(Concrete::solid(boolean::mesh_boolean(&meshes, op)))
            }
        }
    }

    fn transform(&self, child: &Concrete, transform: &AffineTransform) -> EvalResult<Concrete> {
        Ok(match child.geometry() {
            ConcreteGeometry::Planar(polygons) => {
                let mut polygons = polygons.clone();
                polygons.transform(transform.matrix());
                Concrete::planar(polygons)
            }
            ConcreteGeometry::Solid(mesh) => {
                let mut mesh = mesh.clone();
                mesh.transform(transform.matrix());
                Concrete::solid(mesh)
            }
        })
    }

    fn extrude(&self, child: &Concrete, extrusion: &Extrusion) -> EvalResult<Concrete> {
        let profile = planar("extrusion", child)?;
        let mesh = match extrusion {
            Extrusion::Linear {
                height,
                twist,
                scale_top,
                divisions,
            } => extrude::linear_extrude(
                profile,
                height.0,
                twist.0,
                [scale_top[0].0, scale_top[1].0],
                *divisions,
            ),
            Extrusion::Rotational { angle, segments } => {
                extrude::revolve(profile, angle.0, *segments)
            }
        };
        trace!(triangles = mesh.triangle_count(), "kernel extrude");
        Ok(Concrete::solid(mesh))
    }

    fn project(&self, child: &Concrete, projection: &Projection) -> EvalResult<Concrete> {
        let mesh = solid("projection", child)?;
        Ok(Concrete::planar(match projection {
            Projection::Full => section::project(mesh),
            Projection::Slice { z } => section::slice(mesh, z.0),
        }))
    }

    fn transform_points(&self, child: &Concrete, function: &PointFunction) -> EvalResult<Concrete> {
        Ok(match child.geometry() {
            ConcreteGeometry::Planar(polygons) => {
                let mut polygons = polygons.clone();
                for p in polygons.polygons.iter_mut().flatten() {
                    let q = function(Point3::new(p.x, p.y, 0.0));
                    *p = Point2::new(q.x, q.y);
                }
                Concrete::planar(polygons)
            }
            ConcreteGeometry::Solid(mesh) => {
                let mut mesh = mesh.clone();
                mesh.map_points(function);
                Concrete::solid(mesh)
            }
        })
    }

    fn refine(&self, child: &Concrete, max_edge_length: f64) -> EvalResult<Concrete> {
        Ok(match child.geometry() {
            ConcreteGeometry::Planar(polygons) => {
                Concrete::planar(refine::refine_polygons(polygons, max_edge_length))
            }
            ConcreteGeometry::Solid(mesh) => {
                Concrete::solid(refine::refine_mesh(mesh, max_edge_length))
            }
        })
    }

    fn simplify(&self, child: &Concrete, tolerance: f64) -> EvalResult<Concrete> {
        Ok(match child.geometry() {
            ConcreteGeometry::Planar(polygons) => {
                Concrete::planar(refine::simplify_polygons(polygons, tolerance))
            }
            ConcreteGeometry::Solid(mesh) => Concrete::solid(refine::simplify_mesh(mesh, tolerance)),
        })
    }

    fn offset(
        &self,
        child: &Concrete,
        amount: f64,
        join: JoinStyle,
        miter_limit: f64,
        segments: u32,
    ) -> EvalResult<Concrete> {
        let polygons = planar("offset", child)?;
        Ok(Concrete::planar(offset::offset_polygons(
            polygons,
            amount,
            join,
            miter_limit,
            segments,
        )))
    }

    fn convex_hull(&self, child: &Concrete) -> EvalResult<Concrete> {
        Ok(match child.geometry() {
            ConcreteGeometry::Planar(polygons) => {
                let outline = hull::convex_hull_2d(polygons.points());
                if outline.len() >= 3 {
                    Concrete::planar(PolygonSet::new(vec![outline]))
                } else {
                    Concrete::empty(Dimension::Two)
                }
            }
            ConcreteGeometry::Solid(mesh) => Concrete::solid(hull::convex_hull_3d(&mesh.vertices)),
        })
    }

    fn decompose(&self, child: &Concrete) -> EvalResult<Vec<Concrete>> {
        Ok(match child.geometry() {
            ConcreteGeometry::Planar(polygons) => decompose::decompose_polygons(polygons)
                .into_iter()
                .map(Concrete::planar)
                .collect(),
            ConcreteGeometry::Solid(mesh) => decompose::decompose_mesh(mesh)
                .into_iter()
                .map(Concrete::solid)
                .collect(),
        })
    }

    fn select(&self, dimension: Dimension, parts: Vec<Concrete>, index: usize) -> EvalResult<Concrete> {
        if let Some(part) = parts.iter().find(|p| p.dimension() != dimension) {
            return Err(EvalError::DimensionMismatch {
                operation: "select",
                expected: dimension,
                actual: part.dimension(),
            });
        }
        Ok(parts
            .into_iter()
            .nth(index)
            .unwrap_or_else(|| Concrete::empty(dimension)))
    }

    fn trim(&self, child: &Concrete, plane: &Plane) -> EvalResult<Concrete> {
        let [nx, ny, nz] = plane.normal.map(|v| v.0);
        Ok(match child.geometry() {
            ConcreteGeometry::Planar(polygons) => {
                Concrete::planar(trim::trim_polygons(polygons, [nx, ny], plane.offset.0))
            }
            ConcreteGeometry::Solid(mesh) => Concrete::solid(trim::trim_mesh(
                mesh,
                Vector3::new(nx, ny, nz),
                plane.offset.0,
            )),
        })
    }

    fn measure(&self, concrete: &Concrete) -> Measurements {
        match concrete.geometry() {
            ConcreteGeometry::Planar(polygons) => Measurements {
                dimension: Dimension::Two,
                bounds: *concrete.bounds(),
                area: polygons.area(),
                volume: 0.0,
                surface_area: polygons.perimeter(),
                triangle_count: triangulate::triangulate_polygons(polygons).len(),
                edge_count: polygons.point_count(),
            },
            ConcreteGeometry::Solid(mesh) => {
                let stats = analyze(mesh);
                Measurements {
                    dimension: Dimension::Three,
                    bounds: *concrete.bounds(),
                    area: 0.0,
                    volume: stats.volume,
                    surface_area: stats.surface_area,
                    triangle_count: stats.triangle_count,
                    edge_count: stats.edge_count,
                }
            }
        }
    }

    fn triangulate(&self, concrete: &Concrete) -> Vec<[Point3<f64>; 3]> {
        match concrete.geometry() {
            ConcreteGeometry::Planar(polygons) => triangulate::triangulate_polygons(polygons)
                .into_iter()
                .map(|triangle| triangle.map(|p| Point3::new(p.x, p.y, 0.0)))
                .collect(),
            ConcreteGeometry::Solid(mesh) => mesh
                .triangles
                .iter()
                .map(|t| mesh.triangle_points(t))
                .collect(),
        }
    }
}
