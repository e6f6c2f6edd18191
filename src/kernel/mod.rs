// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry kernel interface
//!
//! The evaluation context never touches polygons or meshes itself: every
//! realized node is produced by a [`Kernel`] from the already realized
//! children. [`ReferenceKernel`] is the in-crate implementation backed by
//! the `geometry` module.

mod reference;

pub use reference::ReferenceKernel;

use crate::error::EvalResult;
use crate::expr::{AffineTransform, BooleanOp, Dimension, Extrusion, JoinStyle, Plane, Projection, Shape};
use crate::geometry::{BoundingBox, Mesh, PolygonSet};
use nalgebra::{Point3, Vector3};
use std::fmt;
use std::sync::Arc;

/// Point function applied by warps
pub type PointFunction = dyn Fn(Point3<f64>) -> Point3<f64> + Send + Sync;

/// Kernel-native geometry of one dimensionality
#[derive(Debug, Clone)]
pub enum ConcreteGeometry {
    Planar(PolygonSet),
    Solid(Mesh),
}

/// Realized geometry of a node, with its bounds computed once
#[derive(Debug, Clone)]
pub struct Concrete {
    geometry: ConcreteGeometry,
    bounds: BoundingBox,
}

impl Concrete {
    pub fn planar(polygons: PolygonSet) -> Self {
        let bounds = polygons.bounding_box();
        Self {
            geometry: ConcreteGeometry::Planar(polygons),
            bounds,
        }
    }

    pub fn solid(mesh: Mesh) -> Self {
        let bounds = mesh.bounding_box();
        Self {
            geometry: ConcreteGeometry::Solid(mesh),
            bounds,
        }
    }

    pub fn empty(dimension: Dimension) -> Self {
        match dimension {
            Dimension::Two => Self::planar(PolygonSet::empty()),
            Dimension::Three => Self::solid(Mesh::empty()),
        }
    }

    /// Components laid side by side without any boolean
    pub fn merged(dimension: Dimension, parts: &[Concrete]) -> Self {
        match dimension {
            Dimension::Two => {
                let mut polygons = PolygonSet::empty();
                parts.iter().filter_map(Concrete::as_polygons).for_each(|p| polygons.merge(p));
                Self::planar(polygons)
            }
            Dimension::Three => {
                let mut mesh = Mesh::empty();
                parts.iter().filter_map(Concrete::as_mesh).for_each(|m| mesh.merge(m));
                Self::solid(mesh)
            }
        }
    }

    pub fn dimension(&self) -> Dimension {
        match self.geometry {
            ConcreteGeometry::Planar(_) => Dimension::Two,
            ConcreteGeometry::Solid(_) => Dimension::Three,
        }
    }

    pub fn geometry(&self) -> &ConcreteGeometry {
        &self.geometry
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    pub fn is_empty(&self) -> bool {
        match &self.geometry {
            ConcreteGeometry::Planar(polygons) => polygons.is_empty(),
            ConcreteGeometry::Solid(mesh) => mesh.is_empty(),
        }
    }

    pub fn as_mesh(&self) -> Option<&Mesh> {
        match &self.geometry {
            ConcreteGeometry::Solid(mesh) => Some(mesh),
            ConcreteGeometry::Planar(_) => None,
        }
    }

    pub fn as_polygons(&self) -> Option<&PolygonSet> {
        match &self.geometry {
            ConcreteGeometry::Planar(polygons) => Some(polygons),
            ConcreteGeometry::Solid(_) => None,
        }
    }
}

/// Measured properties of realized geometry.
///
/// `area` is zero for solids and `volume` is zero for planar geometry;
/// `surface_area` is the perimeter of planar geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurements {
    pub dimension: Dimension,
    pub bounds: BoundingBox,
    pub area: f64,
    pub volume: f64,
    pub surface_area: f64,
    pub triangle_count: usize,
    pub edge_count: usize,
}

impl Measurements {
    pub fn size(&self) -> Vector3<f64> {
        self.bounds.size()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }
}

impl fmt::Display for Measurements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dimension:      {}", self.dimension)?;
        if self.bounds.is_empty() {
            writeln!(f, "Bounds:         empty")?;
        } else {
            let (min, max) = (self.bounds.min, self.bounds.max);
            writeln!(
                f,
                "Bounds:         [{:.4}, {:.4}, {:.4}] .. [{:.4}, {:.4}, {:.4}]",
                min.x, min.y, min.z, max.x, max.y, max.z
            )?;
        }
        match self.dimension {
            Dimension::Two => {
                writeln!(f, "Area:           {:.6}", self.area)?;
                writeln!(f, "Perimeter:      {:.6}", self.surface_area)?;
            }
            Dimension::Three => {
                writeln!(f, "Volume:         {:.6}", self.volume)?;
                writeln!(f, "Surface area:   {:.6}", self.surface_area)?;
            }
        }
        writeln!(f, "Triangles:      {}", self.triangle_count)?;
        write!(f, "Edges:          {}", self.edge_count)
    }
}

/// Geometry operations consumed by the evaluation context.
///
/// Inputs arrive in the order their node declares, which matters for
/// differences. Implementations must be pure: the context caches every
/// output under the node that requested it.
pub trait Kernel: Send + Sync {
    fn primitive(&self, shape: &Shape) -> EvalResult<Concrete>;

    fn boolean(
        &self,
        dimension: Dimension,
        children: &[Arc<Concrete>],
        op: BooleanOp,
    ) -> EvalResult<Concrete>;

    fn transform(&self, child: &Concrete, transform: &AffineTransform) -> EvalResult<Concrete>;

    /// Planar to solid
    fn extrude(&self, child: &Concrete, extrusion: &Extrusion) -> EvalResult<Concrete>;

    /// Solid to planar
    fn project(&self, child: &Concrete, projection: &Projection) -> EvalResult<Concrete>;

    /// Move every point of `child` through `function`; planar points have z = 0
    fn transform_points(&self, child: &Concrete, function: &PointFunction) -> EvalResult<Concrete>;

    fn refine(&self, child: &Concrete, max_edge_length: f64) -> EvalResult<Concrete>;

    fn simplify(&self, child: &Concrete, tolerance: f64) -> EvalResult<Concrete>;

    /// Planar only
    fn offset(
        &self,
        child: &Concrete,
        amount: f64,
        join: JoinStyle,
        miter_limit: f64,
        segments: u32,
    ) -> EvalResult<Concrete>;

    fn convex_hull(&self, child: &Concrete) -> EvalResult<Concrete>;

    /// Connected components in a stable order
    fn decompose(&self, child: &Concrete) -> EvalResult<Vec<Concrete>>;

    /// The component at `index`, or empty geometry when out of range
    fn select(&self, dimension: Dimension, parts: Vec<Concrete>, index: usize) -> EvalResult<Concrete>;

    /// Keep the side of `plane` its normal points into
    fn trim(&self, child: &Concrete, plane: &Plane) -> EvalResult<Concrete>;

    fn measure(&self, concrete: &Concrete) -> Measurements;

    /// Triangles covering the geometry; planar triangles lie in z = 0
    fn triangulate(&self, concrete: &Concrete) -> Vec<[Point3<f64>; 3]>;
}
