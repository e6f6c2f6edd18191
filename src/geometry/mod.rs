// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - mesh and polygon representation and the algorithms
//! behind the reference kernel

pub mod analytics;
mod bbox;
pub mod boolean;
pub mod decompose;
pub mod extrude;
pub mod hull;
mod mesh;
pub mod offset;
mod polygon;
pub mod primitives;
pub mod refine;
pub mod section;
pub mod triangulate;
pub mod trim;

pub use analytics::{analyze, GeometryStats};
pub use bbox::BoundingBox;
pub use mesh::{Mesh, Triangle};
pub use polygon::{contains_point, signed_area, Polygon, PolygonSet};
