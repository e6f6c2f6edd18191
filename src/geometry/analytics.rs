// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry analytics and statistics

use super::{BoundingBox, Mesh};
use ahash::AHashMap;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Geometry statistics and analytics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeometryStats {
    /// Total enclosed volume in cubic units
    pub volume: f64,
    /// Total surface area in square units
    pub surface_area: f64,
    pub bbox: BoundingBox,
    /// Mean vertex position
    pub centroid: Point3<f64>,
    pub vertex_count: usize,
    pub triangle_count: usize,
    pub edge_count: usize,
    /// Every edge is shared by exactly two triangles
    pub is_watertight: bool,
}

impl GeometryStats {
    pub fn empty() -> Self {
        Self {
            volume: 0.0,
            surface_area: 0.0,
            bbox: BoundingBox::empty(),
            centroid: Point3::origin(),
            vertex_count: 0,
            triangle_count: 0,
            edge_count: 0,
            is_watertight: false,
        }
    }
}

impl fmt::Display for GeometryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Volume:        {:>12.4}", self.volume)?;
        writeln!(f, "Surface area:  {:>12.4}", self.surface_area)?;
        if !self.bbox.is_empty() {
            let size = self.bbox.size();
            writeln!(
                f,
                "Bounds:        ({:.2}, {:.2}, {:.2}) .. ({:.2}, {:.2}, {:.2})",
                self.bbox.min.x,
                self.bbox.min.y,
                self.bbox.min.z,
                self.bbox.max.x,
                self.bbox.max.y,
                self.bbox.max.z
            )?;
            writeln!(f, "Size:          {:.2} x {:.2} x {:.2}", size.x, size.y, size.z)?;
        }
        writeln!(f, "Vertices:      {:>12}", self.vertex_count)?;
        writeln!(f, "Triangles:     {:>12}", self.triangle_count)?;
        write!(
            f,
            "Watertight:    {:>12}",
            if self.is_watertight { "yes" } else { "no" }
        )
    }
}

/// Analyze mesh geometry and compute statistics
pub fn analyze(mesh: &Mesh) -> GeometryStats {
    if mesh.vertices.is_empty() || mesh.triangles.is_empty() {
        return GeometryStats::empty();
    }

    let edges = edge_usage(mesh);

    GeometryStats {
        volume: signed_volume(mesh).abs(),
        surface_area: surface_area(mesh),
        bbox: mesh.bounding_box(),
        centroid: centroid(mesh),
        vertex_count: mesh.vertex_count(),
        triangle_count: mesh.triangle_count(),
        edge_count: edges.len(),
        is_watertight: edges.values().all(|&count| count == 2),
    }
}

/// Sum of signed tetrahedron volumes against the origin; positive for
/// outward-facing closed meshes
pub fn signed_volume(mesh: &Mesh) -> f64 {
    mesh.triangles
        .iter()
        .map(|triangle| {
            let [a, b, c] = mesh.triangle_points(triangle);
            a.coords.dot(&b.coords.cross(&c.coords)) / 6.0
        })
        .sum()
}

pub fn surface_area(mesh: &Mesh) -> f64 {
    mesh.triangles
        .iter()
        .map(|triangle| {
            let [a, b, c] = mesh.triangle_points(triangle);
            (b - a).cross(&(c - a)).norm() / 2.0
        })
        .sum()
}

fn centroid(mesh: &Mesh) -> Point3<f64> {
    let sum = mesh
        .vertices
        .iter()
        .fold(nalgebra::Vector3::zeros(), |acc, p| acc + p.coords);
    Point3::from(sum / mesh.vertices.len() as f64)
}

/// Number of triangles using each undirected edge
fn edge_usage(mesh: &Mesh) -> AHashMap<(usize, usize), usize> {
    let mut usage = AHashMap::with_capacity(mesh.triangles.len() * 2);
    for triangle in &mesh.triangles {
        for i in 0..3 {
            let a = triangle.indices[i];
            let b = triangle.indices[(i + 1) % 3];
            let edge = if a < b { (a, b) } else { (b, a) };
            *usage.entry(edge).or_insert(0) += 1;
        }
    }
    usage
}
