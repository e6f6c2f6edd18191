// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Triangle mesh representation and utilities

use super::BoundingBox;
use ahash::AHashMap;
use nalgebra::{Matrix4, Point3};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Triangle defined by three vertex indices, counter-clockwise seen from outside
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triangle {
    pub indices: [usize; 3],
}

impl Triangle {
    pub fn new(indices: [usize; 3]) -> Self {
        Self { indices }
    }

    fn flipped(self) -> Self {
        Self::new([self.indices[0], self.indices[2], self.indices[1]])
    }
}

/// Indexed triangular mesh
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<Point3<f64>>,
    pub triangles: Vec<Triangle>,
}

/// Vertex count above which point-wise work is spread over the rayon pool
const PARALLEL_THRESHOLD: usize = 4096;

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn empty() -> Self {
        Self::new()
    }

    pub fn with_capacity(vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            triangles: Vec::with_capacity(triangle_count),
        }
    }

    /// Add a vertex and return its index
    pub fn add_vertex(&mut self, position: Point3<f64>) -> usize {
        let index = self.vertices.len();
        self.vertices.push(position);
        index
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Transform all vertices by a matrix, keeping faces outward under mirroring
    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        self.map_points(|p| matrix.transform_point(&p));
        if matrix.fixed_view::<3, 3>(0, 0).determinant() < 0.0 {
            for triangle in &mut self.triangles {
                *triangle = triangle.flipped();
            }
        }
    }

    /// Replace every vertex position with `f(position)`
    pub fn map_points<F>(&mut self, f: F)
    where
        F: Fn(Point3<f64>) -> Point3<f64> + Sync + Send,
    {
        if self.vertices.len() >= PARALLEL_THRESHOLD {
            self.vertices.par_iter_mut().for_each(|p| *p = f(*p));
        } else {
            self.vertices.iter_mut().for_each(|p| *p = f(*p));
        }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(self.vertices.iter())
    }

    /// Corner positions of one triangle
    pub fn triangle_points(&self, triangle: &Triangle) -> [Point3<f64>; 3] {
        triangle.indices.map(|i| self.vertices[i])
    }

    /// Append another mesh without any intersection handling
    pub fn merge(&mut self, other: &Mesh) {
        let offset = self.vertices.len();
        self.vertices.extend_from_slice(&other.vertices);
        self.triangles.extend(other.triangles.iter().map(|t| {
            Triangle::new([
                t.indices[0] + offset,
                t.indices[1] + offset,
                t.indices[2] + offset,
            ])
        }));
    }

    /// Weld vertices that fall into the same `epsilon` grid cell.
    /// Returns the number of vertices removed.
    pub fn weld_vertices(&mut self, epsilon: f64) -> usize {
        if self.vertices.is_empty() || !(epsilon > 0.0) {
            return 0;
        }

        let original_count = self.vertices.len();
        let mut cells: AHashMap<[i64; 3], usize> = AHashMap::with_capacity(original_count);
        let mut remap = Vec::with_capacity(original_count);
        let mut welded = Vec::new();

        for position in &self.vertices {
            let cell = [
                (position.x / epsilon).round() as i64,
                (position.y / epsilon).round() as i64,
                (position.z / epsilon).round() as i64,
            ];
            let index = *cells.entry(cell).or_insert_with(|| {
                welded.push(*position);
                welded.len() - 1
            });
            remap.push(index);
        }

        for triangle in &mut self.triangles {
            for index in &mut triangle.indices {
                *index = remap[*index];
            }
        }
        self.vertices = welded;
        self.remove_degenerate_triangles();

        original_count - self.vertices.len()
    }

    /// Drop triangles that reference the same vertex twice.
    /// Returns the number of triangles removed.
    pub fn remove_degenerate_triangles(&mut self) -> usize {
        let before = self.triangles.len();
        self.triangles.retain(|t| {
            let [a, b, c] = t.indices;
            a != b && b != c && a != c
        });
        before - self.triangles.len()
    }

    /// Remove vertices not referenced by any triangle.
    /// Returns the number of vertices removed.
    pub fn remove_orphaned_vertices(&mut self) -> usize {
        let mut remap = vec![usize::MAX; self.vertices.len()];
        let mut kept = Vec::new();

        for triangle in &mut self.triangles {
            for index in &mut triangle.indices {
                if remap[*index] == usize::MAX {
                    remap[*index] = kept.len();
                    kept.push(self.vertices[*index]);
                }
                *index = remap[*index];
            }
        }

        let removed = self.vertices.len() - kept.len();
        self.vertices = kept;
        removed
    }

    /// Unique undirected edges
    pub fn edge_count(&self) -> usize {
        let mut edges = ahash::AHashSet::with_capacity(self.triangles.len() * 2);
        for triangle in &self.triangles {
            for i in 0..3 {
                let a = triangle.indices[i];
                let b = triangle.indices[(i + 1) % 3];
                edges.insert(if a < b { (a, b) } else { (b, a) });
            }
        }
        edges.len()
    }
}
