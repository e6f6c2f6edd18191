// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Splitting geometry into connected components

use super::triangulate::group_outlines;
use super::{Mesh, PolygonSet, Triangle};
use ahash::AHashMap;

/// Connected components of a mesh, in order of first appearance
pub fn decompose_mesh(mesh: &Mesh) -> Vec<Mesh> {
    let mut welded = mesh.clone();
    welded.weld_vertices(1e-9);

    let mut parent: Vec<usize> = (0..welded.vertices.len()).collect();
    for triangle in &welded.triangles {
        let [a, b, c] = triangle.indices;
        union(&mut parent, a, b);
        union(&mut parent, b, c);
    }

    let mut components: Vec<Mesh> = Vec::new();
    let mut slots: AHashMap<usize, usize> = AHashMap::new();
    let mut remaps: Vec<AHashMap<usize, usize>> = Vec::new();

    for triangle in &welded.triangles {
        let root = find(&mut parent, triangle.indices[0]);
        let slot = *slots.entry(root).or_insert_with(|| {
            components.push(Mesh::new());
            remaps.push(AHashMap::new());
            components.len() - 1
        });
        let (component, remap) = (&mut components[slot], &mut remaps[slot]);
        let indices = triangle.indices.map(|i| {
            *remap
                .entry(i)
                .or_insert_with(|| component.add_vertex(welded.vertices[i]))
        });
        component.add_triangle(Triangle::new(indices));
    }
    components
}

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

fn union(parent: &mut [usize], a: usize, b: usize) {
    let (ra, rb) = (find(parent, a), find(parent, b));
    if ra != rb {
        parent[rb] = ra;
    }
}

/// Each outline together with the holes inside it
pub fn decompose_polygons(set: &PolygonSet) -> Vec<PolygonSet> {
    group_outlines(set)
        .into_iter()
        .map(|(outline, holes)| {
            let mut polygons = Vec::with_capacity(holes.len() + 1);
            polygons.push(outline);
            polygons.extend(holes);
            PolygonSet::new(polygons)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::primitives;
    use nalgebra::{Matrix4, Vector2, Vector3};

    #[test]
    fn test_two_cubes_are_two_components() {
        let mut mesh = primitives::cuboid(Vector3::new(1.0, 1.0, 1.0));
        let mut other = primitives::cuboid(Vector3::new(1.0, 1.0, 1.0));
        other.transform(&Matrix4::new_translation(&Vector3::new(3.0, 0.0, 0.0)));
        mesh.merge(&other);

        let parts = decompose_mesh(&mesh);
        assert_eq!(parts.len(), 2);
        assert!(parts.iter().all(|p| p.triangle_count() == 12 && p.vertex_count() == 8));
        assert!(parts[1].bounding_box().min.x > 2.0);
    }

    #[test]
    fn test_polygon_islands() {
        let mut set = primitives::rectangle(Vector2::new(1.0, 1.0));
        let mut island = primitives::rectangle(Vector2::new(1.0, 1.0));
        island.transform(&Matrix4::new_translation(&Vector3::new(5.0, 0.0, 0.0)));
        set.merge(&island);
        assert_eq!(decompose_polygons(&set).len(), 2);
    }
}
