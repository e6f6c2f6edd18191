// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Binary STL export and STL import

use crate::build::BuildResult;
use crate::context::EvaluationContext;
use crate::elements::{PartIdentity, PartSemantic};
use crate::error::{ExportError, ImportError};
use crate::expr::Dimension;
use crate::geometry::{Mesh, Triangle};
use nalgebra::{Point3, Vector3};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;
use stl_io::{Normal, Triangle as StlTriangle, Vertex as StlVertex};
use tracing::debug;

const FORMAT: &str = "STL";

/// Which parts of a model an export should contain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PartSelection {
    /// Main body and every solid part, merged
    #[default]
    All,
    MainOnly,
    Parts(Vec<PartIdentity>),
}

/// Write the main body merged with its solid parts as binary STL.
///
/// STL has no notion of parts, so any selection other than
/// [`PartSelection::All`] is rejected.
pub fn write_stl<W: Write>(
    ctx: &EvaluationContext,
    result: &BuildResult,
    writer: &mut W,
    selection: PartSelection,
) -> Result<(), ExportError> {
    if selection != PartSelection::All {
        return Err(ExportError::UnsupportedFeature {
            format: FORMAT,
            feature: "part selection".to_string(),
        });
    }
    if result.dimension() != Dimension::Three {
        return Err(ExportError::UnsupportedDimension {
            format: FORMAT,
            dimension: result.dimension(),
        });
    }

    let mut triangles = Vec::new();
    for target in ctx.export_parts(result)? {
        let included = match &target.identity {
            None => true,
            Some(identity) => {
                identity.semantic() == PartSemantic::Solid
                    && target.concrete.dimension() == Dimension::Three
            }
        };
        if !included {
            debug!(part = ?target.identity, "skipping part in STL export");
            continue;
        }
        triangles.extend(ctx.kernel().triangulate(&target.concrete).iter().map(stl_triangle));
    }

    debug!(triangles = triangles.len(), "writing STL");
    stl_io::write_stl(writer, triangles.iter())?;
    Ok(())
}

fn stl_triangle(points: &[Point3<f64>; 3]) -> StlTriangle {
    let [a, b, c] = points;
    let normal = (b - a)
        .cross(&(c - a))
        .try_normalize(1e-12)
        .unwrap_or_else(Vector3::zeros);
    let vertex = |p: &Point3<f64>| StlVertex::new([p.x as f32, p.y as f32, p.z as f32]);
    StlTriangle {
        normal: Normal::new([normal.x as f32, normal.y as f32, normal.z as f32]),
        vertices: [vertex(a), vertex(b), vertex(c)],
    }
}

/// Read an ASCII or binary STL file into a mesh
pub fn read_stl(path: impl AsRef<Path>) -> Result<Mesh, ImportError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let stl = stl_io::read_stl(&mut BufReader::new(file)).map_err(|e| ImportError::Malformed {
        format: FORMAT,
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut mesh = Mesh::with_capacity(stl.vertices.len(), stl.faces.len());
    for vertex in &stl.vertices {
        mesh.add_vertex(Point3::new(
            f64::from(vertex[0]),
            f64::from(vertex[1]),
            f64::from(vertex[2]),
        ));
    }
    for face in &stl.faces {
        if let Some(&index) = face.vertices.iter().find(|&&i| i >= mesh.vertices.len()) {
            return Err(ImportError::Malformed {
                format: FORMAT,
                path: path.to_path_buf(),
                message: format!("face references missing vertex {}", index),
            });
        }
        mesh.add_triangle(Triangle::new(face.vertices));
    }
    Ok(mesh)
}
