// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Affine transforms carried by resolved nodes

use super::Real;
use nalgebra::{Matrix4, Point2, Point3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Affine transform stored as a homogeneous 4x4 matrix.
///
/// Planar geometry uses the XY block; the Z row and column are left as
/// identity by every 2D constructor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AffineTransform(Matrix4<f64>);

impl AffineTransform {
    pub fn identity() -> Self {
        Self(Matrix4::identity())
    }

    pub fn from_matrix(matrix: Matrix4<f64>) -> Self {
        Self(matrix)
    }

    pub fn translation(x: f64, y: f64, z: f64) -> Self {
        Self(Matrix4::new_translation(&Vector3::new(x, y, z)))
    }

    pub fn scaling(x: f64, y: f64, z: f64) -> Self {
        Self(Matrix4::new_nonuniform_scaling(&Vector3::new(x, y, z)))
    }

    /// Rotation by Euler angles in degrees, applied X first, then Y, then Z
    pub fn rotation(x: f64, y: f64, z: f64) -> Self {
        let rx = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), x.to_radians());
        let ry = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), y.to_radians());
        let rz = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), z.to_radians());
        Self((rz * ry * rx).to_homogeneous())
    }

    /// Mirror across the planes whose normals have a non-zero component
    pub fn mirror(x: f64, y: f64, z: f64) -> Self {
        let mut m = Matrix4::identity();
        if x != 0.0 {
            m[(0, 0)] = -1.0;
        }
        if y != 0.0 {
            m[(1, 1)] = -1.0;
        }
        if z != 0.0 {
            m[(2, 2)] = -1.0;
        }
        Self(m)
    }

    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.0
    }

    /// `other` applied after `self`
    pub fn concatenated(&self, other: &AffineTransform) -> Self {
        Self(other.0 * self.0)
    }

    pub fn inverse(&self) -> Option<Self> {
        self.0.try_inverse().map(Self)
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    pub fn apply(&self, point: &Point3<f64>) -> Point3<f64> {
        self.0.transform_point(point)
    }

    pub fn apply_2d(&self, point: &Point2<f64>) -> Point2<f64> {
        let p = self.0.transform_point(&Point3::new(point.x, point.y, 0.0));
        Point2::new(p.x, p.y)
    }

    pub fn offset(&self) -> Vector3<f64> {
        Vector3::new(self.0[(0, 3)], self.0[(1, 3)], self.0[(2, 3)])
    }

    /// True when the transform reverses orientation (odd number of mirrors)
    pub fn flips_orientation(&self) -> bool {
        self.0.fixed_view::<3, 3>(0, 0).determinant() < 0.0
    }
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl PartialEq for AffineTransform {
    fn eq(&self, other: &Self) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .all(|(a, b)| Real(*a) == Real(*b))
    }
}

impl Eq for AffineTransform {}

impl Hash for AffineTransform {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for value in self.0.iter() {
            Real(*value).hash(state);
        }
    }
}
