// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Build environment
//!
//! An [`Environment`] is passed by value down the geometry tree while it is
//! resolved into nodes. Geometries read only the settings they need and bake
//! the resulting numbers into node parameters, so the environment itself is
//! never part of a node's identity.

mod config;
mod segmentation;

pub use config::EnvironmentConfig;
pub use segmentation::Segmentation;

use crate::expr::AffineTransform;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Whether geometry is currently being added or subtracted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    #[default]
    Addition,
    Subtraction,
}

impl Operation {
    pub fn inverted(self) -> Self {
        match self {
            Operation::Addition => Operation::Subtraction,
            Operation::Subtraction => Operation::Addition,
        }
    }
}

/// How printable-overhang relief is shaped by operations that care about it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverhangMethod {
    #[default]
    None,
    Teardrop,
    Bridge,
}

/// Immutable configuration for resolving geometry
#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    pub segmentation: Segmentation,
    /// Numeric tolerance used by simplification and comparisons
    pub tolerance: f64,
    /// Maximum twist in degrees per unit of extrusion height
    pub max_twist_rate: Option<f64>,
    pub natural_up: Option<Vector3<f64>>,
    pub overhang_method: OverhangMethod,
    pub operation: Operation,
    /// Transform accumulated from the root down to the current geometry
    pub transform: AffineTransform,
    pub miter_limit: f64,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            segmentation: Segmentation::default(),
            tolerance: 0.001,
            max_twist_rate: None,
            natural_up: None,
            overhang_method: OverhangMethod::None,
            operation: Operation::Addition,
            transform: AffineTransform::identity(),
            miter_limit: 2.0,
        }
    }
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Child scope: overridden settings replace ours, the rest is inherited
    pub fn applying(&self, overrides: &EnvironmentOverrides) -> Environment {
        let mut env = self.clone();
        if let Some(segmentation) = overrides.segmentation {
            env.segmentation = segmentation;
        }
        if let Some(tolerance) = overrides.tolerance {
            env.tolerance = tolerance;
        }
        if let Some(rate) = overrides.max_twist_rate {
            env.max_twist_rate = Some(rate);
        }
        if let Some(up) = overrides.natural_up {
            env.natural_up = Some(up);
        }
        if let Some(method) = overrides.overhang_method {
            env.overhang_method = method;
        }
        if let Some(operation) = overrides.operation {
            env.operation = operation;
        }
        if let Some(limit) = overrides.miter_limit {
            env.miter_limit = limit;
        }
        env
    }

    pub fn with_segmentation(&self, segmentation: Segmentation) -> Environment {
        Environment {
            segmentation,
            ..self.clone()
        }
    }

    pub fn with_tolerance(&self, tolerance: f64) -> Environment {
        Environment {
            tolerance,
            ..self.clone()
        }
    }

    pub fn with_max_twist_rate(&self, rate: f64) -> Environment {
        Environment {
            max_twist_rate: Some(rate),
            ..self.clone()
        }
    }

    pub fn with_natural_up(&self, up: Vector3<f64>) -> Environment {
        Environment {
            natural_up: Some(up),
            ..self.clone()
        }
    }

    pub fn with_operation(&self, operation: Operation) -> Environment {
        Environment {
            operation,
            ..self.clone()
        }
    }

    /// Scope for a child placed by `local` relative to the current geometry
    pub fn transformed(&self, local: &AffineTransform) -> Environment {
        Environment {
            transform: local.concatenated(&self.transform),
            ..self.clone()
        }
    }

    pub fn segment_count(&self, radius: f64) -> u32 {
        self.segmentation.segment_count(radius)
    }

    pub fn segment_count_for_arc(&self, radius: f64, angle: f64) -> u32 {
        self.segmentation.segment_count_for_arc(radius, angle)
    }

    /// Number of slices for a linear extrusion twisting `twist` degrees.
    ///
    /// `max_twist_rate` is the most twist, in degrees, one slice may carry,
    /// whatever the extrusion height. The segmentation's angular step bounds
    /// the count as well.
    pub fn twist_divisions(&self, twist: f64) -> u32 {
        if twist == 0.0 {
            return 1;
        }
        let by_rate = match self.max_twist_rate {
            Some(rate) if rate > 0.0 => (twist.abs() / rate).ceil() as u32,
            _ => 0,
        };
        by_rate.max(self.segmentation.segment_count_for_angle(twist))
    }
}

/// Partial environment: every unset field inherits from the enclosing scope
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvironmentOverrides {
    pub segmentation: Option<Segmentation>,
    pub tolerance: Option<f64>,
    pub max_twist_rate: Option<f64>,
    pub natural_up: Option<Vector3<f64>>,
    pub overhang_method: Option<OverhangMethod>,
    pub operation: Option<Operation>,
    pub miter_limit: Option<f64>,
}

impl EnvironmentOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn segmentation(mut self, segmentation: Segmentation) -> Self {
        self.segmentation = Some(segmentation);
        self
    }

    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    pub fn max_twist_rate(mut self, rate: f64) -> Self {
        self.max_twist_rate = Some(rate);
        self
    }

    pub fn overhang_method(mut self, method: OverhangMethod) -> Self {
        self.overhang_method = Some(method);
        self
    }

    pub fn operation(mut self, operation: Operation) -> Self {
        self.operation = Some(operation);
        self
    }

    pub fn miter_limit(mut self, limit: f64) -> Self {
        self.miter_limit = Some(limit);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_inherit_unset_fields() {
        let parent = Environment::default()
            .with_tolerance(0.5)
            .with_operation(Operation::Subtraction);
        let child = parent.applying(&EnvironmentOverrides::new().segmentation(Segmentation::fixed(8)));

        assert_eq!(child.segmentation, Segmentation::fixed(8));
        assert_eq!(child.tolerance, 0.5);
        assert_eq!(child.operation, Operation::Subtraction);
    }

    #[test]
    fn test_nested_scopes_prefer_innermost() {
        let outer = Environment::default().applying(&EnvironmentOverrides::new().tolerance(0.1));
        let inner = outer.applying(&EnvironmentOverrides::new().tolerance(0.2));
        assert_eq!(outer.tolerance, 0.1);
        assert_eq!(inner.tolerance, 0.2);
    }

    #[test]
    fn test_transform_accumulates_outside_in() {
        let env = Environment::default()
            .transformed(&AffineTransform::scaling(2.0, 2.0, 2.0))
            .transformed(&AffineTransform::translation(1.0, 0.0, 0.0));
        let p = env.transform.apply(&nalgebra::Point3::origin());
        assert_eq!(p.x, 2.0);
    }

    #[test]
    fn test_twist_divisions_respect_rate() {
        let env = Environment::default()
            .with_segmentation(Segmentation::fixed(4))
            .with_max_twist_rate(10.0);
        assert_eq!(env.twist_divisions(0.0), 1);
        assert_eq!(env.twist_divisions(90.0), 9);
        assert_eq!(env.twist_divisions(-90.0), 9);
    }

    #[test]
    fn test_twist_divisions_take_finer_bound() {
        // Adaptive 2 degree steps over a quarter turn, with or without a rate
        let env = Environment::default();
        assert_eq!(env.twist_divisions(90.0), 45);
        assert_eq!(env.with_max_twist_rate(1.0).twist_divisions(90.0), 90);
        assert_eq!(env.with_max_twist_rate(30.0).twist_divisions(90.0), 45);
        // A fine fixed policy wins over a coarse rate
        let fixed = env.with_segmentation(Segmentation::fixed(360));
        assert_eq!(fixed.with_max_twist_rate(45.0).twist_divisions(90.0), 90);
    }
}
