// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Segmentation policy for curved geometry

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// How many straight segments approximate a curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum Segmentation {
    /// Always use this many segments for a full circle
    Fixed { count: u32 },
    /// Segments no finer than `min_angle` degrees and no shorter than `min_size`
    Adaptive { min_angle: f64, min_size: f64 },
}

impl Segmentation {
    pub fn fixed(count: u32) -> Self {
        Segmentation::Fixed { count }
    }

    pub fn adaptive(min_angle: f64, min_size: f64) -> Self {
        Segmentation::Adaptive {
            min_angle,
            min_size,
        }
    }

    /// Segment count for a full circle of `radius`
    pub fn segment_count(&self, radius: f64) -> u32 {
        match *self {
            Segmentation::Fixed { count } => count.max(3),
            Segmentation::Adaptive {
                min_angle,
                min_size,
            } => {
                let by_angle = ceil_count(360.0 / min_angle);
                let by_size = ceil_count(radius.abs() * 2.0 * PI / min_size);
                by_angle.min(by_size).max(5)
            }
        }
    }

    /// Segment count for an arc of `radius` spanning `angle` degrees
    pub fn segment_count_for_arc(&self, radius: f64, angle: f64) -> u32 {
        let angle = angle.abs();
        match *self {
            Segmentation::Fixed { count } => ceil_count(f64::from(count) * angle / 360.0).max(2),
            Segmentation::Adaptive {
                min_angle,
                min_size,
            } => {
                let by_angle = ceil_count(angle / min_angle);
                let by_size = ceil_count(radius.abs() * angle.to_radians() / min_size);
                by_angle.min(by_size).max(2)
            }
        }
    }

    /// Steps for a turn of `angle` degrees with no radius to measure, such
    /// as the twist of an extrusion
    pub fn segment_count_for_angle(&self, angle: f64) -> u32 {
        let angle = angle.abs();
        match *self {
            Segmentation::Fixed { count } => ceil_count(f64::from(count) * angle / 360.0).max(1),
            Segmentation::Adaptive { min_angle, .. } => ceil_count(angle / min_angle).max(1),
        }
    }
}

impl Default for Segmentation {
    fn default() -> Self {
        Segmentation::adaptive(2.0, 0.15)
    }
}

fn ceil_count(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.ceil().min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}
