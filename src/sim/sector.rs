//! Circular sector geometry for melee sweeps
//!
//! A sector is defined around the player by:
//! - center_angle: direction the sweep faces
//! - half_angle: angular half-width of the window
//! - range: reach from the player

use glam::Vec2;
use serde::Serialize;

use crate::{angle_delta, heading_of, normalize_angle, polar_to_cartesian};

/// A pie slice centered on the player
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepSector {
    /// Facing angle (radians, normalized to [-π, π))
    pub center_angle: f32,
    pub half_angle: f32,
    pub range: f32,
}

impl SweepSector {
    pub fn new(center_angle: f32, half_angle: f32, range: f32) -> Self {
        Self {
            center_angle: normalize_angle(center_angle),
            half_angle: half_angle.max(0.0),
            range,
        }
    }

    /// Check if an angle lies within the window (handles wraparound)
    pub fn contains_angle(&self, theta: f32) -> bool {
        angle_delta(self.center_angle, theta).abs() <= self.half_angle
    }

    /// Check if a circle at `offset` from the player touches the sector.
    /// The range is extended by the circle's radius; the angle test uses its center.
    pub fn touches(&self, offset: Vec2, radius: f32) -> bool {
        offset.length() < self.range + radius && self.contains_angle(heading_of(offset))
    }

    /// Sample points along the outer edge, relative to the player
    pub fn sample_edge(&self, num_points: usize) -> Vec<Vec2> {
        let start = self.center_angle - self.half_angle;
        let span = self.half_angle * 2.0;
        (0..num_points)
            .map(|i| {
                let t = i as f32 / (num_points.saturating_sub(1)).max(1) as f32;
                polar_to_cartesian(self.range, start + t * span)
            })
            .collect()
    }
}
