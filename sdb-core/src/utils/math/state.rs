//! Swerve module state types and angle optimization.
//!
//! A [`ModuleState`] is a desired or measured (speed, heading) pair for one
//! module. [`ModuleState::optimize`] picks whichever of the two kinematically
//! equivalent states needs the smaller steering rotation, so a module never
//! turns more than 90 degrees to satisfy a request.

use serde::{Deserialize, Serialize};

use super::angle;

/// Speed (m/s, signed) and heading (degrees, wrapped to `(-180, 180]`) of one
/// swerve module. Reverse travel is encoded either by a negative speed or by a
/// 180-degree rotated heading; both describe the same wheel motion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModuleState {
    /// Signed wheel speed in meters per second.
    pub speed: f32,
    /// Steering heading in degrees.
    pub heading: f32,
}

impl ModuleState {
    /// Create a state with the heading wrapped into the canonical range.
    pub fn new(
        speed: f32,
        heading: f32,
    ) -> Self {
        Self {
            speed,
            heading: angle::normalize_degrees(heading),
        }
    }

    /// Return the equivalent state whose heading is within 90 degrees of
    /// `current_heading`.
    ///
    /// If the shortest-path error to the desired heading exceeds 90 degrees,
    /// the heading is flipped by 180 degrees and the speed negated; the wheel
    /// motion is unchanged. Idempotent for a fixed `current_heading`.
    pub fn optimize(
        self,
        current_heading: f32,
    ) -> ModuleState {
        let error = angle::normalize_degrees(self.heading - current_heading);
        if error.abs() > 90.0 {
            ModuleState {
                speed: -self.speed,
                heading: angle::normalize_degrees(self.heading + 180.0),
            }
        } else {
            ModuleState {
                speed: self.speed,
                heading: angle::normalize_degrees(self.heading),
            }
        }
    }
}

/// Accumulated drive distance (meters) and heading (degrees) of one module,
/// as reported by the drive encoder and heading sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModulePosition {
    pub distance: f32,
    pub heading: f32,
}
