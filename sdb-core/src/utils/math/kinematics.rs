//! Kinematics for fixed-axis differential (tank) drivetrains.
//!
//! The `DifferentialKinematics` struct maps a body-frame chassis motion onto
//! left/right wheel speeds and inverts wheel measurements back to chassis
//! motion.
//!
//! # Example
//! ```rust
//! use sdb_core::utils::math::kinematics::DifferentialKinematics;
//! let kin = DifferentialKinematics::new(0.6);
//! let speeds = kin.to_wheel_speeds(2.0, 1.0);
//! ```

/// Left and right wheel velocities (m/s) produced by one kinematics call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelSpeedPair {
    pub left: f32,
    pub right: f32,
}

/// Represents the kinematics of a differential (tank) drivetrain.
pub struct DifferentialKinematics {
    /// Lateral distance between left and right wheel contact points (m)
    track_width: f32,
}

impl DifferentialKinematics {
    /// Instantiate for a drivetrain with the given track width (m).
    pub fn new(track_width: f32) -> Self {
        Self { track_width }
    }

    pub fn track_width(&self) -> f32 {
        self.track_width
    }

    /// Left wheel speed for a linear velocity (m/s) and turn rate (rad/s).
    pub fn to_left_wheel_speed(
        &self,
        linear_velocity: f32,
        angular_velocity: f32,
    ) -> f32 {
        linear_velocity - self.track_width / 2.0 * angular_velocity
    }

    /// Right wheel speed for a linear velocity (m/s) and turn rate (rad/s).
    pub fn to_right_wheel_speed(
        &self,
        linear_velocity: f32,
        angular_velocity: f32,
    ) -> f32 {
        linear_velocity + self.track_width / 2.0 * angular_velocity
    }

    /// Left wheel speed for a linear velocity and path curvature (1/m).
    ///
    /// Curvature is the turn rate divided by the linear velocity, the natural
    /// parameterization for throttle-plus-wheel driver input.
    pub fn to_left_wheel_speed_curvature(
        &self,
        linear_velocity: f32,
        curvature: f32,
    ) -> f32 {
        linear_velocity * (2.0 - curvature * self.track_width) / 2.0
    }

    /// Right wheel speed for a linear velocity and path curvature (1/m).
    pub fn to_right_wheel_speed_curvature(
        &self,
        linear_velocity: f32,
        curvature: f32,
    ) -> f32 {
        linear_velocity * (2.0 + curvature * self.track_width) / 2.0
    }

    /// Both wheel speeds for a linear velocity and turn rate.
    pub fn to_wheel_speeds(
        &self,
        linear_velocity: f32,
        angular_velocity: f32,
    ) -> WheelSpeedPair {
        WheelSpeedPair {
            left: self.to_left_wheel_speed(linear_velocity, angular_velocity),
            right: self.to_right_wheel_speed(linear_velocity, angular_velocity),
        }
    }

    /// Both wheel speeds for a linear velocity and path curvature.
    pub fn to_wheel_speeds_curvature(
        &self,
        linear_velocity: f32,
        curvature: f32,
    ) -> WheelSpeedPair {
        WheelSpeedPair {
            left: self.to_left_wheel_speed_curvature(linear_velocity, curvature),
            right: self.to_right_wheel_speed_curvature(linear_velocity, curvature),
        }
    }

    /// Recover chassis motion from measured wheel speeds.
    ///
    /// # Returns
    ///
    /// `(v, ω)` where `v` is linear velocity (m/s) and `ω` is turn rate
    /// (rad/s). Exact inverse of [`to_wheel_speeds`](Self::to_wheel_speeds)
    /// up to float rounding.
    pub fn to_chassis_speeds(
        &self,
        speeds: WheelSpeedPair,
    ) -> (f32, f32) {
        let linear = (speeds.left + speeds.right) / 2.0;
        let angular = (speeds.right - speeds.left) / self.track_width;
        (linear, angular)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worked_example() {
        let kin = DifferentialKinematics::new(0.6);
        let speeds = kin.to_wheel_speeds(2.0, 1.0);
        assert!((speeds.left - 1.7).abs() < 1e-6);
        assert!((speeds.right - 2.3).abs() < 1e-6);
    }

    #[test]
    fn zero_motion_maps_to_zero() {
        let kin = DifferentialKinematics::new(0.5);
        let speeds = kin.to_wheel_speeds(0.0, 0.0);
        assert_eq!(speeds, WheelSpeedPair { left: 0.0, right: 0.0 });
    }

    #[test]
    fn round_trip_reproduces_chassis_motion() {
        let kin = DifferentialKinematics::new(0.55);
        for &(v, w) in &[(1.23, 0.5), (-2.0, 1.7), (0.0, 3.0), (4.0, -0.25)] {
            let speeds = kin.to_wheel_speeds(v, w);
            let (rv, rw) = kin.to_chassis_speeds(speeds);
            assert!((rv - v).abs() < 1e-6, "v {} came back {}", v, rv);
            assert!((rw - w).abs() < 1e-6, "w {} came back {}", w, rw);
        }
    }

    #[test]
    fn curvature_form_agrees_with_rate_form() {
        let kin = DifferentialKinematics::new(0.6);
        for &(v, w) in &[(2.0, 1.0), (1.5, -0.8), (-3.0, 0.4)] {
            let curvature = w / v;
            let rate = kin.to_wheel_speeds(v, w);
            let curve = kin.to_wheel_speeds_curvature(v, curvature);
            assert!((rate.left - curve.left).abs() < 1e-5);
            assert!((rate.right - curve.right).abs() < 1e-5);
        }
    }

    #[test]
    fn spin_in_place_is_symmetric() {
        let kin = DifferentialKinematics::new(0.6);
        let speeds = kin.to_wheel_speeds(0.0, 2.0);
        assert!((speeds.left + speeds.right).abs() < 1e-6);
        assert!(speeds.right > 0.0);
    }
}
