//! Angle wrapping helpers shared by the steering and kinematics code.

use libm::fmodf;

/// Wrap an angle in degrees to the canonical `(-180, 180]` range.
///
/// Steering errors are always computed on wrapped angles so a module is never
/// commanded through more than a half turn. Total over all finite inputs;
/// a NaN input stays NaN.
pub fn normalize_degrees(angle: f32) -> f32 {
    let mut wrapped = fmodf(angle, 360.0);
    if wrapped > 180.0 {
        wrapped -= 360.0;
    } else if wrapped <= -180.0 {
        wrapped += 360.0;
    }
    wrapped
}
