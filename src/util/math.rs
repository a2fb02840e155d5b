//! Numeric helpers shared by the sampling and filtering stages.

use std::f32::consts::PI;

/// Converts degrees to radians.
pub(crate) fn deg_to_rad(angle_deg: f32) -> f32 {
    angle_deg.to_radians()
}

/// Computes sine and cosine for an angle in degrees.
pub(crate) fn sin_cos_deg(angle_deg: f32) -> (f32, f32) {
    deg_to_rad(angle_deg).sin_cos()
}

/// Evenly spaced angle in radians for sample `idx` of `count` over `[0, 2π)`.
pub(crate) fn polar_angle(idx: usize, count: usize) -> f32 {
    2.0 * PI * idx as f32 / count as f32
}

/// Rounds to the nearest integer and saturates into `u8`.
pub(crate) fn round_to_u8(value: f32) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    value.round().clamp(0.0, 255.0) as u8
}
