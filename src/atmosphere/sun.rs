//! Sun position from an elevation angle.
//!
//! The sun moves in the YZ plane: angle 0 sits on the horizon towards -Z,
//! π/2 is straight overhead and π sets on the +Z horizon.

use std::f32::consts::PI;

use crate::core::types::Vec3;

/// Angular speed of the sun animation, radians per second.
pub const SUN_ANIMATION_SPEED: f32 = 0.5;

/// The animation wraps after passing 20° below the far horizon.
pub const SUN_ANIMATION_PERIOD: f32 = PI + 20.0 * (PI / 180.0);

/// Replace the y and z components of `dir` with the sun position for `angle`.
/// The x component is left untouched.
pub fn sun_direction_for_angle(dir: Vec3, angle: f32) -> Vec3 {
    Vec3::new(dir.x, angle.sin(), -angle.cos())
}

/// Advance the animated sun angle by `dt` seconds.
pub fn advance_sun_angle(angle: f32, dt: f32) -> f32 {
    (angle + SUN_ANIMATION_SPEED * dt).rem_euclid(SUN_ANIMATION_PERIOD)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn vec3_approx_eq(a: Vec3, b: Vec3, eps: f32) -> bool {
        (a.x - b.x).abs() < eps && (a.y - b.y).abs() < eps && (a.z - b.z).abs() < eps
    }

    #[test]
    fn test_overhead_at_half_pi() {
        let dir = sun_direction_for_angle(Vec3::ZERO, PI * 0.5);
        assert!(vec3_approx_eq(dir, Vec3::Y, 1e-6), "dir = {dir:?}");
    }

    #[test]
    fn test_x_is_preserved() {
        let dir = sun_direction_for_angle(Vec3::new(0.3, 9.0, 9.0), 0.0);
        assert!(vec3_approx_eq(dir, Vec3::new(0.3, 0.0, -1.0), 1e-6));
    }

    #[test]
    fn test_advance() {
        let angle = advance_sun_angle(1.0, 0.2);
        assert!((angle - 1.1).abs() < 1e-6);
    }

    #[test]
    fn test_advance_wraps_after_period() {
        let angle = advance_sun_angle(SUN_ANIMATION_PERIOD - 0.05, 0.2);
        assert!((angle - 0.05).abs() < 1e-5, "angle = {angle}");
        assert!(angle < SUN_ANIMATION_PERIOD);
    }
}
