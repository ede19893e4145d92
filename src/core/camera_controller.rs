//! First-person camera controller

use crate::core::camera::Camera;

/// Movement speed in world units per second
pub const MOVE_SPEED: f32 = 10.0;
/// Degrees of rotation per unit of mouse motion
pub const MOUSE_SENSITIVITY: f32 = 0.1;
/// Extra forward speed while speed-up is held, as a multiple of the base speed
pub const SPEEDUP_MUL: f32 = 5.0;

/// Direction flag driven by a key binding
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Movement {
    Forward,
    Backward,
    Right,
    Left,
    SpeedUp,
}

/// Free-fly controller with WASD movement and mouse look
#[derive(Clone, Debug)]
pub struct FreeflyController {
    pub speed: f32,
    pub sensitivity: f32,
    pub speedup_multiplier: f32,
    forward: bool,
    backward: bool,
    right: bool,
    left: bool,
    speedup: bool,
}

impl FreeflyController {
    pub fn new(speed: f32, sensitivity: f32) -> Self {
        Self {
            speed,
            sensitivity,
            speedup_multiplier: SPEEDUP_MUL,
            forward: false,
            backward: false,
            right: false,
            left: false,
            speedup: false,
        }
    }

    /// Set or clear a single movement flag
    pub fn set_movement(&mut self, movement: Movement, pressed: bool) {
        match movement {
            Movement::Forward => self.forward = pressed,
            Movement::Backward => self.backward = pressed,
            Movement::Right => self.right = pressed,
            Movement::Left => self.left = pressed,
            Movement::SpeedUp => self.speedup = pressed,
        }
    }

    pub fn is_moving(&self, movement: Movement) -> bool {
        match movement {
            Movement::Forward => self.forward,
            Movement::Backward => self.backward,
            Movement::Right => self.right,
            Movement::Left => self.left,
            Movement::SpeedUp => self.speedup,
        }
    }

    /// Release every movement key
    pub fn reset(&mut self) {
        self.forward = false;
        self.backward = false;
        self.right = false;
        self.left = false;
        self.speedup = false;
    }

    /// Apply a relative mouse movement to the camera orientation
    ///
    /// Screen y grows downward, so moving the mouse up pitches the camera up.
    pub fn on_mouse_motion(&self, camera: &mut Camera, dx: f32, dy: f32) {
        camera.rotate(dx * self.sensitivity, -dy * self.sensitivity);
    }

    /// Move the camera according to the held keys
    pub fn update(&self, camera: &mut Camera, dt: f32) {
        let velocity = self.speed * dt;
        let front = camera.front();
        let right = camera.right();

        if self.forward {
            let boost = if self.speedup {
                velocity * self.speedup_multiplier
            } else {
                0.0
            };
            camera.translate(front * (velocity + boost));
        }
        if self.backward {
            camera.translate(-front * velocity);
        }
        if self.right {
            camera.translate(right * velocity);
        }
        if self.left {
            camera.translate(-right * velocity);
        }
    }
}

impl Default for FreeflyController {
    fn default() -> Self {
        Self::new(MOVE_SPEED, MOUSE_SENSITIVITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Vec3;

    fn camera() -> Camera {
        Camera::new(1.0, Vec3::ZERO)
    }

    #[test]
    fn test_forward_moves_along_front() {
        let mut cam = camera();
        let mut controller = FreeflyController::default();
        controller.set_movement(Movement::Forward, true);
        controller.update(&mut cam, 0.5);
        assert!((cam.position() - Vec3::new(0.0, 0.0, -5.0)).length() < 1e-4);
    }

    #[test]
    fn test_speedup_only_boosts_forward() {
        let mut cam = camera();
        let mut controller = FreeflyController::default();
        controller.set_movement(Movement::SpeedUp, true);
        controller.set_movement(Movement::Right, true);
        controller.update(&mut cam, 1.0);
        assert!((cam.position() - Vec3::new(10.0, 0.0, 0.0)).length() < 1e-4);

        let mut cam = camera();
        controller.reset();
        controller.set_movement(Movement::SpeedUp, true);
        controller.set_movement(Movement::Forward, true);
        controller.update(&mut cam, 1.0);
        let expected = MOVE_SPEED * (1.0 + SPEEDUP_MUL);
        assert!((cam.position().z + expected).abs() < 1e-3, "z = {}", cam.position().z);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let mut cam = camera();
        let mut controller = FreeflyController::default();
        controller.set_movement(Movement::Left, true);
        controller.set_movement(Movement::Right, true);
        controller.set_movement(Movement::Forward, true);
        controller.set_movement(Movement::Backward, true);
        controller.update(&mut cam, 1.0);
        assert!(cam.position().length() < 1e-4);
    }

    #[test]
    fn test_reset_clears_flags() {
        let mut controller = FreeflyController::default();
        controller.set_movement(Movement::Forward, true);
        controller.set_movement(Movement::SpeedUp, true);
        controller.reset();
        assert!(!controller.is_moving(Movement::Forward));
        assert!(!controller.is_moving(Movement::SpeedUp));

        let mut cam = camera();
        controller.update(&mut cam, 1.0);
        assert_eq!(cam.position(), Vec3::ZERO);
    }

    #[test]
    fn test_mouse_motion_rotates() {
        let mut cam = camera();
        let controller = FreeflyController::default();
        controller.on_mouse_motion(&mut cam, 100.0, -50.0);
        assert!((cam.yaw() - 280.0).abs() < 1e-3);
        assert!((cam.pitch() - 5.0).abs() < 1e-3);
    }
}
