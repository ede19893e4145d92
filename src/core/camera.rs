//! First-person camera

use crate::core::types::{Mat4, Vec3};

/// Default yaw, looking down -Z
pub const DEFAULT_YAW_DEG: f32 = 270.0;
pub const DEFAULT_PITCH_DEG: f32 = 0.0;
pub const DEFAULT_FOV_DEG: f32 = 60.0;
pub const DEFAULT_NEAR_PLANE: f32 = 0.01;
pub const DEFAULT_FAR_PLANE: f32 = 1000.0;

pub const MAX_PITCH_DEG: f32 = 89.0;
pub const MIN_PITCH_DEG: f32 = -89.0;
pub const MAX_YAW_DEG: f32 = 360.0;

const WORLD_UP: Vec3 = Vec3::Y;

/// Camera described by a position and yaw/pitch angles
///
/// Yaw is measured in the XZ plane: 0° looks along +X, 90° along +Z,
/// 180° along -X and 270° along -Z. Positive pitch looks up.
#[derive(Clone, Debug)]
pub struct Camera {
    position: Vec3,
    front: Vec3,
    right: Vec3,
    up: Vec3,
    /// Yaw in degrees, kept in [0, 360)
    yaw: f32,
    /// Pitch in degrees, kept in [-89, 89]
    pitch: f32,
    /// Aspect ratio (width / height)
    aspect: f32,
    /// Vertical field of view in radians
    fov_y: f32,
    near: f32,
    far: f32,
}

impl Camera {
    /// Create a new camera at `position` looking down -Z
    pub fn new(aspect: f32, position: Vec3) -> Self {
        let mut camera = Self {
            position,
            front: -Vec3::Z,
            right: Vec3::X,
            up: WORLD_UP,
            yaw: DEFAULT_YAW_DEG,
            pitch: DEFAULT_PITCH_DEG,
            aspect,
            fov_y: DEFAULT_FOV_DEG.to_radians(),
            near: DEFAULT_NEAR_PLANE,
            far: DEFAULT_FAR_PLANE,
        };
        camera.update_vectors();
        camera
    }

    /// Get view matrix (world to camera space)
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// Get projection matrix (camera to clip space)
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    /// Get combined view-projection matrix
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Translate the camera by `offset`
    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Pitch in degrees
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Yaw in degrees
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn set_pitch(&mut self, degrees: f32) {
        self.pitch = degrees.clamp(MIN_PITCH_DEG, MAX_PITCH_DEG);
        self.update_vectors();
    }

    pub fn set_yaw(&mut self, degrees: f32) {
        self.yaw = degrees.rem_euclid(MAX_YAW_DEG);
        self.update_vectors();
    }

    /// Rotate by yaw/pitch offsets in degrees
    pub fn rotate(&mut self, yaw_delta: f32, pitch_delta: f32) {
        self.pitch = (self.pitch + pitch_delta).clamp(MIN_PITCH_DEG, MAX_PITCH_DEG);
        self.yaw = (self.yaw + yaw_delta).rem_euclid(MAX_YAW_DEG);
        self.update_vectors();
    }

    /// Vertical field of view in radians
    pub fn field_of_view(&self) -> f32 {
        self.fov_y
    }

    pub fn set_field_of_view(&mut self, radians: f32) {
        self.fov_y = radians;
    }

    pub fn near_plane(&self) -> f32 {
        self.near
    }

    pub fn set_near_plane(&mut self, dist: f32) {
        self.near = dist;
    }

    pub fn far_plane(&self) -> f32 {
        self.far
    }

    pub fn set_far_plane(&mut self, dist: f32) {
        self.far = dist;
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Update aspect ratio (call on window resize)
    pub fn set_aspect(&mut self, width: f32, height: f32) {
        self.aspect = width / height;
    }

    /// Recompute front/right/up from yaw and pitch
    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize();

        // Normalized, otherwise strafing slows down when looking up or down
        self.right = self.front.cross(WORLD_UP).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(16.0 / 9.0, Vec3::new(0.0, 5.0, 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_default_orientation() {
        let camera = Camera::default();
        assert!(approx(camera.front(), -Vec3::Z), "front = {:?}", camera.front());
        assert!(approx(camera.right(), Vec3::X), "right = {:?}", camera.right());
        assert!(approx(camera.up(), Vec3::Y), "up = {:?}", camera.up());
    }

    #[test]
    fn test_yaw_conventions() {
        let mut camera = Camera::default();
        camera.set_yaw(0.0);
        assert!(approx(camera.front(), Vec3::X));
        camera.set_yaw(90.0);
        assert!(approx(camera.front(), Vec3::Z));
        camera.set_yaw(180.0);
        assert!(approx(camera.front(), -Vec3::X));
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut camera = Camera::default();
        camera.set_pitch(120.0);
        assert_eq!(camera.pitch(), MAX_PITCH_DEG);
        camera.set_pitch(-400.0);
        assert_eq!(camera.pitch(), MIN_PITCH_DEG);
        assert!(camera.front().y < 0.0);
    }

    #[test]
    fn test_yaw_wraps() {
        let mut camera = Camera::default();
        camera.set_yaw(370.0);
        assert!((camera.yaw() - 10.0).abs() < 1e-4);
        camera.set_yaw(-30.0);
        assert!((camera.yaw() - 330.0).abs() < 1e-4);

        camera.set_yaw(350.0);
        camera.rotate(20.0, 0.0);
        assert!((camera.yaw() - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_view_matrix_moves_world_opposite() {
        let mut camera = Camera::default();
        camera.set_position(Vec3::new(10.0, 0.0, 0.0));
        let origin_in_camera = camera.view_matrix().transform_point3(Vec3::ZERO);
        assert!((origin_in_camera.x + 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_point_in_front_lands_in_depth_range() {
        let camera = Camera::new(1.0, Vec3::ZERO);
        let clip = camera.view_projection().project_point3(Vec3::new(0.0, 0.0, -10.0));
        assert!(clip.x.abs() < 1e-4 && clip.y.abs() < 1e-4);
        assert!(clip.z > 0.0 && clip.z < 1.0, "depth = {}", clip.z);
    }

    #[test]
    fn test_set_aspect() {
        let mut camera = Camera::default();
        camera.set_aspect(800.0, 400.0);
        assert_eq!(camera.aspect(), 2.0);
    }
}
