//! Look-at perspective camera

use glam::{Mat4, Vec3};

/// Perspective camera that always looks at a fixed target.
///
/// The gesture pipeline only ever moves the eye along its view ray, so a
/// target-based camera is all this viewer needs.
#[derive(Clone, Debug)]
pub struct Camera {
    /// Eye position in world space
    pub eye: Vec3,
    /// Point the camera looks at
    pub target: Vec3,
    /// Up direction
    pub up: Vec3,
    /// Vertical field of view, radians
    pub fov: f32,
    /// Width / height
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// Camera looking at the origin from the given eye position.
    pub fn looking_at_origin(eye: Vec3, aspect: f32) -> Self {
        Self {
            eye,
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov: 75.0_f32.to_radians(),
            aspect,
            near: 0.1,
            far: 1000.0,
        }
    }

    /// Update the aspect ratio after a window resize.
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::looking_at_origin(Vec3::new(0.0, 5.0, 10.0), 16.0 / 9.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_maps_target_in_front_of_eye() {
        let camera = Camera::looking_at_origin(Vec3::new(0.0, 0.0, 10.0), 1.0);
        let target_view = camera.view_matrix().transform_point3(camera.target);

        // Right-handed view space looks down -Z
        assert!(target_view.z < 0.0);
        assert!(target_view.x.abs() < 1e-5);
        assert!(target_view.y.abs() < 1e-5);
    }

    #[test]
    fn test_set_aspect_ignores_zero_dimensions() {
        let mut camera = Camera::default();
        let aspect = camera.aspect;
        camera.set_aspect(0, 720);
        assert_eq!(camera.aspect, aspect);
        camera.set_aspect(1280, 720);
        assert_eq!(camera.aspect, 1280.0 / 720.0);
    }

    #[test]
    fn test_view_projection_is_finite() {
        let camera = Camera::default();
        let vp = camera.view_projection_matrix();
        assert!(vp.to_cols_array().iter().all(|v| v.is_finite()));
    }
}
