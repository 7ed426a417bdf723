//! Scene lighting description

use glam::Vec3;

/// Fixed lighting for the viewer scene: soft ambient fill, a directional
/// key light, and a point light at the origin (the sun).
#[derive(Clone, Debug)]
pub struct Lighting {
    pub ambient_color: [f32; 3],
    pub ambient_intensity: f32,
    /// Direction the key light shines along (normalized, toward the scene)
    pub sun_direction: Vec3,
    pub sun_color: [f32; 3],
    pub sun_intensity: f32,
    /// Point light position (world space)
    pub point_position: Vec3,
    pub point_color: [f32; 3],
    pub point_intensity: f32,
    /// Distance at which the point light has fully attenuated
    pub point_range: f32,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ambient_color: [1.0, 1.0, 1.0],
            ambient_intensity: 0.5,
            sun_direction: Vec3::new(-5.0, -3.0, -5.0).normalize(),
            sun_color: [1.0, 1.0, 1.0],
            sun_intensity: 1.0,
            point_position: Vec3::ZERO,
            point_color: [1.0, 1.0, 1.0],
            point_intensity: 1.0,
            point_range: 100.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sun_direction_is_normalized() {
        let lighting = Lighting::default();
        assert!((lighting.sun_direction.length() - 1.0).abs() < 1e-6);
    }
}
