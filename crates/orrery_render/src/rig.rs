//! Gesture interpolation rig
//!
//! Converts raw gesture targets (zoom percentage, rotation degrees) into a
//! smoothly advancing live transform, one exponential-smoothing step per
//! frame. Everything here is total over f32: out-of-range input is clamped
//! and non-finite input is dropped, never propagated into the scene.

use glam::{EulerRot, Quat, Vec3};

use orrery_gesture::ControlSample;

/// Smoothing factor per frame (0-1, lower = smoother)
pub const LERP_FACTOR: f32 = 0.1;

/// Camera distance at zoom 0 (world units)
pub const DISTANCE_FAR: f32 = 30.0;

/// Camera distance at zoom 100 (world units)
pub const DISTANCE_NEAR: f32 = 5.0;

/// Uniform scale applied to the loaded model
pub const MODEL_INITIAL_SCALE: f32 = 6.0;

/// Eye position before any gesture input; fixes the view direction the
/// camera zooms along.
pub const INITIAL_EYE: Vec3 = Vec3::new(0.0, 5.0, 10.0);

/// Linear interpolation by a fixed fraction per step.
#[inline]
pub fn lerp(current: f32, target: f32, factor: f32) -> f32 {
    current + (target - current) * factor
}

/// Map a 0-100 zoom percentage to a camera distance.
///
/// Monotonic decreasing: 0 -> DISTANCE_FAR, 100 -> DISTANCE_NEAR. Input is
/// clamped to the percentage range; non-finite input falls back to the far
/// bound so bad data can only push the camera away, never into the scene.
pub fn zoom_to_distance(percent: f32) -> f32 {
    let percent = if percent.is_finite() {
        percent.clamp(0.0, 100.0)
    } else {
        0.0
    };
    let t = percent / 100.0;
    DISTANCE_FAR + (DISTANCE_NEAR - DISTANCE_FAR) * t
}

/// The currently rendered camera/model state, advanced toward the gesture
/// target once per frame. Owned exclusively by the render loop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LiveTransform {
    /// Camera distance from the origin, world units
    pub distance: f32,
    /// Model rotation around X, radians
    pub rotation_x: f32,
    /// Model rotation around Y, radians
    pub rotation_y: f32,
}

impl Default for LiveTransform {
    fn default() -> Self {
        Self {
            distance: INITIAL_EYE.length(),
            rotation_x: 0.0,
            rotation_y: 0.0,
        }
    }
}

/// Advances a [`LiveTransform`] toward gesture targets.
#[derive(Clone, Debug)]
pub struct GestureRig {
    live: LiveTransform,
    smoothing: f32,
}

impl GestureRig {
    /// Rig with the given smoothing factor, clamped into (0, 1).
    pub fn new(smoothing: f32) -> Self {
        let smoothing = if smoothing.is_finite() {
            smoothing.clamp(0.001, 0.999)
        } else {
            LERP_FACTOR
        };
        Self {
            live: LiveTransform::default(),
            smoothing,
        }
    }

    pub fn live(&self) -> &LiveTransform {
        &self.live
    }

    /// One smoothing step toward the target sample.
    ///
    /// Each scalar channel moves a fixed fraction of its remaining error, so
    /// the live transform converges without ever snapping. A non-finite
    /// rotation keeps that axis' previous course for the frame.
    pub fn advance(&mut self, target: &ControlSample) {
        let target_distance = zoom_to_distance(target.zoom);
        self.live.distance = lerp(self.live.distance, target_distance, self.smoothing);

        let target_rx = finite_or(target.rotate_x.to_radians(), self.live.rotation_x);
        let target_ry = finite_or(target.rotate_y.to_radians(), self.live.rotation_y);
        self.live.rotation_x = lerp(self.live.rotation_x, target_rx, self.smoothing);
        self.live.rotation_y = lerp(self.live.rotation_y, target_ry, self.smoothing);
    }

    /// Camera eye position: the initial view direction scaled to the live
    /// distance.
    pub fn eye_position(&self) -> Vec3 {
        INITIAL_EYE.normalize() * self.live.distance
    }

    /// Model orientation from the live rotation angles.
    pub fn model_rotation(&self) -> Quat {
        Quat::from_euler(
            EulerRot::YXZ,
            self.live.rotation_y,
            self.live.rotation_x,
            0.0,
        )
    }
}

impl Default for GestureRig {
    fn default() -> Self {
        Self::new(LERP_FACTOR)
    }
}

#[inline]
fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_contracts_error() {
        // One step strictly reduces |target - current| for any factor in (0,1)
        for factor in [0.05, 0.1, 0.5, 0.9] {
            for (current, target) in [(0.0, 10.0), (30.0, 5.0), (-4.0, 4.0)] {
                let next = lerp(current, target, factor);
                assert!(
                    (target - next).abs() < (target - current).abs(),
                    "factor {} did not contract",
                    factor
                );
            }
        }
    }

    #[test]
    fn test_lerp_converges_within_epsilon() {
        let mut current = 30.0_f32;
        let target = 5.0_f32;
        for _ in 0..200 {
            current = lerp(current, target, LERP_FACTOR);
        }
        assert!((target - current).abs() < 1e-3);
    }

    #[test]
    fn test_zoom_mapping_reference_points() {
        assert!((zoom_to_distance(0.0) - 30.0).abs() < 1e-6);
        assert!((zoom_to_distance(100.0) - 5.0).abs() < 1e-6);
        assert!((zoom_to_distance(50.0) - 17.5).abs() < 1e-6);
    }

    #[test]
    fn test_zoom_mapping_monotonic_decreasing() {
        let mut previous = zoom_to_distance(0.0);
        for pct in 1..=100 {
            let distance = zoom_to_distance(pct as f32);
            assert!(distance < previous);
            previous = distance;
        }
    }

    #[test]
    fn test_zoom_mapping_clamps_out_of_range() {
        assert_eq!(zoom_to_distance(-20.0), zoom_to_distance(0.0));
        assert_eq!(zoom_to_distance(250.0), zoom_to_distance(100.0));
    }

    #[test]
    fn test_zoom_mapping_rejects_non_finite() {
        assert_eq!(zoom_to_distance(f32::NAN), DISTANCE_FAR);
        assert_eq!(zoom_to_distance(f32::INFINITY), DISTANCE_FAR);
        assert_eq!(zoom_to_distance(f32::NEG_INFINITY), DISTANCE_FAR);
    }

    #[test]
    fn test_rig_converges_to_default_target() {
        // No sample ever arrives: the rig heads for the documented default
        // (zoom 85 -> distance 8.75, rotations 0)
        let mut rig = GestureRig::default();
        let target = ControlSample::default();

        for _ in 0..300 {
            rig.advance(&target);
        }

        assert!((rig.live().distance - 8.75).abs() < 1e-3);
        assert!(rig.live().rotation_x.abs() < 1e-6);
        assert!(rig.live().rotation_y.abs() < 1e-6);
    }

    #[test]
    fn test_rig_distance_strictly_approaches_target() {
        let mut rig = GestureRig::default();
        let target = ControlSample {
            zoom: 100.0,
            rotate_x: 0.0,
            rotate_y: 0.0,
        };
        let goal = zoom_to_distance(target.zoom);

        let mut error = (rig.live().distance - goal).abs();
        for _ in 0..50 {
            rig.advance(&target);
            let next_error = (rig.live().distance - goal).abs();
            assert!(next_error < error);
            error = next_error;
        }
    }

    #[test]
    fn test_rig_never_snaps_to_target() {
        let mut rig = GestureRig::default();
        let target = ControlSample {
            zoom: 0.0,
            rotate_x: 90.0,
            rotate_y: -90.0,
        };

        rig.advance(&target);

        // A single step lands strictly between start and target
        assert!(rig.live().distance < zoom_to_distance(0.0));
        assert!(rig.live().rotation_x > 0.0);
        assert!(rig.live().rotation_x < 90.0_f32.to_radians());
    }

    #[test]
    fn test_rig_rotation_blends_in_radians() {
        let mut rig = GestureRig::new(0.5);
        let target = ControlSample {
            zoom: 85.0,
            rotate_x: 180.0,
            rotate_y: 0.0,
        };

        rig.advance(&target);

        // Half of 180 degrees, in radians
        assert!((rig.live().rotation_x - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn test_rig_drops_non_finite_rotation() {
        let mut rig = GestureRig::default();
        let target = ControlSample {
            zoom: 85.0,
            rotate_x: f32::NAN,
            rotate_y: f32::INFINITY,
        };

        for _ in 0..10 {
            rig.advance(&target);
        }

        assert!(rig.live().rotation_x.is_finite());
        assert!(rig.live().rotation_y.is_finite());
        assert_eq!(rig.live().rotation_x, 0.0);
    }

    #[test]
    fn test_eye_position_preserves_view_direction() {
        let mut rig = GestureRig::default();
        let target = ControlSample {
            zoom: 100.0,
            rotate_x: 0.0,
            rotate_y: 0.0,
        };
        for _ in 0..500 {
            rig.advance(&target);
        }

        let eye = rig.eye_position();
        assert!((eye.length() - DISTANCE_NEAR).abs() < 1e-2);
        // Direction is unchanged from the initial eye ray
        let cos = eye.normalize().dot(INITIAL_EYE.normalize());
        assert!((cos - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_model_rotation_identity_at_rest() {
        let rig = GestureRig::default();
        let rotation = rig.model_rotation();
        assert!(rotation.angle_between(Quat::IDENTITY) < 1e-6);
    }

    #[test]
    fn test_new_sanitizes_smoothing() {
        assert!(GestureRig::new(f32::NAN).smoothing == LERP_FACTOR);
        assert!(GestureRig::new(0.0).smoothing > 0.0);
        assert!(GestureRig::new(1.0).smoothing < 1.0);
    }
}
