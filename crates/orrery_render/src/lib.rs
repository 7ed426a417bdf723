//! Rendering math for the gesture viewer
//!
//! Pure types and functions: the look-at camera, the interpolation rig that
//! smooths gesture targets into a live transform, and the lighting
//! description consumed by the GPU renderer. No GPU types live here, so the
//! whole crate is unit-testable.

pub mod camera;
pub mod light;
pub mod rig;

pub use camera::Camera;
pub use light::Lighting;
pub use rig::{GestureRig, LiveTransform};
