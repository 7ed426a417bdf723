//! Scene assets for the gesture viewer
//!
//! Loads a glTF/GLB model into flat, GPU-ready mesh data, and builds the
//! procedural fallback scene (sun plus star field) used when no model can be
//! loaded. Loaders return `Result<_, String>`; callers decide whether a
//! failure means fallback or abort.

pub mod gltf;
pub mod mesh;
pub mod procedural;

pub use mesh::{Bounds, MeshData, SceneAsset};
