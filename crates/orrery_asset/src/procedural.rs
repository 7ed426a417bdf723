//! Procedural fallback scene
//!
//! Substituted when the model file cannot be loaded: an emissive sun sphere
//! at the origin and a field of stars scattered through a cube around it.
//! Star placement uses a fixed-seed LCG so every run (and every test) sees
//! the same sky.

use glam::Mat4;

use crate::mesh::{generate_sphere, Bounds, MeshData, SceneAsset};

pub const STAR_COUNT: usize = 500;

/// Stars are scattered in a cube of this edge length centered on the origin
pub const STAR_FIELD_EXTENT: f32 = 100.0;

/// Small linear congruential generator for star placement
struct Lcg(u32);

impl Lcg {
    fn next_f32(&mut self) -> f32 {
        self.0 = self.0.wrapping_mul(1103515245).wrapping_add(12345);
        self.0 as f32 / u32::MAX as f32
    }
}

/// Build the fallback scene: sun plus star field.
pub fn fallback_scene() -> SceneAsset {
    let (vertices, indices) = generate_sphere(32, 24, 1.0);

    let mut bounds = Bounds::empty();
    for v in &vertices {
        bounds.extend([v[0], v[1], v[2]]);
    }

    let sun = MeshData {
        name: "sun".to_string(),
        vertices,
        indices,
        base_color: [1.0, 1.0, 0.0, 1.0],
        emissive: [0.5, 0.5, 0.0],
        transform: Mat4::IDENTITY.to_cols_array_2d(),
    };

    let mut rng = Lcg(12345);
    let mut stars = Vec::with_capacity(STAR_COUNT);
    for _ in 0..STAR_COUNT {
        stars.push([
            (rng.next_f32() - 0.5) * STAR_FIELD_EXTENT,
            (rng.next_f32() - 0.5) * STAR_FIELD_EXTENT,
            (rng.next_f32() - 0.5) * STAR_FIELD_EXTENT,
        ]);
    }

    SceneAsset {
        meshes: vec![sun],
        stars,
        bounds,
    }
}
