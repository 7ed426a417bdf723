//! Flat mesh data shared between loaders and the GPU renderer

/// Axis-aligned bounding box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min: [0.0; 3],
            max: [0.0; 3],
        }
    }
}

impl Bounds {
    /// Empty bounds ready to accumulate points.
    pub fn empty() -> Self {
        Self {
            min: [f32::MAX; 3],
            max: [f32::MIN; 3],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min[0] > self.max[0]
    }

    pub fn extend(&mut self, point: [f32; 3]) {
        for i in 0..3 {
            self.min[i] = self.min[i].min(point[i]);
            self.max[i] = self.max[i].max(point[i]);
        }
    }

    pub fn union(&mut self, other: &Bounds) {
        if other.is_empty() {
            return;
        }
        self.extend(other.min);
        self.extend(other.max);
    }

    pub fn center(&self) -> [f32; 3] {
        if self.is_empty() {
            return [0.0; 3];
        }
        [
            (self.min[0] + self.max[0]) * 0.5,
            (self.min[1] + self.max[1]) * 0.5,
            (self.min[2] + self.max[2]) * 0.5,
        ]
    }
}

/// One drawable mesh: interleaved `[pos.xyz, normal.xyz, uv]` vertices,
/// triangle indices, factor-only material, and a world transform already
/// flattened from the source node hierarchy.
#[derive(Clone, Debug)]
pub struct MeshData {
    pub name: String,
    pub vertices: Vec<[f32; 8]>,
    pub indices: Vec<u32>,
    /// Base color factor (RGBA)
    pub base_color: [f32; 4],
    /// Emissive color factor (RGB)
    pub emissive: [f32; 3],
    /// World transform, column-major
    pub transform: [[f32; 4]; 4],
}

/// A loaded scene: meshes plus an optional star field (points), with
/// world-space bounds for recentering.
#[derive(Clone, Debug, Default)]
pub struct SceneAsset {
    pub meshes: Vec<MeshData>,
    /// Star positions rendered as points; empty for loaded models
    pub stars: Vec<[f32; 3]>,
    pub bounds: Bounds,
}

/// Generate a UV sphere as interleaved vertices plus triangle indices.
pub fn generate_sphere(segments: u32, rings: u32, radius: f32) -> (Vec<[f32; 8]>, Vec<u32>) {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    for ring in 0..=rings {
        let phi = std::f32::consts::PI * ring as f32 / rings as f32;
        let y = phi.cos();
        let ring_radius = phi.sin();

        for seg in 0..=segments {
            let theta = 2.0 * std::f32::consts::PI * seg as f32 / segments as f32;
            let x = ring_radius * theta.cos();
            let z = ring_radius * theta.sin();

            let u = seg as f32 / segments as f32;
            let v = ring as f32 / rings as f32;

            vertices.push([x * radius, y * radius, z * radius, x, y, z, u, v]);
        }
    }

    for ring in 0..rings {
        for seg in 0..segments {
            let current = ring * (segments + 1) + seg;
            let next = current + segments + 1;

            // Counter-clockwise winding viewed from outside
            indices.push(current);
            indices.push(current + 1);
            indices.push(next);

            indices.push(current + 1);
            indices.push(next + 1);
            indices.push(next);
        }
    }

    (vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_extend_and_center() {
        let mut bounds = Bounds::empty();
        bounds.extend([-1.0, 0.0, 2.0]);
        bounds.extend([3.0, 4.0, -2.0]);

        assert_eq!(bounds.min, [-1.0, 0.0, -2.0]);
        assert_eq!(bounds.max, [3.0, 4.0, 2.0]);
        assert_eq!(bounds.center(), [1.0, 2.0, 0.0]);
    }

    #[test]
    fn test_empty_bounds_center_is_origin() {
        assert_eq!(Bounds::empty().center(), [0.0; 3]);
    }

    #[test]
    fn test_bounds_union_skips_empty() {
        let mut bounds = Bounds::empty();
        bounds.extend([1.0, 1.0, 1.0]);
        let snapshot = bounds;

        bounds.union(&Bounds::empty());
        assert_eq!(bounds, snapshot);
    }

    #[test]
    fn test_sphere_vertex_and_index_counts() {
        let (vertices, indices) = generate_sphere(8, 6, 1.0);
        assert_eq!(vertices.len(), (8 + 1) * (6 + 1));
        assert_eq!(indices.len(), (8 * 6 * 6) as usize);
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
    }

    #[test]
    fn test_sphere_vertices_on_radius() {
        let radius = 2.5;
        let (vertices, _) = generate_sphere(16, 12, radius);
        for v in &vertices {
            let r = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
            assert!((r - radius).abs() < 1e-4);
        }
    }

    #[test]
    fn test_sphere_normals_are_unit() {
        let (vertices, _) = generate_sphere(16, 12, 3.0);
        for v in &vertices {
            let n = (v[3] * v[3] + v[4] * v[4] + v[5] * v[5]).sqrt();
            assert!((n - 1.0).abs() < 1e-4);
        }
    }
}
