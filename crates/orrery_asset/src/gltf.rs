//! glTF/GLB import
//!
//! Flattens the default scene's node hierarchy into a list of world-space
//! meshes with factor-only materials. The viewer treats the whole model as
//! one rigid root, so nothing of the hierarchy survives past loading.

use std::path::Path;

use glam::Mat4;

use crate::mesh::{Bounds, MeshData, SceneAsset};

/// Load a glTF or GLB file into a flat scene.
pub fn load_file(path: &Path) -> Result<SceneAsset, String> {
    let (document, buffers, _images) = gltf::import(path)
        .map_err(|e| format!("Failed to load glTF {}: {}", path.display(), e))?;

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| format!("No scene in glTF {}", path.display()))?;

    let mut asset = SceneAsset {
        bounds: Bounds::empty(),
        ..Default::default()
    };

    for node in scene.nodes() {
        flatten_node(&node, Mat4::IDENTITY, &buffers, &mut asset);
    }

    if asset.meshes.is_empty() {
        return Err(format!("No triangle meshes in glTF {}", path.display()));
    }

    log::info!(
        "Loaded {}: {} meshes, {} vertices",
        path.display(),
        asset.meshes.len(),
        asset
            .meshes
            .iter()
            .map(|m| m.vertices.len())
            .sum::<usize>()
    );

    Ok(asset)
}

fn flatten_node(
    node: &gltf::Node,
    parent: Mat4,
    buffers: &[gltf::buffer::Data],
    asset: &mut SceneAsset,
) {
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            match read_primitive(&mesh, &primitive, world, buffers) {
                Some(data) => {
                    asset.bounds.union(&world_bounds(&data));
                    asset.meshes.push(data);
                }
                None => {
                    log::warn!(
                        "Skipping unsupported primitive in mesh '{}'",
                        mesh.name().unwrap_or("unnamed")
                    );
                }
            }
        }
    }

    for child in node.children() {
        flatten_node(&child, world, buffers, asset);
    }
}

fn read_primitive(
    mesh: &gltf::Mesh,
    primitive: &gltf::Primitive,
    world: Mat4,
    buffers: &[gltf::buffer::Data],
) -> Option<MeshData> {
    if primitive.mode() != gltf::mesh::Mode::Triangles {
        return None;
    }

    let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

    let positions: Vec<[f32; 3]> = reader.read_positions()?.collect();
    let normals: Vec<[f32; 3]> = match reader.read_normals() {
        Some(normals) => normals.collect(),
        None => vec![[0.0, 1.0, 0.0]; positions.len()],
    };
    let uvs: Vec<[f32; 2]> = match reader.read_tex_coords(0) {
        Some(coords) => coords.into_f32().collect(),
        None => vec![[0.0, 0.0]; positions.len()],
    };

    if normals.len() != positions.len() || uvs.len() != positions.len() {
        return None;
    }

    let vertices: Vec<[f32; 8]> = positions
        .iter()
        .zip(normals.iter())
        .zip(uvs.iter())
        .map(|((p, n), uv)| [p[0], p[1], p[2], n[0], n[1], n[2], uv[0], uv[1]])
        .collect();

    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..vertices.len() as u32).collect(),
    };

    let material = primitive.material();
    let pbr = material.pbr_metallic_roughness();

    Some(MeshData {
        name: mesh.name().unwrap_or("unnamed").to_string(),
        vertices,
        indices,
        base_color: pbr.base_color_factor(),
        emissive: material.emissive_factor(),
        transform: world.to_cols_array_2d(),
    })
}

/// Bounds of a mesh's vertices in world space.
fn world_bounds(mesh: &MeshData) -> Bounds {
    let world = Mat4::from_cols_array_2d(&mesh.transform);
    let mut bounds = Bounds::empty();
    for v in &mesh.vertices {
        let p = world.transform_point3(glam::Vec3::new(v[0], v[1], v[2]));
        bounds.extend([p.x, p.y, p.z]);
    }
    bounds
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_an_error() {
        let err = load_file(Path::new("does/not/exist.glb")).unwrap_err();
        assert!(err.contains("does/not/exist.glb"));
    }

    #[test]
    fn test_world_bounds_applies_transform() {
        let mesh = MeshData {
            name: "test".to_string(),
            vertices: vec![
                [-1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0],
            ],
            indices: vec![0, 1, 0],
            base_color: [1.0; 4],
            emissive: [0.0; 3],
            transform: Mat4::from_translation(glam::Vec3::new(10.0, 0.0, 0.0))
                .to_cols_array_2d(),
        };

        let bounds = world_bounds(&mesh);
        assert_eq!(bounds.min[0], 9.0);
        assert_eq!(bounds.max[0], 11.0);
    }
}
