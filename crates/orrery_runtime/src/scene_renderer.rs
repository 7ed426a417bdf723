//! Scene Renderer - draws the loaded model (or fallback scene) with wgpu
//!
//! One lit mesh pipeline plus a point-list pipeline for the fallback star
//! field. The whole scene hangs off a single root transform that recenters
//! the model, applies the viewer scale, and then the gesture-driven
//! rotation; the camera only ever moves along its initial view ray.

use glam::{Mat4, Quat, Vec3};
use wgpu::util::DeviceExt;
use wgpu::*;

use orrery_asset::SceneAsset;
use orrery_render::rig::{INITIAL_EYE, MODEL_INITIAL_SCALE};
use orrery_render::{Camera, Lighting};

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct CameraUniforms {
    view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 3],
    _pad: f32,
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct LightUniforms {
    ambient_color: [f32; 3],
    ambient_intensity: f32,
    sun_direction: [f32; 3],
    sun_intensity: f32,
    sun_color: [f32; 3],
    _pad0: f32,
    point_position: [f32; 3],
    point_intensity: f32,
    point_color: [f32; 3],
    point_range: f32,
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct ModelUniforms {
    model: [[f32; 4]; 4],
    base_color: [f32; 4],
    emissive: [f32; 3],
    _pad: f32,
}

const MESH_ATTRIBS: [VertexAttribute; 3] =
    vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

const STAR_ATTRIBS: [VertexAttribute; 1] = vertex_attr_array![0 => Float32x3];

/// A mesh uploaded to the GPU
struct GpuMesh {
    vertex_buffer: Buffer,
    index_buffer: Buffer,
    index_count: u32,
    model_buffer: Buffer,
    model_bind_group: BindGroup,
    /// World transform from the source file, applied under the root
    world: Mat4,
    base_color: [f32; 4],
    emissive: [f32; 3],
}

/// Renders the viewer scene.
pub struct SceneRenderer {
    mesh_pipeline: RenderPipeline,
    star_pipeline: RenderPipeline,
    camera_buffer: Buffer,
    light_buffer: Buffer,
    scene_bind_group: BindGroup,
    model_layout: BindGroupLayout,
    depth_view: TextureView,
    meshes: Vec<GpuMesh>,
    stars: Option<(Buffer, u32)>,
    camera: Camera,
    lighting: Lighting,
    model_center: Vec3,
    model_rotation: Quat,
    loaded: bool,
}

impl SceneRenderer {
    pub fn new(device: &Device, format: TextureFormat, size: (u32, u32)) -> Self {
        let mesh_shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: ShaderSource::Wgsl(include_str!("shaders/scene.wgsl").into()),
        });
        let star_shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("star_shader"),
            source: ShaderSource::Wgsl(include_str!("shaders/stars.wgsl").into()),
        });

        let scene_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("scene_uniforms_layout"),
            entries: &[
                BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ShaderStages::VERTEX_FRAGMENT,
                    ty: BindingType::Buffer {
                        ty: BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                BindGroupLayoutEntry {
                    binding: 1,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Buffer {
                        ty: BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let model_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("model_uniforms_layout"),
            entries: &[BindGroupLayoutEntry {
                binding: 0,
                visibility: ShaderStages::VERTEX_FRAGMENT,
                ty: BindingType::Buffer {
                    ty: BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let mesh_pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("mesh_pipeline_layout"),
            bind_group_layouts: &[&scene_layout, &model_layout],
            push_constant_ranges: &[],
        });

        let vertex_layout = VertexBufferLayout {
            array_stride: (8 * std::mem::size_of::<f32>()) as BufferAddress,
            step_mode: VertexStepMode::Vertex,
            attributes: &MESH_ATTRIBS,
        };

        let mesh_pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("mesh_pipeline"),
            layout: Some(&mesh_pipeline_layout),
            vertex: VertexState {
                module: &mesh_shader,
                entry_point: "vs_main",
                buffers: &[vertex_layout],
                compilation_options: PipelineCompilationOptions::default(),
            },
            fragment: Some(FragmentState {
                module: &mesh_shader,
                entry_point: "fs_main",
                targets: &[Some(ColorTargetState {
                    format,
                    blend: Some(BlendState::REPLACE),
                    write_mask: ColorWrites::ALL,
                })],
                compilation_options: PipelineCompilationOptions::default(),
            }),
            primitive: PrimitiveState {
                topology: PrimitiveTopology::TriangleList,
                cull_mode: Some(Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(DepthStencilState {
                format: TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: CompareFunction::Less,
                stencil: StencilState::default(),
                bias: DepthBiasState::default(),
            }),
            multisample: MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let star_pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("star_pipeline_layout"),
            bind_group_layouts: &[&scene_layout],
            push_constant_ranges: &[],
        });

        let star_vertex_layout = VertexBufferLayout {
            array_stride: (3 * std::mem::size_of::<f32>()) as BufferAddress,
            step_mode: VertexStepMode::Vertex,
            attributes: &STAR_ATTRIBS,
        };

        let star_pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("star_pipeline"),
            layout: Some(&star_pipeline_layout),
            vertex: VertexState {
                module: &star_shader,
                entry_point: "vs_main",
                buffers: &[star_vertex_layout],
                compilation_options: PipelineCompilationOptions::default(),
            },
            fragment: Some(FragmentState {
                module: &star_shader,
                entry_point: "fs_main",
                targets: &[Some(ColorTargetState {
                    format,
                    blend: Some(BlendState::REPLACE),
                    write_mask: ColorWrites::ALL,
                })],
                compilation_options: PipelineCompilationOptions::default(),
            }),
            primitive: PrimitiveState {
                topology: PrimitiveTopology::PointList,
                ..Default::default()
            },
            depth_stencil: Some(DepthStencilState {
                format: TextureFormat::Depth32Float,
                depth_write_enabled: false,
                depth_compare: CompareFunction::Less,
                stencil: StencilState::default(),
                bias: DepthBiasState::default(),
            }),
            multisample: MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let camera_buffer = device.create_buffer(&BufferDescriptor {
            label: Some("camera_uniforms"),
            size: std::mem::size_of::<CameraUniforms>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let light_buffer = device.create_buffer(&BufferDescriptor {
            label: Some("light_uniforms"),
            size: std::mem::size_of::<LightUniforms>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let scene_bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: Some("scene_uniforms"),
            layout: &scene_layout,
            entries: &[
                BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                BindGroupEntry {
                    binding: 1,
                    resource: light_buffer.as_entire_binding(),
                },
            ],
        });

        let depth_view = create_depth_texture(device, size);

        let aspect = size.0.max(1) as f32 / size.1.max(1) as f32;

        Self {
            mesh_pipeline,
            star_pipeline,
            camera_buffer,
            light_buffer,
            scene_bind_group,
            model_layout,
            depth_view,
            meshes: Vec::new(),
            stars: None,
            camera: Camera::looking_at_origin(INITIAL_EYE, aspect),
            lighting: Lighting::default(),
            model_center: Vec3::ZERO,
            model_rotation: Quat::IDENTITY,
            loaded: false,
        }
    }

    /// Whether a scene (model or fallback) has been installed.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn set_camera_eye(&mut self, eye: Vec3) {
        self.camera.eye = eye;
    }

    pub fn set_model_rotation(&mut self, rotation: Quat) {
        self.model_rotation = rotation;
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Upload a loaded scene to the GPU, replacing whatever was installed.
    pub fn install_scene(&mut self, device: &Device, scene: &SceneAsset) {
        self.meshes.clear();

        for mesh in &scene.meshes {
            let vertex_buffer = device.create_buffer_init(&util::BufferInitDescriptor {
                label: Some("mesh_vertices"),
                contents: bytemuck::cast_slice(&mesh.vertices),
                usage: BufferUsages::VERTEX,
            });
            let index_buffer = device.create_buffer_init(&util::BufferInitDescriptor {
                label: Some("mesh_indices"),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: BufferUsages::INDEX,
            });
            let model_buffer = device.create_buffer(&BufferDescriptor {
                label: Some("model_uniforms"),
                size: std::mem::size_of::<ModelUniforms>() as u64,
                usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let model_bind_group = device.create_bind_group(&BindGroupDescriptor {
                label: Some("model_uniforms"),
                layout: &self.model_layout,
                entries: &[BindGroupEntry {
                    binding: 0,
                    resource: model_buffer.as_entire_binding(),
                }],
            });

            self.meshes.push(GpuMesh {
                vertex_buffer,
                index_buffer,
                index_count: mesh.indices.len() as u32,
                model_buffer,
                model_bind_group,
                world: Mat4::from_cols_array_2d(&mesh.transform),
                base_color: mesh.base_color,
                emissive: mesh.emissive,
            });
        }

        self.stars = if scene.stars.is_empty() {
            None
        } else {
            let buffer = device.create_buffer_init(&util::BufferInitDescriptor {
                label: Some("star_vertices"),
                contents: bytemuck::cast_slice(&scene.stars),
                usage: BufferUsages::VERTEX,
            });
            Some((buffer, scene.stars.len() as u32))
        };

        let center = scene.bounds.center();
        self.model_center = Vec3::new(center[0], center[1], center[2]);
        self.loaded = true;

        log::info!(
            "Scene installed: {} meshes, {} stars",
            self.meshes.len(),
            scene.stars.len()
        );
    }

    pub fn resize(&mut self, device: &Device, new_size: (u32, u32)) {
        if new_size.0 > 0 && new_size.1 > 0 {
            self.depth_view = create_depth_texture(device, new_size);
            self.camera.set_aspect(new_size.0, new_size.1);
        }
    }

    /// Render the scene. Always issues the draw pass, even with nothing
    /// installed yet, so the frame cadence never stalls during loading.
    pub fn render(&mut self, device: &Device, queue: &Queue, view: &TextureView) {
        let camera_uniforms = CameraUniforms {
            view_proj: self.camera.view_projection_matrix().to_cols_array_2d(),
            camera_pos: self.camera.eye.to_array(),
            _pad: 0.0,
        };
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&camera_uniforms));

        let light_uniforms = LightUniforms {
            ambient_color: self.lighting.ambient_color,
            ambient_intensity: self.lighting.ambient_intensity,
            sun_direction: self.lighting.sun_direction.to_array(),
            sun_intensity: self.lighting.sun_intensity,
            sun_color: self.lighting.sun_color,
            _pad0: 0.0,
            point_position: self.lighting.point_position.to_array(),
            point_intensity: self.lighting.point_intensity,
            point_color: self.lighting.point_color,
            point_range: self.lighting.point_range,
        };
        queue.write_buffer(&self.light_buffer, 0, bytemuck::bytes_of(&light_uniforms));

        let root = root_matrix(self.model_center, MODEL_INITIAL_SCALE, self.model_rotation);
        for mesh in &self.meshes {
            let model_uniforms = ModelUniforms {
                model: (root * mesh.world).to_cols_array_2d(),
                base_color: mesh.base_color,
                emissive: mesh.emissive,
                _pad: 0.0,
            };
            queue.write_buffer(&mesh.model_buffer, 0, bytemuck::bytes_of(&model_uniforms));
        }

        let mut encoder = device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("scene_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(Color::BLACK),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            pass.set_bind_group(0, &self.scene_bind_group, &[]);

            pass.set_pipeline(&self.mesh_pipeline);
            for mesh in &self.meshes {
                pass.set_bind_group(1, &mesh.model_bind_group, &[]);
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }

            if let Some((buffer, count)) = &self.stars {
                pass.set_pipeline(&self.star_pipeline);
                pass.set_vertex_buffer(0, buffer.slice(..));
                pass.draw(0..*count, 0..1);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }
}

/// Root transform: recenter the model, scale it, then apply the
/// gesture-driven rotation.
fn root_matrix(center: Vec3, scale: f32, rotation: Quat) -> Mat4 {
    Mat4::from_quat(rotation)
        * Mat4::from_scale(Vec3::splat(scale))
        * Mat4::from_translation(-center)
}

fn create_depth_texture(device: &Device, size: (u32, u32)) -> TextureView {
    let texture = device.create_texture(&TextureDescriptor {
        label: Some("depth_texture"),
        size: Extent3d {
            width: size.0.max(1),
            height: size.1.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: TextureFormat::Depth32Float,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&TextureViewDescriptor::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_matrix_recenters_before_scaling() {
        let center = Vec3::new(2.0, 0.0, 0.0);
        let root = root_matrix(center, 6.0, Quat::IDENTITY);

        // The model center lands on the origin
        let mapped = root.transform_point3(center);
        assert!(mapped.length() < 1e-5);

        // A point one unit from the center ends up `scale` units out
        let mapped = root.transform_point3(center + Vec3::X);
        assert!((mapped.x - 6.0).abs() < 1e-4);
    }

    #[test]
    fn test_root_matrix_rotates_around_origin() {
        let rotation = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let root = root_matrix(Vec3::ZERO, 1.0, rotation);

        let mapped = root.transform_point3(Vec3::X);
        assert!(mapped.x.abs() < 1e-5);
        assert!((mapped.z + 1.0).abs() < 1e-5);
    }
}
