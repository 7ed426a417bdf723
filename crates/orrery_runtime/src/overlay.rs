//! Status Overlay - connection indicator and gesture readouts
//!
//! Purely observational: fed by drained channel events, drawn on top of the
//! scene each frame. A failure to prepare or draw the overlay is logged and
//! skipped; it can never stall or unwind the render loop.

use glyphon::{
    Attrs, Buffer as TextBuffer, Color as TextColor, Family, FontSystem, Metrics, Shaping,
    TextArea, TextAtlas, TextBounds, TextRenderer, Viewport,
};
use wgpu::*;

use orrery_gesture::{ChannelEvent, ConnectionState, ControlSample};

/// Overlay vertex: NDC position plus color
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    position: [f32; 2],
    color: [f32; 4],
}

impl Vertex {
    const ATTRIBS: [VertexAttribute; 2] = vertex_attr_array![
        0 => Float32x2,
        1 => Float32x4,
    ];

    fn desc() -> VertexBufferLayout<'static> {
        VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as BufferAddress,
            step_mode: VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Draws the connection dot and the latest gesture readouts.
pub struct StatusOverlay {
    pipeline: RenderPipeline,
    vertex_buffer: Buffer,
    size: (u32, u32),
    // Text rendering
    font_system: FontSystem,
    swash_cache: glyphon::SwashCache,
    text_atlas: TextAtlas,
    text_renderer: TextRenderer,
    text_buffer: TextBuffer,
    cache: glyphon::Cache,
    // Displayed state
    state: ConnectionState,
    last_sample: ControlSample,
    fallback_scene: bool,
}

impl StatusOverlay {
    pub fn new(device: &Device, queue: &Queue, format: TextureFormat, size: (u32, u32)) -> Self {
        let shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("overlay_shader"),
            source: ShaderSource::Wgsl(include_str!("shaders/overlay.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("overlay_layout"),
            bind_group_layouts: &[],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("overlay_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[Vertex::desc()],
                compilation_options: PipelineCompilationOptions::default(),
            },
            fragment: Some(FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(ColorTargetState {
                    format,
                    blend: Some(BlendState::ALPHA_BLENDING),
                    write_mask: ColorWrites::ALL,
                })],
                compilation_options: PipelineCompilationOptions::default(),
            }),
            primitive: PrimitiveState {
                topology: PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let vertex_buffer = device.create_buffer(&BufferDescriptor {
            label: Some("overlay_vertices"),
            size: 256 * std::mem::size_of::<Vertex>() as u64,
            usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut font_system = FontSystem::new();
        let swash_cache = glyphon::SwashCache::new();
        let cache = glyphon::Cache::new(device);
        let mut text_atlas = TextAtlas::new(device, queue, &cache, format);
        let text_renderer =
            TextRenderer::new(&mut text_atlas, device, MultisampleState::default(), None);

        let mut text_buffer = TextBuffer::new(&mut font_system, Metrics::new(16.0, 20.0));
        text_buffer.set_size(
            &mut font_system,
            Some(size.0 as f32),
            Some(size.1 as f32),
        );

        Self {
            pipeline,
            vertex_buffer,
            size,
            font_system,
            swash_cache,
            text_atlas,
            text_renderer,
            text_buffer,
            cache,
            state: ConnectionState::Disconnected,
            last_sample: ControlSample::default(),
            fallback_scene: false,
        }
    }

    /// Fold one channel event into the displayed state.
    pub fn apply_event(&mut self, event: &ChannelEvent) {
        match event {
            ChannelEvent::Connected => self.state = ConnectionState::Connected,
            ChannelEvent::Disconnected { .. } => self.state = ConnectionState::Disconnected,
            ChannelEvent::Error { .. } => self.state = ConnectionState::Error,
            ChannelEvent::Sample { sample } => self.last_sample = *sample,
        }
    }

    pub fn set_fallback_scene(&mut self, fallback: bool) {
        self.fallback_scene = fallback;
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
        self.text_buffer.set_size(
            &mut self.font_system,
            Some(width as f32),
            Some(height as f32),
        );
    }

    /// Draw the overlay on top of the already-rendered scene.
    pub fn render(&mut self, device: &Device, queue: &Queue, view: &TextureView) {
        let mut vertices: Vec<Vertex> = Vec::new();

        // Panel behind the readouts (top left)
        vertices.extend_from_slice(&make_quad(
            -0.98,
            0.70,
            0.46,
            0.26,
            [0.03, 0.03, 0.06, 0.75],
        ));

        // Connection dot
        let dot_color = match self.state {
            ConnectionState::Connected => [0.0, 0.8, 0.0, 1.0],
            ConnectionState::Disconnected => [0.45, 0.45, 0.45, 1.0],
            ConnectionState::Error => [0.8, 0.1, 0.1, 1.0],
        };
        vertices.extend_from_slice(&make_quad(-0.955, 0.885, 0.025, 0.04, dot_color));

        queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&vertices));

        let label = match self.state {
            ConnectionState::Connected => "connected",
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Error => "link error",
        };

        let mut text = format!(
            "   gesture link: {}\nzoom      {:5.1}\nrotate x  {:6.1}\u{00b0}\nrotate y  {:6.1}\u{00b0}\n",
            label, self.last_sample.zoom, self.last_sample.rotate_x, self.last_sample.rotate_y,
        );
        if self.fallback_scene {
            text.push_str("procedural scene\n");
        }

        self.text_buffer.set_text(
            &mut self.font_system,
            &text,
            Attrs::new()
                .family(Family::Monospace)
                .color(TextColor::rgb(180, 190, 210)),
            Shaping::Advanced,
        );

        let (width, height) = self.size;
        let text_areas = vec![TextArea {
            buffer: &self.text_buffer,
            left: 16.0,
            top: 14.0,
            scale: 1.0,
            bounds: TextBounds {
                left: 0,
                top: 0,
                right: (width as f32 * 0.4) as i32,
                bottom: (height as f32 * 0.3) as i32,
            },
            default_color: TextColor::rgb(180, 190, 210),
            custom_glyphs: &[],
        }];

        let mut viewport = Viewport::new(device, &self.cache);
        viewport.update(queue, glyphon::Resolution { width, height });

        let text_ready = match self.text_renderer.prepare(
            device,
            queue,
            &mut self.font_system,
            &mut self.text_atlas,
            &viewport,
            text_areas,
            &mut self.swash_cache,
        ) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Overlay text prepare failed, skipping text: {}", e);
                false
            }
        };

        let mut encoder = device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("overlay_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("overlay_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: Operations {
                        // Scene is already in the target
                        load: LoadOp::Load,
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            pass.set_pipeline(&self.pipeline);
            pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            pass.draw(0..vertices.len() as u32, 0..1);

            if text_ready {
                if let Err(e) = self
                    .text_renderer
                    .render(&self.text_atlas, &viewport, &mut pass)
                {
                    log::warn!("Overlay text render failed: {}", e);
                }
            }
        }

        queue.submit(std::iter::once(encoder.finish()));

        self.text_atlas.trim();
    }
}

/// Two triangles from position and size, in NDC.
fn make_quad(x: f32, y: f32, w: f32, h: f32, color: [f32; 4]) -> [Vertex; 6] {
    [
        Vertex { position: [x, y], color },
        Vertex { position: [x + w, y], color },
        Vertex { position: [x, y + h], color },
        Vertex { position: [x, y + h], color },
        Vertex { position: [x + w, y], color },
        Vertex { position: [x + w, y + h], color },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_quad_spans_rect() {
        let quad = make_quad(-1.0, -1.0, 2.0, 2.0, [1.0; 4]);
        assert_eq!(quad.len(), 6);
        let xs: Vec<f32> = quad.iter().map(|v| v.position[0]).collect();
        assert!(xs.contains(&-1.0));
        assert!(xs.contains(&1.0));
    }
}
