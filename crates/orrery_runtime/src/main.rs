//! Orrery - gesture-driven 3D viewer
//!
//! Renders a solar-system model whose camera distance and orientation follow
//! gesture samples streamed from an external producer. The render loop runs
//! at display rate regardless of what the gesture link or the asset loader
//! are doing: samples land in a shared slot, the loop reads the latest one
//! each frame and eases the live transform toward it.
//!
//! Run with: cargo run -p orrery_runtime
//!       or: cargo run --bin orrery -- path/to/model.glb

mod config;
mod loader;
mod overlay;
mod presenter;
mod scene_renderer;

use std::path::PathBuf;
use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Window, WindowAttributes},
};

use orrery_gesture::{ControlSample, GestureChannel, GestureSlot};
use orrery_render::GestureRig;

use crate::config::ViewerConfig;
use crate::loader::LoadedScene;
use crate::overlay::StatusOverlay;
use crate::presenter::Presenter;
use crate::scene_renderer::SceneRenderer;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ViewerConfig::load();
    config.print_summary();

    // The slot starts at the configured initial target so the camera has
    // somewhere to go even if no gesture ever arrives
    let slot = GestureSlot::new();
    slot.store(ControlSample {
        zoom: config.initial_zoom,
        ..Default::default()
    });

    let mut channel = GestureChannel::new(config.channel_config(), slot.clone());
    if let Err(e) = channel.connect() {
        log::error!("Failed to start gesture channel: {}", e);
    }

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            log::error!("Failed to create event loop: {}", e);
            return;
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let rig = GestureRig::new(config.smoothing);
    let mut app = ViewerApp {
        config,
        slot,
        channel,
        rig,
        window: None,
        presenter: None,
        scene_renderer: None,
        overlay: None,
        scene_rx: None,
        frame: 0,
    };

    if let Err(e) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {}", e);
    }
}

/// Application state for the viewer window
struct ViewerApp {
    config: ViewerConfig,
    slot: GestureSlot,
    channel: GestureChannel,
    rig: GestureRig,
    window: Option<Arc<Window>>,
    presenter: Option<Presenter>,
    scene_renderer: Option<SceneRenderer>,
    overlay: Option<StatusOverlay>,
    scene_rx: Option<crossbeam_channel::Receiver<LoadedScene>>,
    frame: u64,
}

impl ViewerApp {
    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        log::info!("Shutting down...");
        self.channel.disconnect();
        event_loop.exit();
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let window_attrs = WindowAttributes::default()
            .with_title(self.config.window_title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.window_width,
                self.config.window_height,
            ));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        let presenter = match pollster::block_on(Presenter::new(window)) {
            Ok(presenter) => presenter,
            Err(e) => {
                log::error!("GPU initialization failed: {}", e);
                event_loop.exit();
                return;
            }
        };

        let size = presenter.size();
        let scene_renderer = SceneRenderer::new(presenter.device(), presenter.format(), size);
        let overlay = StatusOverlay::new(
            presenter.device(),
            presenter.queue(),
            presenter.format(),
            size,
        );

        // Model parsing happens off-thread; frames keep presenting meanwhile
        self.scene_rx = Some(loader::spawn_scene_loader(PathBuf::from(
            &self.config.model_path,
        )));

        log::info!("Viewer initialized. ESC or close to exit.");

        self.presenter = Some(presenter);
        self.scene_renderer = Some(scene_renderer);
        self.overlay = Some(overlay);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.shutdown(event_loop);
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed
                    && event.logical_key == Key::Named(NamedKey::Escape)
                {
                    self.shutdown(event_loop);
                }
            }

            WindowEvent::Resized(size) => {
                let Some(presenter) = &mut self.presenter else { return };
                presenter.resize((size.width, size.height));
                if let Some(scene_renderer) = &mut self.scene_renderer {
                    scene_renderer.resize(presenter.device(), (size.width, size.height));
                }
                if let Some(overlay) = &mut self.overlay {
                    overlay.resize(size.width, size.height);
                }
            }

            WindowEvent::RedrawRequested => {
                let Some(presenter) = &mut self.presenter else { return };
                let Some(scene_renderer) = &mut self.scene_renderer else { return };
                let Some(overlay) = &mut self.overlay else { return };

                self.frame += 1;

                // Drain channel lifecycle events into the status display
                for event in self.channel.poll_events() {
                    overlay.apply_event(&event);
                }

                // Pick up the loaded scene if the background thread is done
                let loaded = self.scene_rx.as_ref().and_then(|rx| rx.try_recv().ok());
                if let Some(loaded) = loaded {
                    scene_renderer.install_scene(presenter.device(), &loaded.scene);
                    overlay.set_fallback_scene(loaded.fallback);
                    self.scene_rx = None;
                }

                // Advance the live transform toward the latest target. With
                // no scene yet there is nothing to move; the frame is still
                // drawn below so the cadence never stalls.
                if scene_renderer.is_loaded() {
                    let target = self.slot.load();
                    self.rig.advance(&target);
                    scene_renderer.set_camera_eye(self.rig.eye_position());
                    scene_renderer.set_model_rotation(self.rig.model_rotation());
                }

                let output = match presenter.acquire_frame() {
                    Ok(t) => t,
                    Err(wgpu::SurfaceError::Lost) => {
                        presenter.resize(presenter.size());
                        return;
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of GPU memory!");
                        event_loop.exit();
                        return;
                    }
                    Err(e) => {
                        log::warn!("Surface error: {:?}", e);
                        return;
                    }
                };

                let view = output
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());

                scene_renderer.render(presenter.device(), presenter.queue(), &view);
                overlay.render(presenter.device(), presenter.queue(), &view);

                output.present();

                if self.frame % 300 == 1 {
                    log::info!(
                        "Frame {}: link={:?}, meshes={}, distance={:.2}",
                        self.frame,
                        self.channel.state(),
                        scene_renderer.mesh_count(),
                        self.rig.live().distance,
                    );
                }
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}
