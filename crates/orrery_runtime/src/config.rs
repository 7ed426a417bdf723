//! Viewer Configuration
//!
//! Layered sources, in priority order:
//!
//! 1. Positional CLI argument (model path)
//! 2. Environment variables: `ORRERY_SERVER`, `ORRERY_MODEL`, `ORRERY_SMOOTHING`
//! 3. Config file: `orrery.toml` in the working directory
//! 4. Compiled-in defaults
//!
//! # Example Config File
//!
//! ```toml
//! server_url = "ws://192.168.1.20:5000/gestures"
//! model_path = "assets/solar_system.glb"
//! smoothing = 0.1
//! initial_zoom = 85.0
//! ```

use serde::Deserialize;

use orrery_gesture::ChannelConfig;

/// Complete viewer configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Websocket endpoint of the gesture producer
    pub server_url: String,
    /// Delay between reconnect attempts in milliseconds
    pub reconnect_delay_ms: u64,
    /// Consecutive failed connects before the channel gives up
    pub max_reconnect_attempts: u32,
    /// Model file to load (glTF/GLB)
    pub model_path: String,
    /// Interpolation factor per frame, in (0, 1)
    pub smoothing: f32,
    /// Zoom target before any gesture arrives (0-100)
    pub initial_zoom: f32,
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            server_url: "ws://127.0.0.1:5000/gestures".to_string(),
            reconnect_delay_ms: 1000,
            max_reconnect_attempts: 5,
            model_path: "assets/solar_system.glb".to_string(),
            smoothing: 0.1,
            initial_zoom: 85.0,
            window_title: "Orrery".to_string(),
            window_width: 1280,
            window_height: 720,
        }
    }
}

impl ViewerConfig {
    /// Load configuration from all sources.
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Ok(content) = std::fs::read_to_string("orrery.toml") {
            match toml::from_str(&content) {
                Ok(loaded) => {
                    config = loaded;
                    log::info!("Loaded config from orrery.toml");
                }
                Err(e) => log::warn!("Ignoring orrery.toml: {}", e),
            }
        }

        if let Ok(url) = std::env::var("ORRERY_SERVER") {
            if !url.is_empty() {
                config.server_url = url;
            }
        }
        if let Ok(path) = std::env::var("ORRERY_MODEL") {
            if !path.is_empty() {
                config.model_path = path;
            }
        }
        if let Ok(value) = std::env::var("ORRERY_SMOOTHING") {
            match value.parse::<f32>() {
                Ok(s) => config.smoothing = s,
                Err(_) => log::warn!("Ignoring invalid ORRERY_SMOOTHING: {}", value),
            }
        }

        // First non-flag argument is the model path
        for arg in std::env::args().skip(1) {
            if !arg.starts_with("--") {
                config.model_path = arg;
                break;
            }
        }

        config.sanitize()
    }

    /// Clamp numeric fields into their documented ranges.
    fn sanitize(mut self) -> Self {
        if !self.smoothing.is_finite() || self.smoothing <= 0.0 || self.smoothing >= 1.0 {
            log::warn!(
                "Smoothing {} outside (0, 1), using default",
                self.smoothing
            );
            self.smoothing = Self::default().smoothing;
        }
        if !self.initial_zoom.is_finite() || !(0.0..=100.0).contains(&self.initial_zoom) {
            log::warn!(
                "Initial zoom {} outside 0-100, using default",
                self.initial_zoom
            );
            self.initial_zoom = Self::default().initial_zoom;
        }
        self
    }

    /// Channel configuration slice of the viewer config.
    pub fn channel_config(&self) -> ChannelConfig {
        ChannelConfig {
            url: self.server_url.clone(),
            reconnect_delay_ms: self.reconnect_delay_ms,
            max_reconnect_attempts: self.max_reconnect_attempts,
        }
    }

    /// Print configuration summary
    pub fn print_summary(&self) {
        log::info!("Viewer configuration:");
        log::info!("  Server: {}", self.server_url);
        log::info!(
            "  Reconnect: every {}ms, {} attempts",
            self.reconnect_delay_ms,
            self.max_reconnect_attempts
        );
        log::info!("  Model: {}", self.model_path);
        log::info!(
            "  Smoothing: {}, initial zoom: {}",
            self.smoothing,
            self.initial_zoom
        );
    }
}
