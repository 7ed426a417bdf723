//! Websocket gesture channel with bounded auto-reconnect
//!
//! Owns a small private tokio runtime so the embedder stays synchronous. The
//! socket task decodes inbound `gesture_update` frames straight into the
//! shared slot and queues lifecycle events the embedder drains once per
//! frame; nothing here ever calls back into render code.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::sample::ControlSample;
use crate::slot::GestureSlot;

/// Channel errors
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Already connected")]
    AlreadyConnected,

    #[error("Failed to start channel runtime: {0}")]
    Runtime(String),
}

/// Connection lifecycle state.
///
/// `Error` means the retry budget was exhausted; the channel stays parked
/// there until the embedder calls `disconnect()` and `connect()` again.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connected,
    Error,
}

/// Events surfaced to the status display, drained once per frame.
#[derive(Debug, Clone)]
pub enum ChannelEvent {
    /// Connection established (also after a successful reconnect)
    Connected,
    /// Connection lost; the channel will retry on its own
    Disconnected { reason: String },
    /// Retry budget exhausted, channel gave up
    Error { message: String },
    /// A gesture sample was decoded and stored
    Sample { sample: ControlSample },
}

/// Configuration for the gesture channel
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Websocket endpoint of the gesture producer
    pub url: String,
    /// Delay between reconnect attempts in milliseconds
    pub reconnect_delay_ms: u64,
    /// Consecutive failed connect attempts before giving up
    pub max_reconnect_attempts: u32,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:5000/gestures".to_string(),
            reconnect_delay_ms: 1000,
            max_reconnect_attempts: 5,
        }
    }
}

/// State shared between the embedder and the socket task
struct SharedState {
    state: ConnectionState,
    pending_events: Vec<ChannelEvent>,
}

/// Websocket client that feeds the gesture slot.
pub struct GestureChannel {
    config: ChannelConfig,
    slot: GestureSlot,
    shared: Arc<Mutex<SharedState>>,
    runtime: Option<tokio::runtime::Runtime>,
    shutdown_tx: Option<mpsc::Sender<()>>,
}

impl GestureChannel {
    /// Create a channel writing into the given slot. Call `connect()` to
    /// actually open the connection.
    pub fn new(config: ChannelConfig, slot: GestureSlot) -> Self {
        Self {
            config,
            slot,
            shared: Arc::new(Mutex::new(SharedState {
                state: ConnectionState::Disconnected,
                pending_events: Vec::new(),
            })),
            runtime: None,
            shutdown_tx: None,
        }
    }

    /// Spawn the socket task and start connecting.
    pub fn connect(&mut self) -> Result<(), ChannelError> {
        if self.runtime.is_some() {
            return Err(ChannelError::AlreadyConnected);
        }

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .map_err(|e| ChannelError::Runtime(e.to_string()))?;

        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let shared = self.shared.clone();
        let slot = self.slot.clone();
        let config = self.config.clone();

        runtime.spawn(async move {
            run_socket_loop(config, shared, slot, shutdown_rx).await;
        });

        self.runtime = Some(runtime);
        self.shutdown_tx = Some(shutdown_tx);

        log::info!("GestureChannel: connecting to {}", self.config.url);

        Ok(())
    }

    /// Stop the socket task and tear down the runtime.
    pub fn disconnect(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.blocking_send(());
        }
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
        self.shared.lock().state = ConnectionState::Disconnected;
        log::info!("GestureChannel: disconnected");
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.shared.lock().state
    }

    /// Drain pending lifecycle events (call each frame).
    pub fn poll_events(&mut self) -> Vec<ChannelEvent> {
        std::mem::take(&mut self.shared.lock().pending_events)
    }
}

impl Drop for GestureChannel {
    fn drop(&mut self) {
        self.disconnect();
    }
}

async fn run_socket_loop(
    config: ChannelConfig,
    shared: Arc<Mutex<SharedState>>,
    slot: GestureSlot,
    mut shutdown_rx: mpsc::Receiver<()>,
) {
    let mut failed_attempts: u32 = 0;

    loop {
        match connect_async(&config.url).await {
            Ok((ws_stream, _)) => {
                failed_attempts = 0;
                {
                    let mut s = shared.lock();
                    s.state = ConnectionState::Connected;
                    s.pending_events.push(ChannelEvent::Connected);
                }
                log::info!("GestureChannel: connected to {}", config.url);

                let (mut write, mut read) = ws_stream.split();
                let reason;

                loop {
                    tokio::select! {
                        _ = shutdown_rx.recv() => {
                            let _ = write.close().await;
                            return;
                        }
                        msg = read.next() => {
                            match msg {
                                Some(Ok(Message::Text(text))) => {
                                    handle_frame(&text, &shared, &slot);
                                }
                                Some(Ok(Message::Ping(data))) => {
                                    let _ = write.send(Message::Pong(data)).await;
                                }
                                Some(Ok(Message::Close(_))) => {
                                    reason = "server closed connection".to_string();
                                    break;
                                }
                                Some(Err(e)) => {
                                    reason = e.to_string();
                                    break;
                                }
                                None => {
                                    reason = "stream ended".to_string();
                                    break;
                                }
                                _ => {}
                            }
                        }
                    }
                }

                log::warn!("GestureChannel: connection lost: {}", reason);
                let mut s = shared.lock();
                s.state = ConnectionState::Disconnected;
                s.pending_events.push(ChannelEvent::Disconnected { reason });
            }
            Err(e) => {
                failed_attempts += 1;
                log::warn!(
                    "GestureChannel: connect failed ({}/{}): {}",
                    failed_attempts,
                    config.max_reconnect_attempts,
                    e
                );

                if failed_attempts >= config.max_reconnect_attempts {
                    let message = format!(
                        "gave up after {} attempts: {}",
                        failed_attempts, e
                    );
                    log::error!("GestureChannel: {}", message);
                    let mut s = shared.lock();
                    s.state = ConnectionState::Error;
                    s.pending_events.push(ChannelEvent::Error { message });
                    return;
                }
            }
        }

        // Wait out the reconnect delay, unless shutdown arrives first
        tokio::select! {
            _ = shutdown_rx.recv() => {
                return;
            }
            _ = tokio::time::sleep(std::time::Duration::from_millis(config.reconnect_delay_ms)) => {
                log::debug!("GestureChannel: reconnecting...");
            }
        }
    }
}

/// Decode one inbound text frame and store the sample.
///
/// Malformed frames are logged and dropped; the slot is only ever written
/// with a fully decoded sample.
fn handle_frame(text: &str, shared: &Arc<Mutex<SharedState>>, slot: &GestureSlot) {
    let json: serde_json::Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("GestureChannel: dropping unparseable frame: {}", e);
            return;
        }
    };

    match ControlSample::from_json(&json) {
        Some(sample) => {
            slot.store(sample);
            shared
                .lock()
                .pending_events
                .push(ChannelEvent::Sample { sample });
        }
        None => {
            log::warn!("GestureChannel: dropping malformed gesture payload");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_shared() -> Arc<Mutex<SharedState>> {
        Arc::new(Mutex::new(SharedState {
            state: ConnectionState::Disconnected,
            pending_events: Vec::new(),
        }))
    }

    #[test]
    fn test_config_defaults() {
        let config = ChannelConfig::default();
        assert_eq!(config.reconnect_delay_ms, 1000);
        assert_eq!(config.max_reconnect_attempts, 5);
        assert!(config.url.starts_with("ws://"));
    }

    #[test]
    fn test_handle_frame_stores_sample() {
        let shared = test_shared();
        let slot = GestureSlot::new();

        handle_frame(
            r#"{"type":"gesture_update","zoom":70.0,"rotate_x":5.0,"rotate_y":-5.0}"#,
            &shared,
            &slot,
        );

        assert_eq!(slot.load().zoom, 70.0);
        assert_eq!(shared.lock().pending_events.len(), 1);
    }

    #[test]
    fn test_handle_frame_drops_malformed_payload() {
        let shared = test_shared();
        let slot = GestureSlot::new();
        let before = slot.load();

        handle_frame(
            r#"{"type":"gesture_update","zoom":"bad","rotate_x":0,"rotate_y":0}"#,
            &shared,
            &slot,
        );

        assert_eq!(slot.load(), before);
        assert!(shared.lock().pending_events.is_empty());
    }

    #[test]
    fn test_handle_frame_drops_unparseable_text() {
        let shared = test_shared();
        let slot = GestureSlot::new();
        let before = slot.load();

        handle_frame("not json at all", &shared, &slot);

        assert_eq!(slot.load(), before);
        assert!(shared.lock().pending_events.is_empty());
    }

    #[test]
    fn test_handle_frame_last_write_wins() {
        let shared = test_shared();
        let slot = GestureSlot::new();

        for zoom in [10, 40, 90] {
            let frame = format!(
                r#"{{"type":"gesture_update","zoom":{},"rotate_x":0,"rotate_y":0}}"#,
                zoom
            );
            handle_frame(&frame, &shared, &slot);
        }

        // Only the last sample is visible; intermediates were overwritten
        assert_eq!(slot.load().zoom, 90.0);
        assert_eq!(shared.lock().pending_events.len(), 3);
    }

    #[test]
    fn test_channel_starts_disconnected() {
        let channel = GestureChannel::new(ChannelConfig::default(), GestureSlot::new());
        assert_eq!(channel.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_poll_events_drains() {
        let mut channel = GestureChannel::new(ChannelConfig::default(), GestureSlot::new());
        channel
            .shared
            .lock()
            .pending_events
            .push(ChannelEvent::Connected);

        assert_eq!(channel.poll_events().len(), 1);
        assert!(channel.poll_events().is_empty());
    }

    #[test]
    fn test_connect_twice_is_rejected() {
        let mut channel = GestureChannel::new(
            ChannelConfig {
                // Nothing listens here; the socket task just burns retries
                url: "ws://127.0.0.1:1/gestures".to_string(),
                reconnect_delay_ms: 10,
                max_reconnect_attempts: 1,
            },
            GestureSlot::new(),
        );

        channel.connect().unwrap();
        assert!(matches!(
            channel.connect(),
            Err(ChannelError::AlreadyConnected)
        ));
        channel.disconnect();
    }
}
