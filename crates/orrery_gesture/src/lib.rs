//! Gesture control channel
//!
//! Receives gesture samples (zoom percentage plus two rotation angles) from
//! an external producer over a websocket connection and exposes the most
//! recent sample to the render loop through a shared single-slot container.
//! The channel reconnects automatically with a bounded retry budget and
//! surfaces its lifecycle (connected / disconnected / error) as events the
//! embedder drains once per frame.

pub mod channel;
pub mod sample;
pub mod slot;

pub use channel::{
    ChannelConfig, ChannelError, ChannelEvent, ConnectionState, GestureChannel,
};
pub use sample::ControlSample;
pub use slot::GestureSlot;
