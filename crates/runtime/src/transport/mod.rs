//! Turn message transport between two battle peers.
//!
//! The runtime only needs to send its own order for a turn and receive the
//! peer's raw messages; framing lives in [`wire`], delivery in the
//! [`Transport`] implementation.

mod loopback;
pub mod wire;

use async_trait::async_trait;
use skirmish_core::Action;
use thiserror::Error;

pub use loopback::LoopbackTransport;
pub use wire::{Frame, WireError};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport peer disconnected")]
    Disconnected,

    #[error("malformed message: {0}")]
    Malformed(#[from] WireError),
}

/// Bidirectional channel to the peer running the other side.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send our order (or pass) for `turn`.
    async fn send(&self, turn: u64, action: Option<Action>) -> Result<(), TransportError>;

    /// Wait for the next raw message from the peer.
    async fn recv(&self) -> Result<String, TransportError>;
}
