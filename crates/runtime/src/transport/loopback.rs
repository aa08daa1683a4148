//! In-process transport pair built on tokio channels.

use async_trait::async_trait;
use skirmish_core::Action;
use tokio::sync::{Mutex, mpsc};

use super::{Transport, TransportError, wire};

/// One end of an in-process connection.
///
/// Messages are encoded with [`wire::encode`] on the way out, so the far end
/// sees exactly what a network peer would send.
pub struct LoopbackTransport {
    outbound: mpsc::Sender<String>,
    inbound: Mutex<mpsc::Receiver<String>>,
}

impl LoopbackTransport {
    const BUFFER: usize = 64;

    /// Two connected ends.
    pub fn pair() -> (Self, Self) {
        let (left_tx, left_rx) = mpsc::channel(Self::BUFFER);
        let (right_tx, right_rx) = mpsc::channel(Self::BUFFER);
        (
            Self {
                outbound: left_tx,
                inbound: Mutex::new(right_rx),
            },
            Self {
                outbound: right_tx,
                inbound: Mutex::new(left_rx),
            },
        )
    }

    /// Push a raw message to the peer, bypassing the encoder.
    pub async fn send_raw(&self, message: impl Into<String>) -> Result<(), TransportError> {
        self.outbound
            .send(message.into())
            .await
            .map_err(|_| TransportError::Disconnected)
    }
}

#[async_trait]
impl Transport for LoopbackTransport {
    async fn send(&self, turn: u64, action: Option<Action>) -> Result<(), TransportError> {
        self.send_raw(wire::encode(turn, action.as_ref())).await
    }

    async fn recv(&self) -> Result<String, TransportError> {
        self.inbound
            .lock()
            .await
            .recv()
            .await
            .ok_or(TransportError::Disconnected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ends_see_each_others_messages() {
        let (left, right) = LoopbackTransport::pair();
        left.send(3, Some(Action::Stop)).await.unwrap();
        right.send(3, None).await.unwrap();

        assert_eq!(right.recv().await.unwrap(), "3#stop");
        assert_eq!(left.recv().await.unwrap(), "D");
    }

    #[tokio::test]
    async fn dropped_peer_disconnects() {
        let (left, right) = LoopbackTransport::pair();
        drop(right);
        assert!(matches!(left.recv().await, Err(TransportError::Disconnected)));
        assert!(matches!(left.send(0, None).await, Err(TransportError::Disconnected)));
    }
}
