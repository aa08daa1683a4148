//! Providers that bridge a [`Transport`].
//!
//! [`RemoteProvider`] turns the peer's messages into orders for the side it
//! plays; [`RelayProvider`] wraps a local provider and forwards each of its
//! orders to the peer.

use std::sync::Arc;

use async_trait::async_trait;
use skirmish_core::{Action, BattleState, Side};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::api::{ActionProvider, Result};
use crate::transport::{Frame, Transport, wire};

/// Reads the peer's orders off a transport.
///
/// Messages for earlier turns are discarded; a message for a later turn is
/// held back until that turn is asked for. A message that does not decode is
/// a pass.
pub struct RemoteProvider {
    transport: Arc<dyn Transport>,
    early: Mutex<Option<(u64, Action)>>,
}

impl RemoteProvider {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            early: Mutex::new(None),
        }
    }
}

#[async_trait]
impl ActionProvider for RemoteProvider {
    async fn provide_action(&self, side: Side, turn: u64, _state: &BattleState) -> Result<Option<Action>> {
        let mut early = self.early.lock().await;
        match *early {
            Some((due, action)) if due == turn => {
                *early = None;
                return Ok(Some(action));
            }
            Some((due, _)) if due > turn => return Ok(None),
            _ => *early = None,
        }

        loop {
            let message = self.transport.recv().await?;
            match wire::decode(&message) {
                Ok(Frame::Idle) => return Ok(None),
                Ok(Frame::Order { turn: due, action }) if due == turn => return Ok(Some(action)),
                Ok(Frame::Order { turn: due, action }) if due > turn => {
                    debug!(%side, turn, due, "holding early order");
                    *early = Some((due, action));
                    return Ok(None);
                }
                Ok(Frame::Order { turn: due, .. }) => {
                    debug!(%side, turn, due, "discarding stale order");
                }
                Err(error) => {
                    warn!(%side, turn, %error, "peer sent a malformed message");
                    return Ok(None);
                }
            }
        }
    }
}

/// Forwards every order of an inner provider to the peer.
pub struct RelayProvider {
    inner: Arc<dyn ActionProvider>,
    transport: Arc<dyn Transport>,
}

impl RelayProvider {
    pub fn new(inner: Arc<dyn ActionProvider>, transport: Arc<dyn Transport>) -> Self {
        Self { inner, transport }
    }
}

#[async_trait]
impl ActionProvider for RelayProvider {
    async fn provide_action(&self, side: Side, turn: u64, state: &BattleState) -> Result<Option<Action>> {
        let action = self.inner.provide_action(side, turn, state).await?;
        self.transport
            .send(turn, action)
            .await
            .inspect_err(|error| warn!(%side, turn, %error, "failed to relay order"))?;
        Ok(action)
    }
}
