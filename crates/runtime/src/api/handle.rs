//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! submitting orders, stepping the battle, and streaming events.
use tokio::sync::{broadcast, mpsc, oneshot};

use skirmish_core::{Action, BattleState, Outcome, ReplayLog, Side, TurnReport};

use super::errors::{Result, RuntimeError};
use super::events::BattleEvent;
use crate::workers::Command;

/// Read-only copy of the battle taken between turns.
#[derive(Debug, Clone)]
pub struct BattleSnapshot {
    pub turn: u64,
    pub state: BattleState,
    pub outcome: Option<Outcome>,
}

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_tx: broadcast::Sender<BattleEvent>,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_tx: broadcast::Sender<BattleEvent>) -> Self {
        Self {
            command_tx,
            event_tx,
        }
    }

    /// Queue `side`'s order for `turn`.
    pub async fn submit(&self, side: Side, turn: u64, action: Action) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::Submit {
                side,
                turn,
                action,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    /// Resolve the current turn.
    pub async fn advance(&self) -> Result<TurnReport> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::Advance { reply: reply_tx })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    /// Query the current battle (read-only snapshot)
    pub async fn query_state(&self) -> Result<BattleSnapshot> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::QueryState { reply: reply_tx })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Every order the battle has resolved so far.
    pub async fn replay_log(&self) -> Result<ReplayLog> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::QueryLog { reply: reply_tx })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Subscribe to battle events.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let mut events = handle.subscribe();
    /// while let Ok(event) = events.recv().await {
    ///     if let BattleEvent::Finished { outcome, .. } = event {
    ///         println!("{} won", outcome.winner);
    ///     }
    /// }
    /// ```
    pub fn subscribe(&self) -> broadcast::Receiver<BattleEvent> {
        self.event_tx.subscribe()
    }
}
