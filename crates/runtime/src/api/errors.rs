//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, transports, and content loading
//! so clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use skirmish_core::{BattleError, Side};

use crate::repository::RepositoryError;
use crate::transport::TransportError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("{side} action provider not set")]
    ProviderNotSet { side: Side },

    #[error("simulation worker command channel closed")]
    CommandChannelClosed,

    #[error("simulation worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("simulation worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error(transparent)]
    Battle(#[from] BattleError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("runtime requires a battle setup or a content directory")]
    MissingSetup,

    #[error("failed to load content: {0:#}")]
    Content(anyhow::Error),
}

impl RuntimeError {
    /// Whether the error only says the battle has already been decided.
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Battle(BattleError::Finished { .. }))
    }
}
