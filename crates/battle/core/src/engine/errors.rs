//! Errors surfaced by the battle driver itself.
//!
//! Rejected commands are not errors at this level; they land in the
//! [`TurnReport`](super::TurnReport) of the turn that resolved them.

use crate::action::ActionParseError;
use crate::error::{ErrorSeverity, GameError};
use crate::state::{MapError, Position, Side};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleError {
    #[error("invalid battleground: {0}")]
    Map(#[from] MapError),

    #[error("{side:?} has no general in its roster")]
    EmptyRoster { side: Side },

    #[error("cannot field {side:?}'s general at {position}")]
    Placement { side: Side, position: Position },

    #[error("only the two playing sides can submit actions, got {0:?}")]
    NotAPlayer(Side),

    #[error("turn {turn} was already resolved (now at turn {current})")]
    StaleTurn { turn: u64, current: u64 },

    #[error("{side:?} already submitted an action for turn {turn}")]
    AlreadySubmitted { side: Side, turn: u64 },

    #[error(transparent)]
    Parse(#[from] ActionParseError),

    #[error("battle ended on turn {turn}: {winner:?} won")]
    Finished { winner: Side, turn: u64 },
}

impl GameError for BattleError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Map(_) | Self::EmptyRoster { .. } | Self::Placement { .. } => {
                ErrorSeverity::Fatal
            }
            Self::NotAPlayer(_) | Self::Parse(_) => ErrorSeverity::Validation,
            Self::StaleTurn { .. } | Self::AlreadySubmitted { .. } | Self::Finished { .. } => {
                ErrorSeverity::Recoverable
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Map(error) => error.error_code(),
            Self::EmptyRoster { .. } => "BATTLE_EMPTY_ROSTER",
            Self::Placement { .. } => "BATTLE_PLACEMENT",
            Self::NotAPlayer(_) => "BATTLE_NOT_A_PLAYER",
            Self::StaleTurn { .. } => "BATTLE_STALE_TURN",
            Self::AlreadySubmitted { .. } => "BATTLE_ALREADY_SUBMITTED",
            Self::Parse(error) => error.error_code(),
            Self::Finished { .. } => "BATTLE_FINISHED",
        }
    }
}
