//! Command errors.
//!
//! Rejected commands never abort a turn; the engine records them in the
//! turn report and carries on.

use crate::error::{ErrorSeverity, GameError};
use crate::state::Side;

// ============================================================================
// Command Parsing
// ============================================================================

/// Why a raw action line did not decode.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionParseError {
    #[error("empty action line")]
    Empty,

    #[error("unknown command `{0}`")]
    UnknownCommand(String),

    #[error("`{command}` expects an index")]
    MissingIndex { command: String },

    #[error("`{command}` index `{value}` is not a number")]
    InvalidIndex { command: String, value: String },

    #[error("`{command}` expects coordinates")]
    MissingCoordinates { command: String },

    #[error("`{command}` coordinate `{value}` is not a number")]
    InvalidCoordinate { command: String, value: String },

    #[error("trailing input `{0}`")]
    TrailingInput(String),
}

impl GameError for ActionParseError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Empty => "PARSE_EMPTY",
            Self::UnknownCommand(_) => "PARSE_UNKNOWN_COMMAND",
            Self::MissingIndex { .. } => "PARSE_MISSING_INDEX",
            Self::InvalidIndex { .. } => "PARSE_INVALID_INDEX",
            Self::MissingCoordinates { .. } => "PARSE_MISSING_COORDINATES",
            Self::InvalidCoordinate { .. } => "PARSE_INVALID_COORDINATE",
            Self::TrailingInput(_) => "PARSE_TRAILING_INPUT",
        }
    }
}

// ============================================================================
// General Commands
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TacticError {
    #[error("tactic {index} is not in the list of {available}")]
    UnknownTactic { index: usize, available: usize },
}

impl GameError for TacticError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        "TACTIC_UNKNOWN"
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SwapError {
    #[error("swap is {remaining} ticks from ready")]
    NotReady { remaining: i32 },

    #[error("no reserve general in slot {index}")]
    NoReserve { index: usize },
}

impl GameError for SwapError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotReady { .. } => ErrorSeverity::Recoverable,
            Self::NoReserve { .. } => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotReady { .. } => "SWAP_NOT_READY",
            Self::NoReserve { .. } => "SWAP_NO_RESERVE",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SkillError {
    #[error("skill {index} does not exist")]
    UnknownSkill { index: usize },

    #[error("skill {index} is {remaining} ticks from ready")]
    OnCooldown { index: usize, remaining: i32 },

    #[error("skill {index} had no effect")]
    NoEffect { index: usize },
}

impl GameError for SkillError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownSkill { .. } => ErrorSeverity::Validation,
            Self::OnCooldown { .. } | Self::NoEffect { .. } => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownSkill { .. } => "SKILL_UNKNOWN",
            Self::OnCooldown { .. } => "SKILL_ON_COOLDOWN",
            Self::NoEffect { .. } => "SKILL_NO_EFFECT",
        }
    }
}

/// Fortress hosting failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HostError {
    #[error("target is not a fortress")]
    NotAFortress,

    #[error("guest is not an active general")]
    NotAGeneral,

    #[error("fortress belongs to {owner:?}")]
    WrongSide { owner: Side },

    #[error("fortress is full")]
    Full,

    #[error("guest is not inside this fortress")]
    NotAGuest,

    #[error("{side:?} already has an active general")]
    SeatTaken { side: Side },

    #[error("no free tile around the fortress")]
    NoRoom,
}

impl GameError for HostError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotAFortress | Self::NotAGeneral | Self::NotAGuest => ErrorSeverity::Validation,
            _ => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotAFortress => "HOST_NOT_A_FORTRESS",
            Self::NotAGeneral => "HOST_NOT_A_GENERAL",
            Self::WrongSide { .. } => "HOST_WRONG_SIDE",
            Self::Full => "HOST_FULL",
            Self::NotAGuest => "HOST_NOT_A_GUEST",
            Self::SeatTaken { .. } => "HOST_SEAT_TAKEN",
            Self::NoRoom => "HOST_NO_ROOM",
        }
    }
}

/// Any rejection of a decoded command, as reported per side and turn.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommandError {
    #[error("{0:?} has no active general")]
    NoGeneral(Side),

    #[error(transparent)]
    Parse(#[from] ActionParseError),

    #[error(transparent)]
    Tactic(#[from] TacticError),

    #[error(transparent)]
    Swap(#[from] SwapError),

    #[error(transparent)]
    Skill(#[from] SkillError),
}

impl GameError for CommandError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NoGeneral(_) => ErrorSeverity::Recoverable,
            Self::Parse(error) => error.severity(),
            Self::Tactic(error) => error.severity(),
            Self::Swap(error) => error.severity(),
            Self::Skill(error) => error.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NoGeneral(_) => "COMMAND_NO_GENERAL",
            Self::Parse(error) => error.error_code(),
            Self::Tactic(error) => error.error_code(),
            Self::Swap(error) => error.error_code(),
            Self::Skill(error) => error.error_code(),
        }
    }
}
