//! Turn message framing.
//!
//! ```text
//! D                    the sender passes this turn
//! <turn>#<action>      e.g. 12#flag 30 21
//! ```
//!
//! Delivery order and line framing belong to the transport.

use core::fmt;
use core::str::FromStr;

use skirmish_core::{Action, ActionParseError};
use thiserror::Error;

/// Message body for a side that passes.
pub const IDLE: &str = "D";
const SEPARATOR: char = '#';

/// One decoded turn message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Frame {
    Idle,
    Order { turn: u64, action: Action },
}

impl Frame {
    /// The order for `turn`, or `Idle` when there is none.
    pub fn for_turn(turn: u64, action: Option<Action>) -> Self {
        match action {
            Some(action) => Self::Order { turn, action },
            None => Self::Idle,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum WireError {
    #[error("empty message")]
    Empty,

    #[error("message {0:?} has no turn separator")]
    MissingSeparator(String),

    #[error("bad turn number {0:?}")]
    BadTurn(String),

    #[error(transparent)]
    Action(#[from] ActionParseError),
}

/// Encode `action` for `turn`.
pub fn encode(turn: u64, action: Option<&Action>) -> String {
    match action {
        Some(action) => format!("{turn}{SEPARATOR}{action}"),
        None => IDLE.to_string(),
    }
}

/// Decode one message.
pub fn decode(message: &str) -> Result<Frame, WireError> {
    message.parse()
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str(IDLE),
            Self::Order { turn, action } => write!(f, "{turn}{SEPARATOR}{action}"),
        }
    }
}

impl FromStr for Frame {
    type Err = WireError;

    fn from_str(message: &str) -> Result<Self, Self::Err> {
        let message = message.trim();
        if message.is_empty() {
            return Err(WireError::Empty);
        }
        if message == IDLE {
            return Ok(Self::Idle);
        }
        let (turn, line) = message
            .split_once(SEPARATOR)
            .ok_or_else(|| WireError::MissingSeparator(message.to_string()))?;
        let turn = turn
            .trim()
            .parse()
            .map_err(|_| WireError::BadTurn(turn.to_string()))?;
        let action = line.parse()?;
        Ok(Self::Order { turn, action })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_carry_their_turn() {
        let action = Action::flag(30, 21);
        assert_eq!(encode(12, Some(&action)), "12#flag 30 21");
        assert_eq!(
            decode("12#flag 30 21").unwrap(),
            Frame::Order { turn: 12, action }
        );
        assert_eq!(decode("4#tactic3\n").unwrap(), Frame::for_turn(4, Some(Action::SelectTactic { index: 3 })));
    }

    #[test]
    fn passing_is_a_bare_marker() {
        assert_eq!(encode(7, None), "D");
        assert_eq!(decode("D").unwrap(), Frame::Idle);
        assert_eq!(Frame::Idle.to_string(), "D");
    }

    #[test]
    fn malformed_messages_are_rejected() {
        assert_eq!(decode(""), Err(WireError::Empty));
        assert!(matches!(decode("flag 1 2"), Err(WireError::MissingSeparator(_))));
        assert!(matches!(decode("x#stop"), Err(WireError::BadTurn(_))));
        assert!(matches!(decode("3#jump"), Err(WireError::Action(_))));
    }
}
