//! Per-side orders: the text grammar and the typed commands it decodes into.
//!
//! Lines are decoded into [`Action`] at the boundary; resolution only ever
//! sees the typed form.
//!
//! ```text
//! stop
//! flag <x> <y>            flag (<x>,<y>) is accepted too; -1 -1 clears
//! tactic<N>
//! swap<N>
//! skill<N> <x> <y>        skill<N> (<x>,<y>) is accepted too
//! ```

use core::fmt;
use core::str::FromStr;

use crate::state::{BattleState, EntityId, Position, Side};

use super::error::{ActionParseError, CommandError};
use super::{CommandTransition, general};

// ============================================================================
// Action
// ============================================================================

/// One decoded order for a side's general.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Action {
    /// Clears the flag.
    Stop,
    PlaceFlag { target: Position },
    SelectTactic { index: usize },
    Swap { index: usize },
    UseSkill { index: usize, target: Position },
}

impl Action {
    pub const fn flag(x: i32, y: i32) -> Self {
        Self::PlaceFlag {
            target: Position::new(x, y),
        }
    }

    pub const fn skill(index: usize, x: i32, y: i32) -> Self {
        Self::UseSkill {
            index,
            target: Position::new(x, y),
        }
    }

    pub fn is_flag(&self) -> bool {
        matches!(self, Self::PlaceFlag { .. })
    }

    /// Resolves the order for `side` through its command type.
    pub fn execute(self, state: &mut BattleState, side: Side) -> Result<(), CommandError> {
        let general = state.general_id(side).ok_or(CommandError::NoGeneral(side))?;
        match self {
            Self::Stop => FlagCommand {
                general,
                target: Position::NOWHERE,
            }
            .execute(state),
            Self::PlaceFlag { target } => FlagCommand { general, target }.execute(state),
            Self::SelectTactic { index } => TacticCommand { general, index }.execute(state),
            Self::Swap { index } => SwapCommand {
                general,
                side,
                index,
            }
            .execute(state),
            Self::UseSkill { index, target } => SkillCommand {
                general,
                index,
                target,
            }
            .execute(state),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stop => f.write_str("stop"),
            Self::PlaceFlag { target } => write!(f, "flag {} {}", target.x, target.y),
            Self::SelectTactic { index } => write!(f, "tactic{index}"),
            Self::Swap { index } => write!(f, "swap{index}"),
            Self::UseSkill { index, target } => write!(f, "skill{index} {} {}", target.x, target.y),
        }
    }
}

impl FromStr for Action {
    type Err = ActionParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        if line.is_empty() {
            return Err(ActionParseError::Empty);
        }
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };

        if head == "stop" {
            no_trailing(rest)?;
            return Ok(Self::Stop);
        }
        if head == "flag" {
            let target = coordinates("flag", rest)?;
            return Ok(Self::PlaceFlag { target });
        }
        if let Some(digits) = head.strip_prefix("tactic") {
            let index = index("tactic", digits)?;
            no_trailing(rest)?;
            return Ok(Self::SelectTactic { index });
        }
        if let Some(digits) = head.strip_prefix("swap") {
            let index = index("swap", digits)?;
            no_trailing(rest)?;
            return Ok(Self::Swap { index });
        }
        if let Some(digits) = head.strip_prefix("skill") {
            let index = index("skill", digits)?;
            let target = coordinates("skill", rest)?;
            return Ok(Self::UseSkill { index, target });
        }
        Err(ActionParseError::UnknownCommand(head.to_string()))
    }
}

fn no_trailing(rest: &str) -> Result<(), ActionParseError> {
    if rest.is_empty() {
        Ok(())
    } else {
        Err(ActionParseError::TrailingInput(rest.to_string()))
    }
}

fn index(command: &str, digits: &str) -> Result<usize, ActionParseError> {
    if digits.is_empty() {
        return Err(ActionParseError::MissingIndex {
            command: command.to_string(),
        });
    }
    digits.parse().map_err(|_| ActionParseError::InvalidIndex {
        command: command.to_string(),
        value: digits.to_string(),
    })
}

/// Reads `x y` or `(x,y)`.
fn coordinates(command: &str, text: &str) -> Result<Position, ActionParseError> {
    let inner = text
        .strip_prefix('(')
        .and_then(|text| text.strip_suffix(')'))
        .unwrap_or(text);
    let mut parts = inner
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty());

    let mut next = || -> Result<i32, ActionParseError> {
        let part = parts
            .next()
            .ok_or_else(|| ActionParseError::MissingCoordinates {
                command: command.to_string(),
            })?;
        part.parse().map_err(|_| ActionParseError::InvalidCoordinate {
            command: command.to_string(),
            value: part.to_string(),
        })
    };
    let x = next()?;
    let y = next()?;

    let extra: Vec<&str> = parts.collect();
    if !extra.is_empty() {
        return Err(ActionParseError::TrailingInput(extra.join(" ")));
    }
    Ok(Position::new(x, y))
}

// ============================================================================
// Commands
// ============================================================================

/// Moves (or, off the grid, clears) a general's flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlagCommand {
    pub general: EntityId,
    pub target: Position,
}

impl CommandTransition for FlagCommand {
    type Error = CommandError;
    type Result = ();

    fn general(&self) -> EntityId {
        self.general
    }

    fn apply(&self, state: &mut BattleState) -> Result<(), CommandError> {
        general::place_flag(state, self.general, self.target);
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TacticCommand {
    pub general: EntityId,
    pub index: usize,
}

impl CommandTransition for TacticCommand {
    type Error = CommandError;
    type Result = ();

    fn general(&self) -> EntityId {
        self.general
    }

    fn apply(&self, state: &mut BattleState) -> Result<(), CommandError> {
        general::command_tactic(state, self.general, self.index)?;
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwapCommand {
    /// General being benched.
    pub general: EntityId,
    pub side: Side,
    pub index: usize,
}

impl CommandTransition for SwapCommand {
    type Error = CommandError;
    type Result = ();

    fn general(&self) -> EntityId {
        self.general
    }

    fn pre_validate(&self, state: &BattleState) -> Result<(), CommandError> {
        if state.general_id(self.side) == Some(self.general) {
            Ok(())
        } else {
            Err(CommandError::NoGeneral(self.side))
        }
    }

    fn apply(&self, state: &mut BattleState) -> Result<(), CommandError> {
        general::swap(state, self.side, self.index)?;
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SkillCommand {
    pub general: EntityId,
    pub index: usize,
    pub target: Position,
}

impl CommandTransition for SkillCommand {
    type Error = CommandError;
    type Result = ();

    fn general(&self) -> EntityId {
        self.general
    }

    fn apply(&self, state: &mut BattleState) -> Result<(), CommandError> {
        general::use_skill(state, self.general, self.index, self.target)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_command() {
        assert_eq!("stop".parse(), Ok(Action::Stop));
        assert_eq!("flag 12 -3".parse(), Ok(Action::flag(12, -3)));
        assert_eq!("flag (4,5)\n".parse(), Ok(Action::flag(4, 5)));
        assert_eq!("tactic3".parse(), Ok(Action::SelectTactic { index: 3 }));
        assert_eq!("swap0".parse(), Ok(Action::Swap { index: 0 }));
        assert_eq!("skill2 7 8".parse(), Ok(Action::skill(2, 7, 8)));
        assert_eq!("skill1 (7,8)".parse(), Ok(Action::skill(1, 7, 8)));
    }

    #[test]
    fn display_matches_the_grammar() {
        for line in ["stop", "flag -1 -1", "tactic6", "swap1", "skill4 30 21"] {
            let action: Action = line.parse().unwrap();
            assert_eq!(action.to_string(), line);
        }
    }

    #[test]
    fn malformed_lines_are_rejected() {
        assert_eq!("".parse::<Action>(), Err(ActionParseError::Empty));
        assert_eq!(
            "dance".parse::<Action>(),
            Err(ActionParseError::UnknownCommand("dance".into()))
        );
        assert_eq!(
            "tactic".parse::<Action>(),
            Err(ActionParseError::MissingIndex {
                command: "tactic".into()
            })
        );
        assert_eq!(
            "swapx".parse::<Action>(),
            Err(ActionParseError::InvalidIndex {
                command: "swap".into(),
                value: "x".into()
            })
        );
        assert_eq!(
            "flag 3".parse::<Action>(),
            Err(ActionParseError::MissingCoordinates {
                command: "flag".into()
            })
        );
        assert_eq!(
            "skill1 a 2".parse::<Action>(),
            Err(ActionParseError::InvalidCoordinate {
                command: "skill".into(),
                value: "a".into()
            })
        );
        assert_eq!(
            "stop now".parse::<Action>(),
            Err(ActionParseError::TrailingInput("now".into()))
        );
    }
}
