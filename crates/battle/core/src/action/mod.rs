//! Everything that mutates a [`BattleState`].
//!
//! # Module Structure
//!
//! - `command`: the action grammar and the typed commands it decodes into
//! - `error`: command errors (`ActionParseError`, `SkillError`, `SwapError`, ...)
//! - `movement`: steps, push chains, teleports, board placement
//! - `combat`: strikes, death, kill credit, adjacency scans
//! - `status`: attach / refresh / tick / end of timed modifiers
//! - `effect`: transient board effects (arrows, waves, flags, ...)
//! - `skill`: skill resolution per tile
//! - `minion`, `general`: per-tick behavior of units
//! - `fortress`: fortress construction and hosting
//!
//! Every helper here treats a failed precondition as an ordinary outcome:
//! it returns `false`, `None` or an `Err` and leaves the state consistent.

pub mod combat;
pub mod command;
pub mod effect;
pub mod error;
pub mod fortress;
pub mod general;
pub mod minion;
pub mod movement;
pub mod skill;
pub mod status;

pub use combat::{KillCredit, Strike};
pub use command::{Action, FlagCommand, SkillCommand, SwapCommand, TacticCommand};
pub use error::{ActionParseError, CommandError, HostError, SkillError, SwapError, TacticError};
pub use movement::MoveError;
pub use status::StatusApplication;

use crate::state::{BattleState, EntityId};

/// Defines how a decoded command mutates the battle.
pub trait CommandTransition {
    type Error;
    type Result;

    /// General issuing the command.
    fn general(&self) -> EntityId;

    /// Validates pre-conditions using the state **before** mutation.
    fn pre_validate(&self, _state: &BattleState) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Applies the command by mutating the state directly.
    fn apply(&self, state: &mut BattleState) -> Result<Self::Result, Self::Error>;

    /// Validates post-conditions using the state **after** mutation.
    fn post_validate(&self, _state: &BattleState) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Runs the three phases in order.
    fn execute(&self, state: &mut BattleState) -> Result<Self::Result, Self::Error> {
        self.pre_validate(state)?;
        let result = self.apply(state)?;
        self.post_validate(state)?;
        Ok(result)
    }
}
