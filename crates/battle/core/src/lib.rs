//! Deterministic battle rules shared by every frontend.
//!
//! `skirmish-core` defines the board, the units and the turn loop, and
//! exposes pure APIs reused by the runtime, the content loaders and offline
//! tools. All state mutation during a battle flows through
//! [`engine::Battle`]; supporting crates depend on the types re-exported
//! here.
pub mod action;
pub mod area;
pub mod config;
pub mod engine;
pub mod error;
pub mod formation;
pub mod roster;
pub mod state;
pub mod tactic;

pub use action::{
    Action, ActionParseError, CommandError, CommandTransition, FlagCommand, HostError, KillCredit,
    MoveError, SkillCommand, SkillError, StatusApplication, Strike, SwapCommand, SwapError,
    TacticCommand, TacticError,
};
pub use area::{Area, Shape, Sieve};
pub use config::BattleConfig;
pub use engine::{Battle, BattleError, BattleSetup, Outcome, ReplayLog, TurnReport};
pub use error::{ErrorSeverity, GameError};
pub use formation::Formation;
pub use roster::GeneralSpec;
pub use state::{
    Armor, BattleState, Battleground, DamageType, Effect, EffectKind, Entity, EntityId,
    EntityKind, Fortress, General, GeneralRule, MapError, MinionPattern, OccupancyError,
    Placeable, Position, RebirthForm, Side, Skill, SkillCategory, SkillEffect, Status, StatusKind,
    Tile, Unit, UnitClass, UnitTemplate,
};
pub use tactic::{Tactic, TacticIntent};
