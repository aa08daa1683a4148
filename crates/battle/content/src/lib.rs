//! Data-driven battle content and its loaders.
//!
//! - Arena layouts (plain-text map files)
//! - Battle rules (TOML)
//! - General rosters (RON)
//!
//! Content is read once at startup and turned into a
//! [`skirmish_core::BattleSetup`]; none of it is consulted mid-battle.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    ConfigLoader, ContentFactory, Faction, GeneralEntry, LoadResult, MapLoader, RosterFile,
    RosterLoader, SkillEntry,
};
