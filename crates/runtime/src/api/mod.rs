//! Public runtime API surface.
//!
//! This module gathers the types exposed to consumers of the runtime crate so
//! other layers can stay focused on orchestration, workers, or transports.

pub mod errors;
pub mod events;
pub mod handle;
pub mod providers;

pub use errors::{Result, RuntimeError};
pub use events::BattleEvent;
pub use handle::{BattleSnapshot, RuntimeHandle};
pub use providers::{ActionProvider, IdleProvider};
