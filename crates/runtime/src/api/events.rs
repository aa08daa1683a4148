//! Events emitted during a battle for front-ends to observe.
//!
//! Consumers subscribe to [`BattleEvent`] to react to resolved turns without
//! blocking the worker loop.
use skirmish_core::{Outcome, TurnReport};

/// Events broadcast by the simulation worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BattleEvent {
    /// A turn was resolved.
    TurnResolved(TurnReport),
    /// The battle was decided. Sent once, after the final `TurnResolved`.
    Finished { outcome: Outcome, digest: [u8; 32] },
}
