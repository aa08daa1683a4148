//! Asynchronous abstraction for sourcing each side's orders.
//!
//! Runtime users plug in [`ActionProvider`] implementations so a battle can
//! run with AI policies, scripted fixtures, or a remote peer.
use async_trait::async_trait;
use skirmish_core::{Action, BattleState, Side};

use super::errors::Result;

/// Trait for providing one side's order for a turn.
///
/// Different implementations can handle:
/// - AI decisions
/// - Scripted/replayed orders
/// - A peer on the other end of a transport
/// - Testing fixtures
#[async_trait]
pub trait ActionProvider: Send + Sync {
    /// Provide `side`'s order for `turn`, or `None` to pass.
    ///
    /// # Arguments
    /// * `side` - The side that needs to act
    /// * `turn` - The turn the order is submitted for
    /// * `state` - Read-only snapshot of the battle at that turn
    async fn provide_action(&self, side: Side, turn: u64, state: &BattleState) -> Result<Option<Action>>;
}

/// A provider that never gives an order.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdleProvider;

#[async_trait]
impl ActionProvider for IdleProvider {
    async fn provide_action(&self, _side: Side, _turn: u64, _state: &BattleState) -> Result<Option<Action>> {
        Ok(None)
    }
}
