//! Fixed per-turn orders, for tests and replays.

use std::collections::BTreeMap;

use async_trait::async_trait;
use skirmish_core::{Action, BattleState, ReplayLog, Side};
use tracing::warn;

use crate::api::{ActionProvider, Result};

/// Plays back a script of orders keyed by turn. Turns without an entry pass.
#[derive(Debug, Clone, Default)]
pub struct ScriptedProvider {
    script: BTreeMap<u64, Action>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an order for `turn`, replacing any earlier one.
    #[must_use]
    pub fn with(mut self, turn: u64, action: Action) -> Self {
        self.script.insert(turn, action);
        self
    }

    /// Parses `(turn, line)` pairs. Lines that do not parse are dropped with
    /// a warning, like any malformed order.
    pub fn from_lines<'a>(lines: impl IntoIterator<Item = (u64, &'a str)>) -> Self {
        let mut script = BTreeMap::new();
        for (turn, line) in lines {
            match line.parse::<Action>() {
                Ok(action) => {
                    script.insert(turn, action);
                }
                Err(error) => warn!(turn, line, %error, "dropping unparseable scripted order"),
            }
        }
        Self { script }
    }

    /// Every order `side` gave in a finished battle.
    pub fn from_log(log: &ReplayLog, side: Side) -> Self {
        let script = log
            .iter()
            .filter(|(_, actor, _)| *actor == side)
            .map(|(turn, _, action)| (turn, action))
            .collect();
        Self { script }
    }

    pub fn len(&self) -> usize {
        self.script.len()
    }

    pub fn is_empty(&self) -> bool {
        self.script.is_empty()
    }
}

#[async_trait]
impl ActionProvider for ScriptedProvider {
    async fn provide_action(&self, _side: Side, turn: u64, _state: &BattleState) -> Result<Option<Action>> {
        Ok(self.script.get(&turn).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::Battleground;

    #[tokio::test]
    async fn plays_back_by_turn() {
        let provider = ScriptedProvider::from_lines([(0, "tactic1"), (2, "flag 4 4"), (3, "nonsense")]);
        let state = BattleState::new(Battleground::bordered(8, 8));

        assert_eq!(provider.len(), 2);
        assert_eq!(
            provider.provide_action(Side::First, 0, &state).await.unwrap(),
            Some(Action::SelectTactic { index: 1 })
        );
        assert_eq!(provider.provide_action(Side::First, 1, &state).await.unwrap(), None);
        assert_eq!(
            provider.provide_action(Side::First, 2, &state).await.unwrap(),
            Some(Action::flag(4, 4))
        );
        assert_eq!(provider.provide_action(Side::First, 3, &state).await.unwrap(), None);
    }
}
