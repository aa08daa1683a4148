use std::collections::BTreeMap;

use crate::action::Action;
use crate::state::Side;

/// Every action a battle accepted, keyed by the turn it was submitted for.
///
/// Feeding the log back through [`Battle::replay`](super::Battle::replay)
/// with the same setup reproduces the battle exactly.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReplayLog {
    entries: BTreeMap<u64, [Option<Action>; 2]>,
    /// Turn the battle had reached when the log was taken.
    pub final_turn: u64,
}

impl ReplayLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, turn: u64, slot: usize, action: Action) {
        self.entries.entry(turn).or_default()[slot] = Some(action);
    }

    /// Actions recorded for `turn`, indexed by side.
    pub fn actions_for(&self, turn: u64) -> [Option<Action>; 2] {
        self.entries.get(&turn).copied().unwrap_or_default()
    }

    /// Recorded `(turn, side, action)` triples in turn order, first side first.
    pub fn iter(&self) -> impl Iterator<Item = (u64, Side, Action)> + '_ {
        self.entries.iter().flat_map(|(turn, actions)| {
            actions
                .iter()
                .enumerate()
                .filter_map(move |(slot, action)| {
                    action.map(|action| (*turn, Side::from_index(slot), action))
                })
        })
    }

    /// Number of recorded actions.
    pub fn len(&self) -> usize {
        self.entries
            .values()
            .map(|actions| actions.iter().flatten().count())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_by_turn_and_side() {
        let mut log = ReplayLog::new();
        log.record(4, 1, Action::Stop);
        log.record(2, 0, Action::flag(3, 3));
        log.record(2, 1, Action::SelectTactic { index: 2 });

        assert_eq!(log.len(), 3);
        assert_eq!(log.actions_for(2), [Some(Action::flag(3, 3)), Some(Action::SelectTactic { index: 2 })]);
        assert_eq!(log.actions_for(3), [None, None]);

        let order: Vec<(u64, Side)> = log.iter().map(|(turn, side, _)| (turn, side)).collect();
        assert_eq!(order, vec![(2, Side::First), (2, Side::Second), (4, Side::Second)]);
    }
}
