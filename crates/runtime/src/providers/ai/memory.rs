//! What the controller remembers between decisions.

use std::collections::{BTreeMap, VecDeque};

use skirmish_core::{Action, Position};

use super::config::SpamRules;

/// Recent orders, flag positions, the adopted tactic and per-slot skill use.
///
/// Ages are counted in decisions, which keep increasing after the bounded
/// history stops growing.
#[derive(Clone, Debug, Default)]
pub struct AiMemory {
    actions: VecDeque<Action>,
    flags: VecDeque<Position>,
    skill_uses: BTreeMap<usize, u64>,
    last_movement_target: Option<Position>,
    current_tactic: Option<usize>,
    tactic_since: u64,
    decisions: u64,
}

impl AiMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent orders, oldest first.
    pub fn actions(&self) -> impl DoubleEndedIterator<Item = &Action> + ExactSizeIterator {
        self.actions.iter()
    }

    /// Most recent flag positions, oldest first.
    pub fn flags(&self) -> impl DoubleEndedIterator<Item = &Position> + ExactSizeIterator {
        self.flags.iter()
    }

    pub fn decisions(&self) -> u64 {
        self.decisions
    }

    pub fn current_tactic(&self) -> Option<usize> {
        self.current_tactic
    }

    /// Decisions since the current tactic was adopted.
    pub fn tactic_age(&self) -> u64 {
        self.decisions - self.tactic_since
    }

    pub fn last_movement_target(&self) -> Option<Position> {
        self.last_movement_target
    }

    pub(crate) fn set_movement_target(&mut self, target: Position) {
        self.last_movement_target = Some(target);
    }

    /// Whether skill slot `index` has rested at least `min` decisions.
    pub fn skill_rested(&self, index: usize, min: u64) -> bool {
        self.skill_uses
            .get(&index)
            .is_none_or(|&used| self.decisions - used >= min)
    }

    pub(crate) fn mark_skill(&mut self, index: usize) {
        self.skill_uses.insert(index, self.decisions);
    }

    /// Whether `action` was issued within the last `window` orders.
    pub fn issued_recently(&self, action: &Action, window: usize) -> bool {
        self.recent(window).any(|issued| issued == action)
    }

    fn recent(&self, window: usize) -> impl Iterator<Item = &Action> {
        self.actions.iter().rev().take(window)
    }

    fn recent_flags(&self, window: usize) -> impl Iterator<Item = &Position> {
        self.flags.iter().rev().take(window)
    }

    /// Whether issuing `action` now would repeat recent orders too closely.
    pub fn is_spam(&self, action: &Action, rules: &SpamRules) -> bool {
        let repeats = self.recent(rules.repeat_window).filter(|issued| *issued == action).count();
        match *action {
            Action::PlaceFlag { target } => {
                self.recent_flags(rules.exact_flag_window).any(|&flag| flag == target)
                    || self
                        .recent_flags(rules.near_flag_window)
                        .any(|&flag| flag.chebyshev(target) <= rules.near_flag_radius)
                    || self.recent(rules.flag_window).filter(|issued| issued.is_flag()).count()
                        >= rules.max_flags
                    || repeats >= rules.max_flag_repeats
            }
            Action::UseSkill { .. } => repeats >= rules.max_skill_repeats,
            Action::SelectTactic { .. } => repeats >= rules.max_tactic_repeats,
            Action::Stop | Action::Swap { .. } => false,
        }
    }

    /// Commits an issued order.
    pub(crate) fn record(&mut self, action: Action, rules: &SpamRules) {
        self.decisions += 1;
        push_bounded(&mut self.actions, action, rules.history);
        match action {
            Action::PlaceFlag { target } => push_bounded(&mut self.flags, target, rules.flag_history),
            Action::SelectTactic { index } if self.current_tactic != Some(index) => {
                self.current_tactic = Some(index);
                self.tactic_since = self.decisions;
            }
            _ => {}
        }
    }
}

fn push_bounded<T>(queue: &mut VecDeque<T>, item: T, capacity: usize) {
    queue.push_back(item);
    while queue.len() > capacity {
        queue.pop_front();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remember(actions: &[Action]) -> AiMemory {
        let mut memory = AiMemory::new();
        for &action in actions {
            memory.record(action, &SpamRules::default());
        }
        memory
    }

    #[test]
    fn history_is_bounded() {
        let rules = SpamRules::default();
        let memory = remember(&vec![Action::Stop; 40]);
        assert_eq!(memory.actions().len(), rules.history);
        assert_eq!(memory.decisions(), 40);
    }

    #[test]
    fn second_flag_in_the_window_is_spam() {
        let rules = SpamRules::default();
        let memory = remember(&[Action::flag(10, 10)]);
        assert!(!memory.is_spam(&Action::flag(30, 30), &rules));
        let memory = remember(&[Action::flag(10, 10), Action::flag(40, 5)]);
        assert!(memory.is_spam(&Action::flag(30, 30), &rules));
    }

    #[test]
    fn flags_near_recent_ones_are_spam() {
        let rules = SpamRules::default();
        let memory = remember(&[Action::flag(10, 10)]);
        assert!(memory.is_spam(&Action::flag(12, 8), &rules));
        assert!(memory.is_spam(&Action::flag(10, 10), &rules));
        assert!(!memory.is_spam(&Action::flag(13, 10), &rules));
    }

    #[test]
    fn repeated_tactics_and_skills_are_capped() {
        let rules = SpamRules::default();
        let tactic = Action::SelectTactic { index: 3 };
        assert!(!remember(&[tactic, tactic]).is_spam(&tactic, &rules));
        assert!(remember(&[tactic, tactic, tactic]).is_spam(&tactic, &rules));

        let skill = Action::skill(1, 4, 4);
        assert!(!remember(&[skill; 3]).is_spam(&skill, &rules));
        assert!(remember(&[skill; 4]).is_spam(&skill, &rules));
        assert!(!remember(&[skill; 4]).is_spam(&Action::skill(1, 5, 4), &rules));
    }

    #[test]
    fn tactic_age_counts_decisions_past_the_history_cap() {
        let mut memory = remember(&[Action::SelectTactic { index: 2 }]);
        assert_eq!(memory.current_tactic(), Some(2));
        assert_eq!(memory.tactic_age(), 0);
        for _ in 0..50 {
            memory.record(Action::Stop, &SpamRules::default());
        }
        assert_eq!(memory.tactic_age(), 50);

        // Re-issuing the same tactic does not restart the clock.
        memory.record(Action::SelectTactic { index: 2 }, &SpamRules::default());
        assert_eq!(memory.tactic_age(), 51);
    }

    #[test]
    fn skill_slots_rest_between_uses() {
        let mut memory = AiMemory::new();
        assert!(memory.skill_rested(0, 2));
        memory.mark_skill(0);
        memory.record(Action::skill(0, 1, 1), &SpamRules::default());
        assert!(!memory.skill_rested(0, 2));
        assert!(memory.skill_rested(1, 2));
        memory.record(Action::Stop, &SpamRules::default());
        assert!(memory.skill_rested(0, 2));
    }
}
