//! Battle phases and the strategy chosen for each.

use super::analysis::Assessment;
use super::config::PhaseThresholds;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    EarlyGame,
    Positioning,
    Combat,
    EndGame,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum StrategyKind {
    AggressiveDeployment,
    Positioning,
    Advance,
    Consolidate,
    Flank,
    Aggressive,
    Defensive,
    BalancedCombat,
    FinishHim,
    Survive,
}

/// Kinds of order the controller can try, in a strategy's preferred order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ActionCategory {
    Tactical,
    Skill,
    Movement,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Strategy {
    pub kind: StrategyKind,
    pub order: [ActionCategory; 3],
}

impl Strategy {
    pub fn select(assessment: &Assessment, thresholds: &PhaseThresholds) -> Self {
        use ActionCategory::{Movement as M, Skill as S, Tactical as T};

        let (kind, order) = match assessment.phase {
            Phase::EarlyGame if assessment.our_minions < thresholds.deployment_minions => {
                (StrategyKind::AggressiveDeployment, [T, M, S])
            }
            Phase::EarlyGame => (StrategyKind::Positioning, [M, T, S]),
            Phase::Positioning if assessment.distance > thresholds.advance_distance => {
                (StrategyKind::Advance, [M, T, S])
            }
            Phase::Positioning
                if assessment.our_spread > assessment.enemy_spread * thresholds.consolidate_spread =>
            {
                (StrategyKind::Consolidate, [T, M, S])
            }
            Phase::Positioning => (StrategyKind::Flank, [M, T, S]),
            Phase::Combat if assessment.urgency > thresholds.aggressive_urgency => {
                (StrategyKind::Aggressive, [S, T, M])
            }
            Phase::Combat if assessment.our_health < assessment.enemy_health => {
                (StrategyKind::Defensive, [T, S, M])
            }
            Phase::Combat => (StrategyKind::BalancedCombat, [S, T, M]),
            Phase::EndGame if assessment.our_health > assessment.enemy_health => {
                (StrategyKind::FinishHim, [S, M, T])
            }
            Phase::EndGame => (StrategyKind::Survive, [S, T, M]),
        };
        Self { kind, order }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::Position;

    fn assessment(phase: Phase) -> Assessment {
        Assessment {
            turn: 0,
            ours: Position::new(5, 10),
            theirs: Position::new(40, 10),
            our_health: 1.0,
            enemy_health: 1.0,
            our_max_hp: 100,
            our_hp: 100,
            our_minions: 10,
            enemy_minions: 10,
            distance: 35,
            our_spread: 4.0,
            enemy_spread: 4.0,
            urgency: 0,
            phase,
        }
    }

    #[test]
    fn early_game_deploys_when_short_of_minions() {
        let thresholds = PhaseThresholds::default();
        let mut early = assessment(Phase::EarlyGame);
        early.our_minions = 4;
        assert_eq!(
            Strategy::select(&early, &thresholds).kind,
            StrategyKind::AggressiveDeployment
        );
        early.our_minions = 5;
        let strategy = Strategy::select(&early, &thresholds);
        assert_eq!(strategy.kind, StrategyKind::Positioning);
        assert_eq!(strategy.order[0], ActionCategory::Movement);
    }

    #[test]
    fn positioning_prefers_advance_then_consolidation() {
        let thresholds = PhaseThresholds::default();
        let mut state = assessment(Phase::Positioning);
        assert_eq!(Strategy::select(&state, &thresholds).kind, StrategyKind::Advance);

        state.distance = 18;
        state.our_spread = 10.0;
        assert_eq!(Strategy::select(&state, &thresholds).kind, StrategyKind::Consolidate);

        state.our_spread = 4.0;
        assert_eq!(Strategy::select(&state, &thresholds).kind, StrategyKind::Flank);
    }

    #[test]
    fn combat_and_end_game_depend_on_health() {
        let thresholds = PhaseThresholds::default();
        let mut combat = assessment(Phase::Combat);
        combat.urgency = 61;
        assert_eq!(Strategy::select(&combat, &thresholds).kind, StrategyKind::Aggressive);
        combat.urgency = 20;
        combat.our_health = 0.5;
        assert_eq!(Strategy::select(&combat, &thresholds).kind, StrategyKind::Defensive);
        combat.our_health = 1.0;
        assert_eq!(Strategy::select(&combat, &thresholds).kind, StrategyKind::BalancedCombat);

        let mut end = assessment(Phase::EndGame);
        end.enemy_health = 0.2;
        assert_eq!(Strategy::select(&end, &thresholds).kind, StrategyKind::FinishHim);
        end.our_health = 0.1;
        assert_eq!(Strategy::select(&end, &thresholds).kind, StrategyKind::Survive);
    }
}
