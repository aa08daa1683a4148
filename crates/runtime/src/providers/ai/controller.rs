//! The per-general decision loop.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use skirmish_core::{Action, BattleState, Position, Side};
use tracing::debug;

use super::analysis::{Assessment, Battlefield};
use super::config::AiConfig;
use super::memory::AiMemory;
use super::positions;
use super::strategy::{ActionCategory, Phase, Strategy, StrategyKind};
use super::targeting;

/// Which stage of the decision produced an order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum DecisionSource {
    /// The strategy's own preference order.
    Strategy,
    /// The resource-aware fallback chain.
    Fallback,
    /// A single step next to our general.
    Emergency,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decision {
    pub action: Action,
    pub source: DecisionSource,
    pub phase: Phase,
    pub strategy: StrategyKind,
}

/// Drives one side's general.
///
/// Every call to [`decide_action`](Self::decide_action) yields an order as
/// long as the general is on the board; the randomness behind it comes from
/// the seeded generator, so equal seeds and equal states give equal orders.
pub struct AiController {
    side: Side,
    config: AiConfig,
    memory: AiMemory,
    rng: StdRng,
}

impl AiController {
    // Thresholds the strategy branches compare against.
    const STRIKE_DISTANCE: i32 = 12;
    const DEFEND_HEALTH: f32 = 0.7;
    const FALLBACK_DEPLOY_TURNS: u64 = 30;
    const FALLBACK_ADVANCE_TURNS: u64 = 60;

    pub fn new(side: Side, config: AiConfig, seed: u64) -> Self {
        Self {
            side,
            config,
            memory: AiMemory::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    pub fn memory(&self) -> &AiMemory {
        &self.memory
    }

    /// Picks the order for `turn`. `None` only when our general is not on
    /// the board.
    pub fn decide_action(&mut self, state: &BattleState, turn: u64) -> Option<Decision> {
        let field = Battlefield::new(state, self.side)?;
        let assessment = Assessment::new(&field, turn, &self.config.phases);
        let strategy = Strategy::select(&assessment, &self.config.phases);

        let (action, source) = if let Some(action) = self.follow(&field, &assessment, strategy) {
            (action, DecisionSource::Strategy)
        } else if let Some(action) = self.fallback(&field, &assessment) {
            (action, DecisionSource::Fallback)
        } else {
            (self.emergency(&field), DecisionSource::Emergency)
        };

        self.memory.record(action, &self.config.spam);
        debug!(
            side = %self.side,
            turn,
            phase = %assessment.phase,
            strategy = %strategy.kind,
            urgency = assessment.urgency,
            %source,
            %action,
            "ai decided"
        );
        Some(Decision {
            action,
            source,
            phase: assessment.phase,
            strategy: strategy.kind,
        })
    }

    fn follow(&mut self, field: &Battlefield<'_>, assessment: &Assessment, strategy: Strategy) -> Option<Action> {
        strategy.order.into_iter().find_map(|category| match category {
            ActionCategory::Tactical => self.try_tactic(field, assessment, strategy.kind),
            ActionCategory::Skill => self.try_skill(field, assessment, strategy.kind),
            ActionCategory::Movement => self.try_movement(field, strategy.kind),
        })
    }

    fn is_spam(&self, action: &Action) -> bool {
        self.memory.is_spam(action, &self.config.spam)
    }

    // ========================================================================
    // Tactics
    // ========================================================================

    fn try_tactic(&self, field: &Battlefield<'_>, assessment: &Assessment, kind: StrategyKind) -> Option<Action> {
        let persistence = &self.config.persistence;
        let current = self.memory.current_tactic();
        let age = self.memory.tactic_age();
        if current.is_some() && age < persistence.min_decisions {
            return None;
        }
        let force = current.is_some() && age >= persistence.max_decisions;
        let available = field.commander.tactics.len();

        let preferred = match kind {
            StrategyKind::Aggressive | StrategyKind::FinishHim if assessment.distance < Self::STRIKE_DISTANCE => Some(5),
            StrategyKind::Defensive if assessment.our_health < Self::DEFEND_HEALTH => Some(6),
            StrategyKind::Consolidate => Some(4),
            StrategyKind::AggressiveDeployment => Some(3),
            _ => None,
        };
        if let Some(index) = preferred.filter(|&index| index < available)
            && let Some(action) = self.offer_tactic(index, force)
        {
            return Some(action);
        }

        if assessment.urgency >= self.config.personality.tactical_threshold
            && let Some(index) = tactic_for(assessment).filter(|&index| index < available)
        {
            return self.offer_tactic(index, force);
        }
        None
    }

    fn offer_tactic(&self, index: usize, force: bool) -> Option<Action> {
        let action = Action::SelectTactic { index };
        let fresh = force || self.memory.current_tactic() != Some(index);
        (fresh && !self.is_spam(&action)).then_some(action)
    }

    // ========================================================================
    // Skills
    // ========================================================================

    fn try_skill(&mut self, field: &Battlefield<'_>, assessment: &Assessment, kind: StrategyKind) -> Option<Action> {
        let personality = &self.config.personality;
        let current = self.memory.current_tactic();
        let mut best: Option<(usize, Action, f32)> = None;

        for (index, skill) in field.commander.ready_skills() {
            let appraisal = targeting::appraise(field, assessment, skill, &mut self.rng);
            if !appraisal.worthwhile {
                continue;
            }
            let adjusted = appraisal.priority
                * self.config.strategy_weights.multiplier(kind, skill.category)
                * self.config.synergy(current, skill.category);
            if adjusted < personality.min_skill_priority {
                continue;
            }
            let Some((target, score)) = targeting::skill_target(field, skill, &mut self.rng) else {
                continue;
            };
            let action = Action::skill(index, target.x, target.y);
            if self.memory.is_spam(&action, &self.config.spam)
                || !self.memory.skill_rested(index, personality.skill_cooldown_min)
            {
                continue;
            }
            let total = adjusted + score;
            if total > best.map_or(0.0, |(_, _, best)| best) {
                best = Some((index, action, total));
            }
        }

        let (index, action, score) = best?;
        if score > personality.min_skill_priority && self.rng.r#gen::<f64>() > personality.move_vs_skill_chance {
            self.memory.mark_skill(index);
            return Some(action);
        }
        None
    }

    // ========================================================================
    // Movement
    // ========================================================================

    fn try_movement(&mut self, field: &Battlefield<'_>, kind: StrategyKind) -> Option<Action> {
        let here = field.position();
        if let Some(target) = positions::skill_position(field)
            && let Some(action) = self.offer_flag(target)
        {
            return Some(action);
        }

        let target = match kind {
            StrategyKind::Flank => positions::flanking_position(field),
            StrategyKind::Survive => Some(positions::retreat_position(field, &mut self.rng)),
            _ => positions::advance_position(field, &self.memory, &mut self.rng),
        }?;
        let target = if self.memory.last_movement_target() == Some(target) {
            positions::alternative_target(field, target, &mut self.rng)
        } else {
            target
        };

        if target.manhattan(here) > 2 {
            return self.offer_flag(target);
        }
        None
    }

    fn offer_flag(&mut self, target: Position) -> Option<Action> {
        let action = Action::flag(target.x, target.y);
        if self.is_spam(&action) {
            return None;
        }
        self.memory.set_movement_target(target);
        Some(action)
    }

    // ========================================================================
    // Fallbacks
    // ========================================================================

    fn fallback(&mut self, field: &Battlefield<'_>, assessment: &Assessment) -> Option<Action> {
        self.valuable_skill(field, assessment)
            .or_else(|| self.phase_tactic(field, assessment))
            .or_else(|| self.strategic_movement(field))
    }

    fn valuable_skill(&mut self, field: &Battlefield<'_>, assessment: &Assessment) -> Option<Action> {
        let personality = &self.config.personality;
        let floor = personality.min_skill_priority * personality.fallback_skill_factor;
        for (index, skill) in field.commander.ready_skills() {
            if !self.memory.skill_rested(index, personality.skill_cooldown_min) {
                continue;
            }
            if targeting::appraise(field, assessment, skill, &mut self.rng).priority < floor {
                continue;
            }
            if let Some((target, score)) = targeting::skill_target(field, skill, &mut self.rng)
                && score > 0.0
            {
                let action = Action::skill(index, target.x, target.y);
                if !self.memory.is_spam(&action, &self.config.spam) {
                    return Some(action);
                }
            }
        }
        None
    }

    fn phase_tactic(&self, field: &Battlefield<'_>, assessment: &Assessment) -> Option<Action> {
        let available = field.commander.tactics.len();
        let (index, window) = match assessment.phase {
            Phase::EarlyGame
                if assessment.turn < Self::FALLBACK_DEPLOY_TURNS
                    && assessment.our_minions >= 3
                    && available > 3 =>
            {
                (3, 10)
            }
            Phase::Combat if assessment.distance < 20 && available > 5 => (5, 15),
            Phase::Positioning
                if assessment.turn > Self::FALLBACK_ADVANCE_TURNS
                    && assessment.distance > 15
                    && available > 1 =>
            {
                (1, 20)
            }
            _ => return None,
        };
        let action = Action::SelectTactic { index };
        (!self.memory.issued_recently(&action, window) && !self.is_spam(&action)).then_some(action)
    }

    fn strategic_movement(&mut self, field: &Battlefield<'_>) -> Option<Action> {
        let here = field.position();
        if let Some(target) = positions::advance_position(field, &self.memory, &mut self.rng)
            && target.manhattan(here) >= 3
            && let Some(action) = self.unspammed_flag(target)
        {
            return Some(action);
        }
        if let Some(target) = positions::flanking_position(field)
            && target.manhattan(here) >= 2
            && let Some(action) = self.unspammed_flag(target)
        {
            return Some(action);
        }
        positions::spread_out_positions(field, &self.memory)
            .into_iter()
            .find_map(|target| self.unspammed_flag(target))
    }

    fn unspammed_flag(&self, target: Position) -> Option<Action> {
        let action = Action::flag(target.x, target.y);
        (!self.is_spam(&action)).then_some(action)
    }

    /// One step next to our general, toward the enemy. When every step
    /// would break the spam rules it holds with `stop` instead of moving
    /// anyway: no spammed flag is ever issued.
    fn emergency(&self, field: &Battlefield<'_>) -> Action {
        positions::neighbour_steps(field)
            .into_iter()
            .filter_map(|step| Some((step, self.unspammed_flag(step)?)))
            .min_by_key(|(step, _)| field.distance_to_enemy(*step))
            .map_or(Action::Stop, |(_, action)| action)
    }
}

/// Generic tactic pick by numbers and pressure.
fn tactic_for(assessment: &Assessment) -> Option<usize> {
    if assessment.our_minions < 3 {
        return None;
    }
    if assessment.urgency > 50 {
        Some(5)
    } else if assessment.our_minions as f32 > assessment.enemy_minions as f32 * 1.2 && assessment.distance < 15 {
        Some(1)
    } else if (assessment.our_hp as f32) < assessment.our_max_hp as f32 * 0.6 {
        Some(6)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::roster::default_general;
    use skirmish_core::{Battle, BattleSetup, Battleground};

    fn battle_with_minions(count: i32) -> Battle {
        let mut setup = BattleSetup::default();
        for side in Side::PLAYERS {
            let mut spec = default_general(side);
            spec.starting_minions = count;
            setup = setup.with_roster(side, vec![spec]);
        }
        Battle::new(setup).expect("valid setup")
    }

    #[test]
    fn early_game_without_an_army_deploys() {
        let battle = battle_with_minions(4);
        let mut ai = AiController::new(Side::First, AiConfig::default(), 11);

        let decision = ai.decide_action(battle.state(), 0).expect("general is on the board");
        assert_eq!(decision.phase, Phase::EarlyGame);
        assert_eq!(decision.strategy, StrategyKind::AggressiveDeployment);
        assert_eq!(decision.action, Action::SelectTactic { index: 3 });
        assert_eq!(decision.source, DecisionSource::Strategy);
        assert_eq!(ai.memory().current_tactic(), Some(3));
    }

    #[test]
    fn no_general_no_decision() {
        let state = BattleState::new(Battleground::bordered(20, 20));
        let mut ai = AiController::new(Side::Second, AiConfig::default(), 0);
        assert_eq!(ai.decide_action(&state, 0), None);
    }

    #[test]
    fn equal_seeds_decide_alike() {
        let battle = battle_with_minions(12);
        let mut left = AiController::new(Side::Second, AiConfig::default(), 99);
        let mut right = AiController::new(Side::Second, AiConfig::default(), 99);
        for turn in 0..40 {
            assert_eq!(
                left.decide_action(battle.state(), turn),
                right.decide_action(battle.state(), turn)
            );
        }
    }

    #[test]
    fn repeated_decisions_avoid_spam() {
        let battle = battle_with_minions(12);
        let mut ai = AiController::new(Side::First, AiConfig::default(), 5);
        for turn in 0..60 {
            let before = ai.memory().clone();
            let decision = ai.decide_action(battle.state(), turn).expect("general is on the board");
            assert!(
                !before.is_spam(&decision.action, &ai.config().spam),
                "turn {turn}: {} repeats recent orders",
                decision.action
            );
        }
    }

    #[test]
    fn emergency_steps_toward_the_enemy_or_holds() {
        let battle = battle_with_minions(4);
        let mut ai = AiController::new(Side::First, AiConfig::default(), 3);
        let field = Battlefield::new(battle.state(), Side::First).expect("general is on the board");
        let ours = field.position();

        let Action::PlaceFlag { target } = ai.emergency(&field) else {
            panic!("a free neighbour step exists");
        };
        assert_eq!(target.chebyshev(ours), 1);

        let rules = ai.config().spam.clone();
        for _ in 0..rules.max_flags {
            ai.memory.record(Action::flag(1, 1), &rules);
        }
        for step in positions::neighbour_steps(&field) {
            assert!(ai.is_spam(&Action::flag(step.x, step.y)));
        }
        assert_eq!(ai.emergency(&field), Action::Stop);
    }

    #[test]
    fn tactic_evaluator_respects_minion_floor() {
        let mut assessment = Assessment {
            turn: 100,
            ours: Position::new(5, 5),
            theirs: Position::new(10, 5),
            our_hp: 100,
            our_max_hp: 300,
            our_health: 0.33,
            enemy_health: 1.0,
            our_minions: 2,
            enemy_minions: 10,
            distance: 5,
            our_spread: 0.0,
            enemy_spread: 0.0,
            urgency: 90,
            phase: Phase::Combat,
        };
        assert_eq!(tactic_for(&assessment), None);
        assessment.our_minions = 5;
        assert_eq!(tactic_for(&assessment), Some(5));
        assessment.urgency = 10;
        assert_eq!(tactic_for(&assessment), Some(6));
    }
}
