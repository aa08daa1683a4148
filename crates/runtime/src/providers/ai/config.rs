//! Tuning knobs of the AI controller, loadable from the `[ai]` table of
//! `battle.toml`.
//!
//! Every default matches the behavior the controller was balanced around.

use serde::{Deserialize, Serialize};
use skirmish_core::{SkillCategory, Tactic};

use super::strategy::StrategyKind;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub personality: Personality,
    pub phases: PhaseThresholds,
    pub spam: SpamRules,
    pub persistence: TacticPersistence,
    pub strategy_weights: StrategyWeights,
    /// Skill multipliers per active tactic, indexed like `tacticN`.
    pub synergy: Vec<CategoryWeights>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            personality: Personality::default(),
            phases: PhaseThresholds::default(),
            spam: SpamRules::default(),
            persistence: TacticPersistence::default(),
            strategy_weights: StrategyWeights::default(),
            synergy: CategoryWeights::default_table(),
        }
    }
}

impl AiConfig {
    /// Multiplier for a skill of `category` while `tactic` is active.
    pub fn synergy(&self, tactic: Option<usize>, category: SkillCategory) -> f32 {
        tactic
            .and_then(|index| self.synergy.get(index))
            .map_or(1.0, |weights| weights.get(category))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Personality {
    /// Floor a skill's adjusted priority must reach to be considered.
    pub min_skill_priority: f32,
    /// Urgency needed before the generic tactic evaluator may issue orders.
    pub tactical_threshold: i32,
    /// A qualifying skill fires only when a uniform roll exceeds this.
    pub move_vs_skill_chance: f64,
    /// Decisions that must pass between two uses of the same skill slot.
    pub skill_cooldown_min: u64,
    /// Scales `min_skill_priority` for the fallback skill pass.
    pub fallback_skill_factor: f32,
}

impl Default for Personality {
    fn default() -> Self {
        Self {
            min_skill_priority: 20.0,
            tactical_threshold: 30,
            move_vs_skill_chance: 0.6,
            skill_cooldown_min: 2,
            fallback_skill_factor: 0.7,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseThresholds {
    /// Turns before this one are early game.
    pub early_game_turns: u64,
    /// Either general below this health ratio means end game.
    pub end_game_health: f32,
    /// Generals closer than this are in combat.
    pub combat_distance: i32,
    /// Early game with fewer minions than this deploys aggressively.
    pub deployment_minions: usize,
    /// Positioning farther than this advances.
    pub advance_distance: i32,
    /// Positioning consolidates when our spread exceeds the enemy's by this factor.
    pub consolidate_spread: f32,
    /// Combat urgency above this turns aggressive.
    pub aggressive_urgency: i32,
}

impl Default for PhaseThresholds {
    fn default() -> Self {
        Self {
            early_game_turns: 50,
            end_game_health: 0.3,
            combat_distance: 15,
            deployment_minions: 5,
            advance_distance: 20,
            consolidate_spread: 1.2,
            aggressive_urgency: 60,
        }
    }
}

/// Repetition limits. Windows count the most recent issued actions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpamRules {
    pub history: usize,
    pub flag_history: usize,
    /// A flag may not repeat any of this many previous flag positions.
    pub exact_flag_window: usize,
    /// A flag may not land within `near_flag_radius` (Chebyshev) of this many previous flags.
    pub near_flag_window: usize,
    pub near_flag_radius: i32,
    /// At most `max_flags - 1` earlier flags may sit in this many actions.
    pub flag_window: usize,
    pub max_flags: usize,
    /// Identical actions are capped within this many actions.
    pub repeat_window: usize,
    pub max_flag_repeats: usize,
    pub max_skill_repeats: usize,
    pub max_tactic_repeats: usize,
}

impl Default for SpamRules {
    fn default() -> Self {
        Self {
            history: 15,
            flag_history: 15,
            exact_flag_window: 5,
            near_flag_window: 8,
            near_flag_radius: 2,
            flag_window: 15,
            max_flags: 2,
            repeat_window: 10,
            max_flag_repeats: 6,
            max_skill_repeats: 4,
            max_tactic_repeats: 3,
        }
    }
}

/// How long an adopted tactic is kept, in decisions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TacticPersistence {
    pub min_decisions: u64,
    pub max_decisions: u64,
}

impl Default for TacticPersistence {
    fn default() -> Self {
        Self {
            min_decisions: 15,
            max_decisions: 45,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyWeights {
    /// Damage skills under `aggressive` and `finish_him`.
    pub aggressive_damage: f32,
    /// Heal and buff skills under `defensive`.
    pub defensive_support: f32,
    /// Heal and movement skills under `survive`.
    pub survive_escape: f32,
}

impl StrategyWeights {
    pub fn multiplier(&self, strategy: StrategyKind, category: SkillCategory) -> f32 {
        use SkillCategory::*;
        use StrategyKind::*;
        match (strategy, category) {
            (Aggressive | FinishHim, Damage) => self.aggressive_damage,
            (Defensive, Heal | Buff) => self.defensive_support,
            (Survive, Heal | Movement) => self.survive_escape,
            _ => 1.0,
        }
    }
}

impl Default for StrategyWeights {
    fn default() -> Self {
        Self {
            aggressive_damage: 1.5,
            defensive_support: 1.8,
            survive_escape: 2.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryWeights {
    pub damage: f32,
    pub heal: f32,
    pub buff: f32,
    pub movement: f32,
    pub other: f32,
}

impl CategoryWeights {
    pub const NEUTRAL: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    const fn new(damage: f32, heal: f32, buff: f32, movement: f32) -> Self {
        Self {
            damage,
            heal,
            buff,
            movement,
            other: 1.0,
        }
    }

    pub fn get(&self, category: SkillCategory) -> f32 {
        match category {
            SkillCategory::Damage => self.damage,
            SkillCategory::Heal => self.heal,
            SkillCategory::Buff => self.buff,
            SkillCategory::Movement => self.movement,
            SkillCategory::Other => self.other,
        }
    }

    /// Stock table for [`Tactic::DEFAULT_SET`].
    pub fn default_table() -> Vec<Self> {
        Tactic::DEFAULT_SET
            .iter()
            .map(|tactic| match tactic {
                Tactic::Stop => Self::new(1.0, 1.2, 1.2, 1.0),
                Tactic::Forward => Self::new(1.3, 1.0, 1.0, 1.2),
                Tactic::Backward => Self::new(1.0, 1.4, 1.4, 1.3),
                Tactic::GoSides => Self::new(1.5, 1.1, 1.0, 1.0),
                Tactic::GoCenter => Self::new(1.4, 1.3, 1.3, 1.0),
                Tactic::AttackGeneral => Self::new(1.5, 1.0, 1.0, 1.2),
                Tactic::DefendGeneral => Self::new(1.2, 1.5, 1.5, 1.0),
                _ => Self::NEUTRAL,
            })
            .collect()
    }
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synergy_follows_the_active_tactic() {
        let config = AiConfig::default();
        assert_eq!(config.synergy(None, SkillCategory::Damage), 1.0);
        assert_eq!(config.synergy(Some(3), SkillCategory::Damage), 1.5);
        assert_eq!(config.synergy(Some(6), SkillCategory::Buff), 1.5);
        assert_eq!(config.synergy(Some(2), SkillCategory::Movement), 1.3);
        assert_eq!(config.synergy(Some(5), SkillCategory::Other), 1.0);
        assert_eq!(config.synergy(Some(40), SkillCategory::Heal), 1.0);
    }

    #[test]
    fn strategy_weights_only_boost_matching_categories() {
        let weights = StrategyWeights::default();
        assert_eq!(weights.multiplier(StrategyKind::FinishHim, SkillCategory::Damage), 1.5);
        assert_eq!(weights.multiplier(StrategyKind::Defensive, SkillCategory::Buff), 1.8);
        assert_eq!(weights.multiplier(StrategyKind::Survive, SkillCategory::Movement), 2.0);
        assert_eq!(weights.multiplier(StrategyKind::Survive, SkillCategory::Damage), 1.0);
        assert_eq!(weights.multiplier(StrategyKind::Flank, SkillCategory::Heal), 1.0);
    }
}
