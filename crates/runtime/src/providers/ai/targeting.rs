//! Skill appraisal and target selection.

use rand::Rng;
use rand::seq::SliceRandom;
use skirmish_core::{Position, Side, Skill, SkillCategory};

use super::analysis::{Assessment, Battlefield};

/// Random tiles sampled in the enemy half when aiming an area skill.
const AOE_SAMPLES: usize = 25;
/// Most damaged minions considered for a heal.
const HEAL_CANDIDATES: usize = 5;
const BASE_PRIORITY: f32 = 40.0;
/// Priority of skills with no dedicated heuristic.
const OTHER_PRIORITY: f32 = 16.0;
const ENEMY_GENERAL_BONUS: f32 = 2.0;
const ALLY_PENALTY: f32 = 1.5;

/// How much a ready skill is wanted right now.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Appraisal {
    pub priority: f32,
    /// Whether the situation calls for the skill at all.
    pub worthwhile: bool,
}

impl Appraisal {
    fn wanted(priority: f32) -> Self {
        Self {
            priority,
            worthwhile: true,
        }
    }

    fn unwanted(priority: f32) -> Self {
        Self {
            priority,
            worthwhile: false,
        }
    }
}

pub(crate) fn appraise(
    field: &Battlefield<'_>,
    assessment: &Assessment,
    skill: &Skill,
    rng: &mut impl Rng,
) -> Appraisal {
    let urgency = assessment.urgency as f32;
    match skill.category {
        SkillCategory::Damage => match aoe_target(field, skill, rng) {
            Some((_, score)) if score > 1.0 => Appraisal::wanted(BASE_PRIORITY + urgency * 0.2 + score),
            _ => Appraisal::unwanted(0.0),
        },
        SkillCategory::Heal if assessment.our_health < 0.8 => {
            Appraisal::wanted(BASE_PRIORITY + (1.0 - assessment.our_health) * 30.0)
        }
        SkillCategory::Heal => Appraisal::unwanted(0.0),
        SkillCategory::Buff => {
            let priority = BASE_PRIORITY + urgency * 0.15;
            if assessment.urgency > 20 {
                Appraisal::wanted(priority)
            } else {
                Appraisal::unwanted(priority * 0.7)
            }
        }
        SkillCategory::Movement => {
            let distance = strategic_move_target(field, rng).manhattan(field.position());
            if distance > 5 {
                Appraisal::wanted(BASE_PRIORITY + distance as f32 * 3.0)
            } else {
                Appraisal::unwanted(0.0)
            }
        }
        SkillCategory::Other => Appraisal::wanted(OTHER_PRIORITY),
    }
}

/// Best target for `skill` and its score, if any target is worth it.
pub(crate) fn skill_target(field: &Battlefield<'_>, skill: &Skill, rng: &mut impl Rng) -> Option<(Position, f32)> {
    match skill.category {
        SkillCategory::Damage => aoe_target(field, skill, rng),
        SkillCategory::Heal => heal_target(field, skill),
        SkillCategory::Movement => {
            let target = strategic_move_target(field, rng);
            Some((target, target.manhattan(field.position()) as f32))
        }
        SkillCategory::Buff | SkillCategory::Other => self_target(field, skill),
    }
}

/// Whether casting `skill` at `target` would touch at least one tile.
pub(crate) fn reaches(field: &Battlefield<'_>, skill: &Skill, target: Position) -> bool {
    if skill.effect.is_untargeted() {
        return true;
    }
    !affected_tiles(field, skill, target).is_empty()
}

fn affected_tiles(field: &Battlefield<'_>, skill: &Skill, target: Position) -> Vec<Position> {
    match &skill.area {
        Some(area) => area.tiles(field.state, Some(field.general.id), target),
        None if field.is_inside(target) => vec![target],
        None => Vec::new(),
    }
}

/// Samples around the enemy general and across the enemy half; scores +1
/// per enemy unit hit (more for the general) and a penalty per ally.
pub(crate) fn aoe_target(field: &Battlefield<'_>, skill: &Skill, rng: &mut impl Rng) -> Option<(Position, f32)> {
    let mut candidates = Vec::with_capacity(AOE_SAMPLES + 9);
    if let Some(enemy) = field.enemy {
        for dx in -1..=1 {
            for dy in -1..=1 {
                candidates.push(enemy.position.offset(dx, dy));
            }
        }
    }

    let (width, height) = (field.width(), field.height());
    let (min_x, max_x) = match field.enemy_side() {
        Side::Second => (width / 2, width - 1),
        _ => (0, width / 2 - 1),
    };
    let max_y = (height - 2).max(1);
    for _ in 0..AOE_SAMPLES {
        let x = rng.gen_range(min_x..=max_x.max(min_x));
        let y = rng.gen_range(1..=max_y);
        candidates.push(Position::new(x, y));
    }

    let mut best = None;
    let mut best_score = 0.0;
    for target in candidates {
        if !field.is_inside(target) || !reaches(field, skill, target) {
            continue;
        }
        let score = impact(field, skill, target);
        if score > best_score {
            best_score = score;
            best = Some(target);
        }
    }
    best.map(|target| (target, best_score))
}

fn impact(field: &Battlefield<'_>, skill: &Skill, target: Position) -> f32 {
    affected_tiles(field, skill, target)
        .into_iter()
        .filter_map(|tile| field.unit_at(tile))
        .map(|unit| {
            if unit.is_ally(field.general) {
                -ALLY_PENALTY
            } else if field.is_enemy_general(unit) {
                1.0 + ENEMY_GENERAL_BONUS
            } else {
                1.0
            }
        })
        .sum()
}

/// The wounded ally missing the most hp: our general first, then the most
/// damaged minions. Scores by hp missing.
pub(crate) fn heal_target(field: &Battlefield<'_>, skill: &Skill) -> Option<(Position, f32)> {
    let missing = |unit: &skirmish_core::Unit| (unit.max_hp - unit.hp) as f32;
    let mut best = None;
    let mut best_score = 0.0;

    let general = &field.commander.unit;
    if general.hp < general.max_hp && reaches(field, skill, field.position()) {
        best_score = missing(general);
        best = Some(field.position());
    }

    let mut minions: Vec<(Position, f32)> = field
        .state
        .live_minions(field.side)
        .filter_map(|minion| {
            let unit = minion.unit()?;
            (unit.hp < unit.max_hp).then(|| (minion.position, missing(unit)))
        })
        .collect();
    minions.sort_by(|a, b| b.1.total_cmp(&a.1));
    for (position, score) in minions.into_iter().take(HEAL_CANDIDATES) {
        if score > best_score && reaches(field, skill, position) {
            best_score = score;
            best = Some(position);
        }
    }
    best.map(|target| (target, best_score))
}

/// Our own tile, or the first neighbour the skill can act on.
fn self_target(field: &Battlefield<'_>, skill: &Skill) -> Option<(Position, f32)> {
    let here = field.position();
    std::iter::once(here)
        .chain(NEIGHBOURS.iter().map(|&(dx, dy)| here.offset(dx, dy)))
        .find(|&target| field.is_inside(target) && reaches(field, skill, target))
        .map(|target| (target, 0.0))
}

pub(crate) const NEIGHBOURS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// A free tile near the enemy general, picked at random among the closest
/// few to us.
pub(crate) fn strategic_move_target(field: &Battlefield<'_>, rng: &mut impl Rng) -> Position {
    let here = field.position();
    let enemy = field.enemy_position();
    let mut candidates = vec![
        enemy.offset(rng.gen_range(-3..=3), rng.gen_range(-2..=2)),
        enemy.offset(rng.gen_range(-4..=4), rng.gen_range(-3..=3)),
        enemy.offset(rng.gen_range(-2..=2), rng.gen_range(-4..=4)),
    ];
    candidates.extend(
        [(-6, 0), (6, 0), (0, -4), (-4, -3), (4, -3)]
            .into_iter()
            .map(|(dx, dy)| enemy.offset(dx, dy)),
    );

    let mut valid: Vec<(Position, i32)> = candidates
        .into_iter()
        .map(|candidate| field.clamp(candidate))
        .filter(|&candidate| field.is_free(candidate))
        .map(|candidate| (candidate, candidate.manhattan(here)))
        .filter(|&(_, distance)| distance >= 2)
        .collect();
    valid.sort_by_key(|&(_, distance)| distance);
    valid.truncate(3);
    if let Some(&(target, _)) = valid.choose(rng) {
        return target;
    }

    let (max_x, max_y) = ((field.width() - 2).max(1), (field.height() - 2).max(1));
    for _ in 0..50 {
        let candidate = Position::new(rng.gen_range(1..=max_x), rng.gen_range(1..=max_y));
        if field.is_free(candidate) && candidate != here {
            return candidate;
        }
    }
    field.clamp(here.offset(1, 0))
}
