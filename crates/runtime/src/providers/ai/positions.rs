//! Where to plant the movement flag.
//!
//! Every function returns a candidate tile; whether it is issued is decided
//! by the controller against its spam rules.

use rand::Rng;
use rand::seq::SliceRandom;
use skirmish_core::{Position, Side, Skill, SkillCategory};

use super::analysis::Battlefield;
use super::memory::AiMemory;
use super::targeting::{NEIGHBOURS, reaches};

/// Tile that puts a ready skill in its best use, if clearly worth the trip.
pub(crate) fn skill_position(field: &Battlefield<'_>) -> Option<Position> {
    let mut best = None;
    let mut best_score = 0.0;
    for (_, skill) in field.commander.ready_skills() {
        let candidate = match skill.category {
            SkillCategory::Damage => aoe_position(field, skill),
            SkillCategory::Heal => healing_position(field, skill),
            SkillCategory::Movement => direct_position(field),
            SkillCategory::Buff | SkillCategory::Other => None,
        };
        if let Some((position, score)) = candidate
            && score > best_score
        {
            best_score = score;
            best = Some(position);
        }
    }

    if best.is_none() {
        (best, best_score) = close_in_position(field).map_or((None, 0.0), |(p, s)| (Some(p), s));
    }

    best.filter(|position| best_score > 5.0 && position.manhattan(field.position()) > 1)
}

fn aoe_position(field: &Battlefield<'_>, skill: &Skill) -> Option<(Position, f32)> {
    let enemy = field.enemy_position();
    let here = field.position();
    let samples = (-3..=3)
        .flat_map(|dx| (-3..=3).map(move |dy| enemy.offset(dx, dy)))
        .filter(|&position| field.is_inside(position))
        .take(20);

    let mut best = None;
    let mut best_score = 0.0;
    for position in samples {
        if !reaches(field, skill, position) {
            continue;
        }
        let hits: f32 = area(field, skill, position)
            .into_iter()
            .filter_map(|tile| field.unit_at(tile))
            .filter(|unit| !unit.is_ally(field.general))
            .map(|unit| if field.is_enemy_general(unit) { 4.0 } else { 1.0 })
            .sum();
        let score = hits - (position.manhattan(here) - 8).max(0) as f32;
        if score > best_score {
            best_score = score;
            best = Some(position);
        }
    }
    best.map(|position| (position, best_score))
}

fn healing_position(field: &Battlefield<'_>, skill: &Skill) -> Option<(Position, f32)> {
    let here = field.position();
    let mut best = None;
    let mut best_score = 0.0;
    for (patient, _) in field.damaged_allies().into_iter().take(3) {
        for dx in -2..=2 {
            for dy in -2..=2 {
                let position = patient.position.offset(dx, dy);
                if !field.is_inside(position) || !reaches(field, skill, position) {
                    continue;
                }
                let coverage: f32 = area(field, skill, position)
                    .into_iter()
                    .filter_map(|tile| field.unit_at(tile))
                    .filter(|unit| unit.is_ally(field.general))
                    .filter_map(|unit| unit.unit())
                    .map(|unit| (1.0 - unit.health_ratio()) * 10.0)
                    .sum();
                let score = coverage - (position.manhattan(here) - 6).max(0) as f32;
                if score > best_score {
                    best_score = score;
                    best = Some(position);
                }
            }
        }
    }
    best.map(|position| (position, best_score))
}

/// Landing tile near the enemy general for movement skills.
fn direct_position(field: &Battlefield<'_>) -> Option<(Position, f32)> {
    const OFFSETS: [i32; 6] = [-4, -3, -2, 2, 3, 4];
    let enemy = field.enemy_position();
    let here = field.position();
    let mut best = None;
    let mut best_score = 0;
    for dx in OFFSETS {
        for dy in OFFSETS {
            let position = enemy.offset(dx, dy);
            if !field.is_inside(position) {
                continue;
            }
            let score = (15 - position.manhattan(enemy)) + (8 - position.manhattan(here)).max(0);
            if score > best_score {
                best_score = score;
                best = Some(position);
            }
        }
    }
    best.map(|position| (position, best_score as f32))
}

/// A short hop toward the enemy general when no skill wants a position.
fn close_in_position(field: &Battlefield<'_>) -> Option<(Position, f32)> {
    const OFFSETS: [i32; 6] = [-3, -2, -1, 1, 2, 3];
    let enemy = field.enemy_position();
    let here = field.position();
    let mut best = None;
    let mut best_score = 0;
    for dx in OFFSETS {
        for dy in OFFSETS {
            let position = enemy.offset(dx, dy);
            if !field.is_inside(position) {
                continue;
            }
            let to_enemy = position.manhattan(enemy);
            let to_us = position.manhattan(here);
            if to_enemy <= 5 && (2..=6).contains(&to_us) {
                let score = (10 - to_enemy) + (6 - to_us);
                if score > best_score {
                    best_score = score;
                    best = Some(position);
                }
            }
        }
    }
    best.map(|position| (position, best_score as f32))
}

fn area(field: &Battlefield<'_>, skill: &Skill, target: Position) -> Vec<Position> {
    match &skill.area {
        Some(area) => area.tiles(field.state, Some(field.general.id), target),
        None => vec![target],
    }
}

/// Beside or in front of the enemy general.
pub(crate) fn flanking_position(field: &Battlefield<'_>) -> Option<Position> {
    let enemy = field.enemy_position();
    let here = field.position();
    [enemy.offset(-8, 0), enemy.offset(8, 0), enemy.offset(0, -5)]
        .into_iter()
        .filter(|&position| field.is_inside(position))
        .map(|position| {
            let score = (20 - position.manhattan(enemy)) + (10 - position.manhattan(here)).max(0);
            (position, score)
        })
        .fold(None::<(Position, i32)>, |best, candidate| match best {
            Some((_, score)) if score >= candidate.1 => best,
            _ => Some(candidate),
        })
        .map(|(position, _)| position)
}

/// A few tiles back toward our own edge.
pub(crate) fn retreat_position(field: &Battlefield<'_>, rng: &mut impl Rng) -> Position {
    let here = field.position();
    let x = match field.side {
        Side::First => (here.x - 5).max(2),
        _ => (here.x + 5).min(field.width() - 3),
    };
    field.clamp(Position::new(x, here.y + rng.gen_range(-2..=2)))
}

/// A ring of tiles around the enemy general, scored for closeness to it, a
/// comfortable hop from us, and distance from recent flags. `None` when we
/// are already close.
pub(crate) fn advance_position(field: &Battlefield<'_>, memory: &AiMemory, rng: &mut impl Rng) -> Option<Position> {
    let enemy = field.enemy_position();
    let here = field.position();
    if here.manhattan(enemy) <= 8 {
        return None;
    }

    let candidates: Vec<Position> = [6, 8, 10, 12]
        .into_iter()
        .flat_map(|distance| (0..8).map(move |step| ring_offset(distance, step * 45)))
        .map(|(dx, dy)| field.clamp(enemy.offset(dx, dy)))
        .filter(|&position| field.is_inside(position))
        .take(15)
        .collect();

    let recent: Vec<Position> = memory.flags().rev().take(8).copied().collect();
    let mut scored: Vec<(f64, Position)> = candidates
        .into_iter()
        .map(|position| {
            let closeness = (50 - position.manhattan(enemy)).max(0);
            let hop = (15 - (position.manhattan(here) - 6).abs()).max(0);
            let recency = if recent.iter().any(|flag| flag.chebyshev(position) <= 3) { 25 } else { 0 };
            let crowded = if field.is_free(position) { 0 } else { 5 };
            let jitter = rng.gen_range(-1.0..=1.0);
            (f64::from(closeness + hop - recency - crowded) + jitter, position)
        })
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.truncate(3);

    let &(score, position) = scored.choose(rng)?;
    (score > 5.0).then_some(position)
}

/// Offset `distance` away at `angle` degrees, snapped to the eight compass
/// directions with diagonals shortened.
fn ring_offset(distance: i32, angle: i32) -> (i32, i32) {
    let shortened = distance * 7 / 10;
    let sign_x = if angle <= 90 || angle >= 270 { 1 } else { -1 };
    let sign_y = if angle <= 180 { 1 } else { -1 };
    let dx = if (45..=135).contains(&angle) || (225..=315).contains(&angle) {
        shortened
    } else {
        distance
    };
    let dy = if (135..=225).contains(&angle) { shortened } else { distance };
    (sign_x * dx, sign_y * dy)
}

/// Another tile around the enemy when `original` was just used.
pub(crate) fn alternative_target(field: &Battlefield<'_>, original: Position, rng: &mut impl Rng) -> Position {
    let enemy = field.enemy_position();
    let here = field.position();
    let alternatives: Vec<Position> = [-5, -4, -3, -2, 2, 3, 4, 5]
        .into_iter()
        .flat_map(|dx| [-3, -2, -1, 1, 2, 3].into_iter().map(move |dy| (dx, dy)))
        .map(|(dx, dy)| field.clamp(enemy.offset(dx, dy)))
        .filter(|&position| position != original && field.is_free(position) && position.manhattan(here) >= 3)
        .collect();
    alternatives.choose(rng).copied().unwrap_or(original)
}

/// Diagonal tiles around the enemy, farthest from our last flags first.
pub(crate) fn spread_out_positions(field: &Battlefield<'_>, memory: &AiMemory) -> Vec<Position> {
    let enemy = field.enemy_position();
    let here = field.position();
    let mut alternatives: Vec<Position> = [8, 10, 12]
        .into_iter()
        .flat_map(|distance| {
            [30, 60, 120, 150, 210, 240, 300, 330].into_iter().map(move |angle| {
                let dx = if angle <= 90 || angle >= 270 { distance } else { -distance };
                let dy = if angle <= 180 { distance } else { -distance };
                (dx, dy)
            })
        })
        .map(|(dx, dy)| field.clamp(enemy.offset(dx, dy)))
        .filter(|position| position.manhattan(here) >= 4)
        .collect();

    let recent: Vec<Position> = memory.flags().rev().take(3).copied().collect();
    let clearance = |position: &Position| {
        recent
            .iter()
            .map(|flag| flag.manhattan(*position))
            .min()
            .unwrap_or(999)
    };
    alternatives.sort_by_key(|position| std::cmp::Reverse(clearance(position)));
    alternatives.truncate(8);
    alternatives
}

/// Neighbouring tiles of our general, clamped to the playable area, that
/// actually differ from where it stands.
pub(crate) fn neighbour_steps(field: &Battlefield<'_>) -> Vec<Position> {
    let here = field.position();
    NEIGHBOURS
        .iter()
        .map(|&(dx, dy)| field.clamp(here.offset(dx, dy)))
        .filter(|&position| position != here)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_offsets_follow_the_compass() {
        assert_eq!(ring_offset(10, 0), (10, 10));
        assert_eq!(ring_offset(10, 45), (7, 10));
        assert_eq!(ring_offset(10, 90), (7, 10));
        assert_eq!(ring_offset(10, 135), (-7, 7));
        assert_eq!(ring_offset(10, 180), (-10, 7));
        assert_eq!(ring_offset(10, 225), (-7, -7));
        assert_eq!(ring_offset(10, 270), (7, -10));
        assert_eq!(ring_offset(6, 315), (4, -6));
    }
}
