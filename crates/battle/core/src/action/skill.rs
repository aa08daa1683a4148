//! Skill resolution.
//!
//! A skill either ignores its target ([`SkillEffect::is_untargeted`]) or is
//! applied once per tile of its area. A targeted skill without an area acts
//! on the target tile alone.

use crate::state::{
    BattleState, DamageType, Effect, Entity, EntityId, EntityKind, MinionPattern, Placeable,
    Position, Side, Skill, SkillEffect, Status,
};

use super::combat::{self, KillCredit, Strike};
use super::{effect, general, minion, movement, status};

/// Resolves `skill` cast by `caster` at `target`. Returns whether any tile
/// was affected.
pub(crate) fn cast(state: &mut BattleState, caster: EntityId, skill: &Skill, target: Position) -> bool {
    if skill.effect.is_untargeted() {
        return apply_untargeted(state, caster, &skill.effect);
    }

    let tiles = match &skill.area {
        Some(area) => area.tiles(state, Some(caster), target),
        None if state.grid.is_inside(target) => vec![target],
        None => Vec::new(),
    };

    // Every tile is visited even after the first success.
    let mut did_anything = false;
    for tile in tiles {
        did_anything |= apply_to_tile(state, caster, &skill.effect, tile);
    }
    did_anything
}

fn apply_to_tile(state: &mut BattleState, caster: EntityId, effect: &SkillEffect, tile: Position) -> bool {
    match effect {
        SkillEffect::Heal { amount } => match state.grid.occupant(tile) {
            Some(occupant) => heal(state, occupant, *amount),
            None => false,
        },
        SkillEffect::Place(placeable) => place(state, caster, placeable, tile),
        SkillEffect::ApplyStatus(template) => {
            if let Some(occupant) = state.grid.occupant(tile) {
                status::attach(state, occupant, template.clone().with_owner(caster));
            }
            true
        }
        SkillEffect::Nuke { power, damage_type } => {
            nuke(state, caster, tile, *power, *damage_type);
            true
        }
        SkillEffect::Explosion { power, radius } => {
            let blast = crate::area::circle(state, tile, *radius);
            let hit = !blast.is_empty();
            for position in blast {
                nuke(state, caster, position, *power, DamageType::Magical);
            }
            hit
        }
        SkillEffect::Consume {
            hp_gain,
            cooldown_delta,
        } => {
            if let Some(occupant) = state.grid.occupant(tile) {
                combat::die(state, occupant);
            }
            heal(state, caster, *hp_gain);
            if let Some(profile) = state.entity_mut(caster).and_then(Entity::general_mut) {
                for skill in &mut profile.skills {
                    skill.change_cd(*cooldown_delta);
                }
            }
            true
        }
        SkillEffect::Darkness { duration } => {
            let passable = state.grid.is_passable(tile);
            if passable {
                effect::spawn(state, Side::Neutral, tile, Effect::temp(*duration), None, ' ');
            }
            passable
        }
        SkillEffect::TeleportSelf => movement::teleport(state, caster, tile).is_ok(),
        SkillEffect::SummonMinion => {
            let summoned = minion::spawn_minion(state, caster, tile).is_some();
            if summoned && let Some(profile) = state.entity_mut(caster).and_then(Entity::general_mut) {
                profile.minions_alive += 1;
            }
            summoned
        }
        SkillEffect::Recall { duration } => recall(state, caster, tile, *duration),
        SkillEffect::WaterPusher => water_pusher(state, tile),
        SkillEffect::Pattern(pattern) => seed_pattern(state, caster, *pattern, tile),
        SkillEffect::RestockMinions { .. } | SkillEffect::SonicWaves { .. } | SkillEffect::Nothing => false,
    }
}

/// Spawns a minion on every free cell of `pattern`. Fails when the shape
/// does not fit on the grid or no cell was free.
fn seed_pattern(state: &mut BattleState, caster: EntityId, pattern: MinionPattern, tile: Position) -> bool {
    let Some(side) = state.entity(caster).map(|entity| entity.side) else {
        return false;
    };
    let cells = pattern.cells(side, tile, state.grid.width(), state.grid.height());
    let spawned = cells
        .into_iter()
        .filter(|&cell| minion::spawn_minion(state, caster, cell).is_some())
        .count() as i32;
    if spawned > 0
        && let Some(profile) = state.entity_mut(caster).and_then(Entity::general_mut)
    {
        profile.minions_alive += spawned;
    }
    spawned > 0
}

fn apply_untargeted(state: &mut BattleState, caster: EntityId, effect: &SkillEffect) -> bool {
    match *effect {
        SkillEffect::RestockMinions { number } => {
            general::deploy(state, caster, number);
            general::recommand_tactic(state, caster);
            true
        }
        SkillEffect::SonicWaves { power, waves } => {
            sonic_waves(state, caster, power, waves);
            waves > 0
        }
        _ => false,
    }
}

/// Restores up to `amount` hp. Fails on non-units and on full health.
pub(crate) fn heal(state: &mut BattleState, id: EntityId, amount: i32) -> bool {
    let Some(unit) = state.entity_mut(id).filter(|entity| entity.alive).and_then(Entity::unit_mut) else {
        return false;
    };
    if unit.hp == unit.max_hp {
        return false;
    }
    unit.hp = (unit.hp + amount).min(unit.max_hp);
    true
}

fn nuke(state: &mut BattleState, caster: EntityId, tile: Position, power: i32, damage_type: DamageType) {
    let Some(occupant) = state.grid.occupant(tile) else {
        return;
    };
    let strike = Strike {
        power,
        damage_type,
        visual: None,
        credit: KillCredit {
            killer: Some(caster),
            owner: None,
        },
    };
    combat::receive(state, occupant, strike);
}

fn place(state: &mut BattleState, caster: EntityId, placeable: &Placeable, tile: Position) -> bool {
    let side = state.entity(caster).map_or(Side::Neutral, |entity| entity.side);
    match placeable {
        Placeable::Mine { power } => {
            let mut mine = Entity::new(
                EntityId::default(),
                Side::Neutral,
                tile,
                'X',
                EntityKind::Mine { power: *power },
            );
            mine.owner = Some(caster);
            movement::spawn(state, mine).is_some()
        }
        Placeable::Effect(template) => {
            let glyph = template.glyph();
            effect::spawn(state, side, tile, template.clone(), Some(caster), glyph).is_some()
        }
    }
}

/// Pulls the first vanished ally back onto `tile` and holds it there while
/// it recovers.
fn recall(state: &mut BattleState, caster: EntityId, tile: Position, duration: i32) -> bool {
    let Some(side) = state.entity(caster).map(|entity| entity.side) else {
        return false;
    };
    let candidate = state.minions.iter().copied().find(|id| {
        state.entity(*id).is_some_and(|entity| {
            entity.alive
                && entity.side == side
                && entity.statuses.contains(Status::VANISHED)
                && movement::fits(state, tile, entity.footprint_len())
        })
    });
    let Some(minion) = candidate else {
        return false;
    };

    status::remove_silently(state, minion, Status::VANISHED);
    if movement::teleport(state, minion, tile).is_err() {
        return false;
    }
    if let Some(entity) = state.entity_mut(minion) {
        entity.reset_action();
    }
    status::attach(state, minion, Status::recalling(duration));
    true
}

/// Pushes the eight neighbours of `tile` one step away from it.
fn water_pusher(state: &mut BattleState, tile: Position) -> bool {
    let mut did_anything = false;
    for i in -1..=1 {
        for j in -1..=1 {
            if (i, j) == (0, 0) {
                continue;
            }
            let neighbour = tile.offset(i, j);
            if !state.grid.is_inside(neighbour) {
                continue;
            }
            if let Some(occupant) = state.grid.occupant(neighbour)
                && movement::can_be_pushed(state, occupant, i, j)
            {
                movement::get_pushed(state, occupant, i, j);
                did_anything = true;
            }
        }
    }
    did_anything
}

/// Fans `waves` waves out in front of the caster, alternating above and
/// below its row.
fn sonic_waves(state: &mut BattleState, caster: EntityId, power: i32, waves: i32) {
    let Some(entity) = state.entity(caster).filter(|entity| entity.is_on_board()) else {
        return;
    };
    let side = entity.side;
    let origin = entity.position;

    for i in 0..waves {
        let spread = f64::from(i + 1) / 2.0;
        let x = match side {
            Side::First => f64::from(origin.x) + 1.0 - spread,
            _ => f64::from(origin.x) - 1.0 + spread,
        };
        let y = f64::from(origin.y) + spread * if i % 2 == 0 { -1.0 } else { 1.0 };
        // Truncation toward zero.
        let position = Position::new(x as i32, y as i32);
        if state.grid.is_inside(position) {
            effect::spawn(state, side, position, Effect::wave(power), Some(caster), '~');
        }
    }
}
