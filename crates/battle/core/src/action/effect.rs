//! Lifecycle of transient board effects.
//!
//! Effects never claim a tile's occupant slot; they live in the tile's effect
//! stack while visible. Each kind advances once per tick in [`update`].

use crate::state::{BattleState, Effect, EffectKind, Entity, EntityId, EntityKind, Position, Side, Status};

use super::combat::{self, Strike};
use super::status;

/// Neighbour offsets a slash sweeps through, one per step.
const SLASH_DIRECTIONS: [(i32, i32); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

/// Puts an effect on the board and runs its on-spawn behavior.
///
/// Arrows and waves strike whatever already stands on the tile; lava burns
/// it regardless of side. Returns `None` when `position` is off the grid.
pub(crate) fn spawn(
    state: &mut BattleState,
    side: Side,
    position: Position,
    effect: Effect,
    owner: Option<EntityId>,
    glyph: char,
) -> Option<EntityId> {
    if !state.grid.is_inside(position) {
        return None;
    }

    let id = state.allocate_id();
    let kind = effect.kind.clone();
    let mut entity = Entity::new(id, side, position, glyph, EntityKind::Effect(effect));
    entity.owner = owner;
    state.entities.insert(id, entity);
    state.grid.push_effect(position, id);
    state.effects.push(id);

    match kind {
        EffectKind::Arrow => strike_tile(state, id, false),
        EffectKind::Wave { .. } => wave_strike(state, id),
        EffectKind::Lava { .. } => {
            if let Some(target) = state.grid.occupant(position)
                && let Some(strike) = Strike::from_entity(state, id)
            {
                combat::receive(state, target, strike);
            }
        }
        _ => {}
    }
    Some(id)
}

/// Takes the effect off the board. Hidden blinking markers are already out
/// of their tile's stack.
pub(crate) fn disappear(state: &mut BattleState, id: EntityId) {
    let Some(entity) = state.entity_mut(id) else {
        return;
    };
    if !entity.alive {
        return;
    }
    entity.alive = false;
    let visible = entity.effect().is_some_and(Effect::is_visible);
    let position = entity.position;
    if visible {
        state.grid.remove_effect(position, id);
    }
}

/// Moves the effect without any occupancy checks.
pub(crate) fn relocate(state: &mut BattleState, id: EntityId, destination: Position) {
    let Some(entity) = state.entity_mut(id) else {
        return;
    };
    let origin = entity.position;
    let visible = entity.effect().is_some_and(Effect::is_visible);
    entity.position = destination;
    if visible {
        state.grid.remove_effect(origin, id);
        state.grid.push_effect(destination, id);
    }
}

/// Strikes the non-allied occupant of the effect's tile. With `vanish`, any
/// attackable occupant (allied or not) also consumes the effect.
fn strike_tile(state: &mut BattleState, id: EntityId, vanish: bool) {
    let Some(effect) = state.entity(id) else {
        return;
    };
    let Some(target) = state
        .occupant(effect.position)
        .filter(|target| target.can_be_attacked())
    else {
        return;
    };
    let hostile = !target.is_ally(effect);
    let target = target.id;

    if hostile && let Some(strike) = Strike::from_entity(state, id) {
        combat::receive(state, target, strike);
    }
    if vanish {
        disappear(state, id);
    }
}

/// Waves hit every attackable entity once, allies included.
fn wave_strike(state: &mut BattleState, id: EntityId) {
    let Some(effect) = state.entity(id) else {
        return;
    };
    let Some(target) = state
        .occupant(effect.position)
        .filter(|target| target.can_be_attacked())
        .map(|target| target.id)
    else {
        return;
    };
    let already_struck = matches!(
        effect.effect().map(|effect| &effect.kind),
        Some(EffectKind::Wave { struck }) if struck.contains(&target)
    );
    if already_struck {
        return;
    }

    if let Some(strike) = Strike::from_entity(state, id) {
        combat::receive(state, target, strike);
    }
    if let Some(Effect {
        kind: EffectKind::Wave { struck },
        ..
    }) = state.entity_mut(id).and_then(Entity::effect_mut)
    {
        struck.push(target);
    }
}

fn set_kind(state: &mut BattleState, id: EntityId, kind: EffectKind) {
    if let Some(effect) = state.entity_mut(id).and_then(Entity::effect_mut) {
        effect.kind = kind;
    }
}

/// Advances one effect by a tick.
pub fn update(state: &mut BattleState, id: EntityId) {
    let Some(entity) = state.entity(id).filter(|entity| entity.alive) else {
        return;
    };
    let Some(effect) = entity.effect() else {
        return;
    };
    let position = entity.position;
    let side = entity.side;

    match effect.kind.clone() {
        EffectKind::Arrow => {
            let next = position.offset(side.forward(), 0);
            if !state.grid.is_inside(next) {
                disappear(state, id);
                return;
            }
            strike_tile(state, id, true);
            if !state.is_alive(id) {
                return;
            }
            relocate(state, id, next);
            strike_tile(state, id, true);
        }
        EffectKind::Wave { .. } => {
            let next = position.offset(side.forward(), 0);
            if !state.grid.is_inside(next) {
                disappear(state, id);
                return;
            }
            wave_strike(state, id);
            relocate(state, id, next);
            wave_strike(state, id);
        }
        EffectKind::Blinking { visible } => update_blinking(state, id, position, visible),
        EffectKind::Temp { duration } => {
            let duration = duration - 1;
            set_kind(state, id, EffectKind::Temp { duration });
            if duration < 0 {
                disappear(state, id);
            }
        }
        EffectKind::Explosion { warmup } => {
            if warmup > 0 {
                set_kind(state, id, EffectKind::Explosion { warmup: warmup - 1 });
            } else {
                strike_tile(state, id, false);
                disappear(state, id);
            }
        }
        EffectKind::Lava { duration } => {
            if duration == 0 {
                disappear(state, id);
            }
            if let Some(target) = state.grid.occupant(position) {
                status::attach(state, target, Status::burnt());
            }
            set_kind(state, id, EffectKind::Lava { duration: duration - 1 });
        }
        EffectKind::Slash {
            general,
            step,
            max_steps,
        } => {
            if step >= max_steps {
                disappear(state, id);
                return;
            }
            let Some(center) = state
                .entity(general)
                .filter(|general| general.is_on_board())
                .map(|general| general.position)
            else {
                disappear(state, id);
                return;
            };
            let (dx, dy) = SLASH_DIRECTIONS[step.rem_euclid(8) as usize];
            let target = center.offset(dx, dy);
            let destination = if state.grid.is_inside(target) {
                target
            } else {
                center
            };
            relocate(state, id, destination);
            set_kind(
                state,
                id,
                EffectKind::Slash {
                    general,
                    step: step + 1,
                    max_steps,
                },
            );
            strike_tile(state, id, false);
        }
        EffectKind::Bouncing {
            path,
            cursor,
            direction,
        } => {
            if cursor == 0 || cursor + 1 >= path.len() {
                disappear(state, id);
                return;
            }
            relocate(state, id, path[cursor]);
            let mut direction = direction;
            if state.grid.occupant(path[cursor]).is_some() {
                strike_tile(state, id, false);
                direction = -direction;
            }
            match cursor.checked_add_signed(direction as isize) {
                Some(cursor) => set_kind(
                    state,
                    id,
                    EffectKind::Bouncing {
                        path,
                        cursor,
                        direction,
                    },
                ),
                None => disappear(state, id),
            }
        }
    }
}

fn update_blinking(state: &mut BattleState, id: EntityId, position: Position, visible: bool) {
    let Some(entity) = state.entity_mut(id) else {
        return;
    };
    if entity.next_action > 0 {
        entity.next_action -= 1;
        return;
    }
    entity.reset_action();
    if visible {
        state.grid.remove_effect(position, id);
    } else {
        state.grid.push_effect(position, id);
    }
    set_kind(state, id, EffectKind::Blinking { visible: !visible });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::movement;
    use crate::state::{Battleground, UnitTemplate};
    use crate::tactic::Tactic;

    fn minion(state: &mut BattleState, side: Side, x: i32, y: i32) -> EntityId {
        let unit = UnitTemplate::default().instantiate(side, Tactic::Stop);
        let id = movement::spawn(
            state,
            Entity::new(EntityId::default(), side, Position::new(x, y), 'm', EntityKind::Unit(unit)),
        )
        .unwrap();
        state.minions.push(id);
        id
    }

    #[test]
    fn arrow_flies_and_breaks_on_the_first_target() {
        let mut state = BattleState::new(Battleground::bordered(10, 5));
        let target = minion(&mut state, Side::Second, 5, 2);
        let arrow = spawn(&mut state, Side::First, Position::new(3, 2), Effect::arrow(4), None, '>').unwrap();

        update(&mut state, arrow);
        assert_eq!(state.entity(arrow).unwrap().position, Position::new(4, 2));
        assert!(state.is_alive(arrow));

        update(&mut state, arrow);
        assert!(!state.is_alive(arrow));
        assert_eq!(state.entity(target).unwrap().hp(), Some(26));
        assert!(state.grid.tile(Position::new(5, 2)).effects.iter().all(|id| *id != arrow));
    }

    #[test]
    fn arrow_leaving_the_grid_disappears() {
        let mut state = BattleState::new(Battleground::bordered(6, 5));
        let arrow = spawn(&mut state, Side::First, Position::new(5, 2), Effect::arrow(4), None, '>').unwrap();
        update(&mut state, arrow);
        assert!(!state.is_alive(arrow));
    }

    #[test]
    fn wave_hits_allies_once() {
        let mut state = BattleState::new(Battleground::bordered(10, 5));
        let ally = minion(&mut state, Side::First, 3, 2);
        let wave = spawn(&mut state, Side::First, Position::new(3, 2), Effect::wave(10), None, '~').unwrap();
        assert_eq!(state.entity(ally).unwrap().hp(), Some(20));
        update(&mut state, wave);
        assert_eq!(state.entity(ally).unwrap().hp(), Some(20));
        assert_eq!(state.entity(wave).unwrap().position, Position::new(4, 2));
    }

    #[test]
    fn explosion_strikes_on_the_third_update() {
        let mut state = BattleState::new(Battleground::bordered(8, 5));
        let target = minion(&mut state, Side::Second, 3, 2);
        let blast = spawn(&mut state, Side::First, Position::new(3, 2), Effect::explosion(7), None, '*').unwrap();
        update(&mut state, blast);
        update(&mut state, blast);
        assert_eq!(state.entity(target).unwrap().hp(), Some(30));
        update(&mut state, blast);
        assert_eq!(state.entity(target).unwrap().hp(), Some(23));
        assert!(!state.is_alive(blast));
    }

    #[test]
    fn blinking_toggles_its_tile_listing() {
        let mut state = BattleState::new(Battleground::bordered(8, 5));
        let at = Position::new(2, 2);
        let flag = spawn(&mut state, Side::First, at, Effect::blinking(), None, 'q').unwrap();
        assert!(state.grid.tile(at).effects.contains(&flag));
        for _ in 0..6 {
            update(&mut state, flag);
        }
        assert!(!state.grid.tile(at).effects.contains(&flag));
        disappear(&mut state, flag);
        assert!(!state.grid.tile(at).effects.contains(&flag));
        assert!(!state.is_alive(flag));
    }

    #[test]
    fn temp_lingers_for_its_duration() {
        let mut state = BattleState::new(Battleground::bordered(8, 5));
        let temp = spawn(&mut state, Side::Neutral, Position::new(2, 2), Effect::temp(1), None, '/').unwrap();
        update(&mut state, temp);
        assert!(state.is_alive(temp));
        update(&mut state, temp);
        assert!(!state.is_alive(temp));
    }
}
