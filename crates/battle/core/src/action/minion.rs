//! Per-tick behavior of rank-and-file units.

use crate::state::{
    BattleState, Effect, Entity, EntityId, EntityKind, Position, Side, UnitClass, UnitTemplate,
};
use crate::tactic::{Tactic, TacticIntent};

use super::{combat, effect, movement, status};

/// Spawns one minion from `general`'s template with its selected tactic.
///
/// The caller adjusts the general's live-minion count.
pub(crate) fn spawn_minion(
    state: &mut BattleState,
    general: EntityId,
    anchor: Position,
) -> Option<EntityId> {
    let commander = state.entity(general)?;
    let profile = commander.general()?;
    let side = commander.side;
    let template = profile.minion.clone();
    let tactic = profile.selected();
    place(state, side, &template, tactic, anchor)
}

/// Puts a unit built from `template` on the board for `side`. The side's
/// active general counts it among its minions.
pub fn enlist(
    state: &mut BattleState,
    side: Side,
    template: &UnitTemplate,
    tactic: Tactic,
    at: Position,
) -> Option<EntityId> {
    let id = place(state, side, template, tactic, at)?;
    if let Some(general) = state.general_id(side)
        && let Some(profile) = state.entity_mut(general).and_then(Entity::general_mut)
    {
        profile.minions_alive += 1;
    }
    Some(id)
}

fn place(
    state: &mut BattleState,
    side: Side,
    template: &UnitTemplate,
    tactic: Tactic,
    anchor: Position,
) -> Option<EntityId> {
    let unit = template.instantiate(side, tactic);
    let mut entity = Entity::new(EntityId::default(), side, anchor, template.glyph, EntityKind::Unit(unit));
    entity.default_next_action = template.default_next_action;
    entity.next_action = entity.default_next_action;

    let id = movement::spawn(state, entity)?;
    state.minions.push(id);
    Some(id)
}

/// One tick of a minion: statuses, then attack or tactic when its clock
/// runs out.
pub fn update(state: &mut BattleState, id: EntityId) {
    if !state.is_alive(id) {
        return;
    }
    status::tick_all(state, id);
    let Some(entity) = state.entity_mut(id).filter(|entity| entity.alive) else {
        return;
    };

    if entity.next_action > 0 {
        entity.next_action -= 1;
        return;
    }
    entity.reset_action();
    if !combat::try_attack(state, id) {
        follow_tactic(state, id);
    }
}

/// Carries out the unit's current tactic. Ranged units holding position
/// loose an arrow instead when the tile ahead is free.
pub fn follow_tactic(state: &mut BattleState, id: EntityId) {
    let Some(entity) = state.entity(id) else {
        return;
    };
    let Some(unit) = entity.unit() else {
        return;
    };

    if let UnitClass::Ranged { ranged_power } = unit.class
        && unit.tactic == Tactic::Stop
    {
        let ahead = entity.position.offset(entity.side.forward(), 0);
        if state.grid.is_inside(ahead) && state.grid.occupant(ahead).is_none() {
            let side = entity.side;
            let glyph = arrow_glyph(side);
            effect::spawn(state, side, ahead, Effect::arrow(ranged_power), Some(id), glyph);
            return;
        }
    }

    match unit.tactic.intent(state, entity) {
        TacticIntent::Hold => {
            if let Some(entity) = state.entity_mut(id) {
                entity.next_action = 1;
            }
        }
        TacticIntent::Step { dx, dy } => {
            let _ = movement::step(state, id, dx, dy);
        }
        TacticIntent::Idle => {}
    }
}

fn arrow_glyph(side: Side) -> char {
    match side {
        Side::First => '>',
        _ => '<',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Battleground, UnitTemplate};

    fn unit(state: &mut BattleState, template: &UnitTemplate, side: Side, x: i32, y: i32, tactic: Tactic) -> EntityId {
        let mut entity = Entity::new(
            EntityId::default(),
            side,
            Position::new(x, y),
            template.glyph,
            EntityKind::Unit(template.instantiate(side, tactic)),
        );
        entity.default_next_action = template.default_next_action;
        entity.next_action = 0;
        let id = movement::spawn(state, entity).unwrap();
        state.minions.push(id);
        id
    }

    #[test]
    fn adjacent_enemy_is_attacked_before_moving() {
        let mut state = BattleState::new(Battleground::bordered(10, 6));
        let template = UnitTemplate::default();
        let attacker = unit(&mut state, &template, Side::First, 3, 2, Tactic::Forward);
        let target = unit(&mut state, &template, Side::Second, 4, 2, Tactic::Stop);

        update(&mut state, attacker);
        assert_eq!(state.entity(attacker).unwrap().position, Position::new(3, 2));
        assert_eq!(state.entity(target).unwrap().hp(), Some(25));
        assert_eq!(state.entity(attacker).unwrap().next_action, 5);
    }

    #[test]
    fn forward_tactic_steps_when_nothing_is_near() {
        let mut state = BattleState::new(Battleground::bordered(10, 6));
        let template = UnitTemplate::default();
        let walker = unit(&mut state, &template, Side::Second, 5, 2, Tactic::Forward);
        update(&mut state, walker);
        assert_eq!(state.entity(walker).unwrap().position, Position::new(4, 2));
    }

    #[test]
    fn ranged_units_fire_while_holding() {
        let mut state = BattleState::new(Battleground::bordered(10, 6));
        let template = UnitTemplate::ranged("archer", 'a');
        let archer = unit(&mut state, &template, Side::First, 2, 2, Tactic::Stop);
        update(&mut state, archer);

        let arrow = state.live_effects().find(|entity| entity.glyph == '>').map(|entity| entity.id);
        let arrow = arrow.expect("arrow spawned");
        assert_eq!(state.entity(arrow).unwrap().position, Position::new(3, 2));
        assert_eq!(state.entity(arrow).unwrap().owner, Some(archer));
        assert_eq!(state.entity(archer).unwrap().next_action, 10);
    }

    #[test]
    fn stop_holds_with_a_short_clock() {
        let mut state = BattleState::new(Battleground::bordered(10, 6));
        let template = UnitTemplate::default();
        let guard = unit(&mut state, &template, Side::First, 2, 2, Tactic::Stop);
        update(&mut state, guard);
        assert_eq!(state.entity(guard).unwrap().next_action, 1);
    }
}
