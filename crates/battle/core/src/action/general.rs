//! Commanding units: flags, tactics, swaps, skills, and deployment.

use crate::config::BattleConfig;
use crate::state::{
    BattleState, Effect, Entity, EntityId, General, GeneralRule, Position, Side,
    step_toward_or_hold,
};
use crate::tactic::Tactic;

use super::error::{SkillError, SwapError, TacticError};
use super::{combat, effect, minion, movement, skill, status};

fn profile(state: &BattleState, general: EntityId) -> Option<(&Entity, &General)> {
    let entity = state.entity(general)?;
    Some((entity, entity.general()?))
}

/// Moves `general`'s flag to `target`. A target off the grid clears it.
pub fn place_flag(state: &mut BattleState, general: EntityId, target: Position) {
    let Some((entity, commander)) = profile(state, general) else {
        return;
    };
    let side = entity.side;
    if let Some(flag) = commander.flag {
        if state.entity(flag).is_some_and(|marker| marker.alive && marker.position == target) {
            return;
        }
        effect::disappear(state, flag);
    }

    let flag = if state.grid.is_inside(target) {
        effect::spawn(state, side, target, Effect::blinking(), Some(general), 'q')
    } else {
        None
    };
    if let Some(commander) = state.entity_mut(general).and_then(Entity::general_mut) {
        commander.flag = flag;
    }
}

/// Current flag position, if a flag is up.
pub fn flag_position(state: &BattleState, general: EntityId) -> Option<Position> {
    let (_, commander) = profile(state, general)?;
    let flag = state.entity(commander.flag?)?;
    flag.alive.then_some(flag.position)
}

/// Switches every allied minion to tactic `index`.
///
/// A non-stop selection is remembered as the previous tactic first, so the
/// toggle can return to it.
pub fn command_tactic(state: &mut BattleState, general: EntityId, index: usize) -> Result<(), TacticError> {
    let Some(entity) = state.entity_mut(general) else {
        return Ok(());
    };
    let side = entity.side;
    let Some(commander) = entity.general_mut() else {
        return Ok(());
    };
    let available = commander.tactics.len();
    let tactic = *commander
        .tactics
        .get(index)
        .ok_or(TacticError::UnknownTactic { index, available })?;
    if commander.selected_tactic != 0 {
        commander.previous_tactic = commander.selected_tactic;
    }
    commander.selected_tactic = index;

    let minions: Vec<EntityId> = state.minions.clone();
    for id in minions {
        if let Some(entity) = state.entity_mut(id).filter(|entity| entity.side == side)
            && let Some(unit) = entity.unit_mut()
        {
            unit.tactic = tactic;
        }
    }
    Ok(())
}

/// Re-issues the selected tactic, e.g. after fresh minions were deployed.
pub(crate) fn recommand_tactic(state: &mut BattleState, general: EntityId) {
    let Some((_, commander)) = profile(state, general) else {
        return;
    };
    let selected = commander.selected_tactic;
    let previous = commander.previous_tactic;
    let _ = command_tactic(state, general, selected);
    if let Some(commander) = state.entity_mut(general).and_then(Entity::general_mut) {
        commander.previous_tactic = previous;
    }
}

/// Index the toggle key selects: back to the previous tactic from stop,
/// otherwise stop.
pub fn toggle_target(commander: &General) -> usize {
    if commander.selected_tactic == 0 {
        commander.previous_tactic
    } else {
        0
    }
}

/// Trades the active general of `side` for reserve `index`.
///
/// The newcomer takes the tile and the flag, and starts winded.
pub fn swap(state: &mut BattleState, side: Side, index: usize) -> Result<(), SwapError> {
    let Some(slot) = side.index() else {
        return Err(SwapError::NoReserve { index });
    };
    let Some(outgoing) = state.generals[slot] else {
        return Err(SwapError::NoReserve { index });
    };
    let Some((entity, commander)) = profile(state, outgoing) else {
        return Err(SwapError::NoReserve { index });
    };
    if !commander.swap_ready() {
        return Err(SwapError::NotReady {
            remaining: commander.swap_max_cd - commander.swap_cd,
        });
    }
    let incoming = *state.reserves[slot]
        .get(index)
        .ok_or(SwapError::NoReserve { index })?;
    let position = entity.position;
    let flag = commander.flag;
    let flag_target = flag_position(state, outgoing);

    movement::vacate(state, outgoing);
    if let Some(entity) = state.entity_mut(outgoing) {
        entity.position = Position::NOWHERE;
    }
    if let Some(entity) = state.entity_mut(incoming) {
        entity.position = position;
        if let Some(commander) = entity.general_mut() {
            commander.swap_cd = 0;
            let sickness = commander.swap_sickness;
            entity.next_action = sickness;
        }
    }
    movement::claim(state, incoming);
    state.generals[slot] = Some(incoming);
    state.reserves[slot][index] = outgoing;

    if let Some(target) = flag_target {
        place_flag(state, incoming, target);
    }
    if let Some(flag) = flag {
        effect::disappear(state, flag);
    }
    if let Some(commander) = state.entity_mut(outgoing).and_then(Entity::general_mut) {
        commander.flag = None;
    }
    Ok(())
}

/// Casts skill `index` at `target`.
///
/// A successful cast resets that skill and knocks
/// [`BattleConfig::OVERCAST_REDUCTION`] off every cooldown.
pub fn use_skill(
    state: &mut BattleState,
    general: EntityId,
    index: usize,
    target: Position,
) -> Result<(), SkillError> {
    let Some((_, commander)) = profile(state, general) else {
        return Err(SkillError::UnknownSkill { index });
    };
    let chosen = commander
        .skills
        .get(index)
        .ok_or(SkillError::UnknownSkill { index })?
        .clone();
    if !chosen.is_ready() {
        return Err(SkillError::OnCooldown {
            index,
            remaining: chosen.max_cd - chosen.cd,
        });
    }
    if !skill::cast(state, general, &chosen, target) {
        return Err(SkillError::NoEffect { index });
    }

    if let Some(commander) = state.entity_mut(general).and_then(Entity::general_mut) {
        for other in &mut commander.skills {
            other.change_cd(-BattleConfig::OVERCAST_REDUCTION);
        }
        if let Some(used) = commander.skills.get_mut(index) {
            used.reset_cd();
        }
        commander.last_skill_used = Some(index);
    }
    Ok(())
}

/// One tick of a general: statuses, cooldowns, then a step toward the flag
/// or an attack when its clock runs out.
pub fn update(state: &mut BattleState, general: EntityId) {
    if !state.is_alive(general) {
        return;
    }
    status::tick_all(state, general);
    let Some(entity) = state.entity_mut(general).filter(|entity| entity.alive) else {
        return;
    };
    if let Some(commander) = entity.general_mut() {
        for skill in &mut commander.skills {
            skill.tick();
        }
        commander.swap_cd = (commander.swap_cd + 1).min(commander.swap_max_cd);
    }

    if entity.next_action > 0 {
        entity.next_action -= 1;
        return;
    }
    entity.reset_action();
    let position = entity.position;
    if entity
        .general()
        .is_some_and(|commander| commander.rule == GeneralRule::Life && commander.selected() == Tactic::Null)
    {
        live_life(state, general);
        return;
    }

    match flag_position(state, general).filter(|flag| state.grid.is_inside(*flag)) {
        Some(flag) => {
            let dx = step_toward_or_hold(flag.x - position.x);
            let dy = step_toward_or_hold(flag.y - position.y);
            let moved = movement::step(state, general, dx, dy).is_ok();
            let arrived = state.entity(general).is_some_and(|entity| entity.position == flag);
            if !moved || arrived {
                place_flag(state, general, Position::NOWHERE);
            }
        }
        None => {
            if !combat::try_attack(state, general)
                && let Some(entity) = state.entity_mut(general)
            {
                entity.next_action = -1;
            }
        }
    }
}

/// One generation of the life rule over `general`'s side.
///
/// Allied units count as neighbours. An empty passable tile with exactly
/// three of them gets a minion; an allied minion with fewer than two or
/// more than three dies. Births and deaths are decided on the board as it
/// stood before either is applied.
pub(crate) fn live_life(state: &mut BattleState, general: EntityId) {
    const NEIGHBOURS: [(i32, i32); 8] = [(-1, -1), (-1, 0), (-1, 1), (0, -1), (0, 1), (1, -1), (1, 0), (1, 1)];

    let Some(side) = state.entity(general).map(|entity| entity.side) else {
        return;
    };
    let allied = |state: &BattleState, position: Position| {
        state
            .occupant(position)
            .is_some_and(|entity| entity.alive && entity.side == side && state.is_unit(entity.id))
    };

    let mut births = Vec::new();
    let mut deaths = Vec::new();
    for y in 0..state.grid.height() {
        for x in 0..state.grid.width() {
            let tile = Position::new(x, y);
            let neighbours = NEIGHBOURS
                .iter()
                .filter(|&&(dx, dy)| allied(state, tile.offset(dx, dy)))
                .count();
            match state.grid.occupant(tile) {
                None if neighbours == 3 && state.grid.is_passable(tile) => births.push(tile),
                Some(id)
                    if id != general
                        && state.is_minion(id)
                        && allied(state, tile)
                        && !(2..=3).contains(&neighbours) =>
                {
                    deaths.push(id);
                }
                _ => {}
            }
        }
    }

    for tile in births {
        minion::spawn_minion(state, general, tile);
    }
    for id in deaths {
        combat::die(state, id);
    }
    recount_minions(state, general);
}

/// Turns a general carrying a rebirth rule into its second form at full
/// health. The rule is spent. Returns whether the general was spared.
pub(crate) fn rebirth(state: &mut BattleState, general: EntityId) -> bool {
    let Some(entity) = state.entity_mut(general) else {
        return false;
    };
    let Some(commander) = entity.general_mut() else {
        return false;
    };
    if !matches!(commander.rule, GeneralRule::Rebirth(_)) {
        return false;
    }
    let GeneralRule::Rebirth(form) = std::mem::take(&mut commander.rule) else {
        return false;
    };
    let form = *form;
    commander.unit.hp = commander.unit.max_hp;
    commander.unit.name = form.name;
    commander.skills = form.skills;
    commander.last_skill_used = None;
    entity.glyph = form.glyph;
    true
}

/// Lays out up to `count` minions along the general's formation and
/// recounts its live minions. Returns how many were placed.
pub(crate) fn deploy(state: &mut BattleState, general: EntityId, count: i32) -> i32 {
    let Some((entity, commander)) = profile(state, general) else {
        return 0;
    };
    let slots = commander.formation.slots(
        entity.side,
        entity.position.y,
        state.grid.width(),
        state.grid.height(),
    );

    let mut placed = 0;
    for slot in slots {
        if placed >= count {
            break;
        }
        if minion::spawn_minion(state, general, slot).is_some() {
            placed += 1;
        }
    }
    recount_minions(state, general);
    placed
}

pub(crate) fn recount_minions(state: &mut BattleState, general: EntityId) {
    let Some(side) = state.entity(general).map(|entity| entity.side) else {
        return;
    };
    let alive = state.live_minions(side).count() as i32;
    if let Some(commander) = state.entity_mut(general).and_then(Entity::general_mut) {
        commander.minions_alive = alive;
    }
}

/// Opening moves: deploy the starting minions, select tactic 0, and make
/// the swap ready.
pub fn start_battle(state: &mut BattleState, general: EntityId) {
    let Some((_, commander)) = profile(state, general) else {
        return;
    };
    let starting = commander.starting_minions;
    deploy(state, general, starting);
    let _ = command_tactic(state, general, 0);
    if let Some(commander) = state.entity_mut(general).and_then(Entity::general_mut) {
        commander.swap_cd = commander.swap_max_cd;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster;
    use crate::state::Battleground;
    use crate::tactic::Tactic;

    fn battle_with_general(side: Side, at: Position) -> (BattleState, EntityId) {
        let mut state = BattleState::new(Battleground::bordered(60, 43));
        let id = roster::place_general(&mut state, side, &roster::default_general(side), at).unwrap();
        (state, id)
    }

    #[test]
    fn start_battle_deploys_in_rows() {
        let (mut state, general) = battle_with_general(Side::First, Position::new(3, 21));
        start_battle(&mut state, general);

        let commander = state.entity(general).unwrap().general().unwrap();
        assert_eq!(commander.minions_alive, 101);
        assert!(commander.swap_ready());
        assert_eq!(state.occupant(Position::new(5, 21)).unwrap().glyph, 'd');
        assert_eq!(state.live_minions(Side::First).count(), 101);
        state.check_occupancy().unwrap();
    }

    #[test]
    fn toggle_returns_to_the_previous_tactic() {
        let (mut state, general) = battle_with_general(Side::First, Position::new(3, 21));
        command_tactic(&mut state, general, 4).unwrap();
        command_tactic(&mut state, general, 0).unwrap();

        let commander = state.entity(general).unwrap().general().unwrap();
        let back = toggle_target(commander);
        assert_eq!(back, 4);
        command_tactic(&mut state, general, back).unwrap();
        let commander = state.entity(general).unwrap().general().unwrap();
        assert_eq!(commander.selected(), Tactic::GoCenter);
        assert_eq!(toggle_target(commander), 0);
    }

    #[test]
    fn unknown_tactic_is_rejected() {
        let (mut state, general) = battle_with_general(Side::First, Position::new(3, 21));
        assert_eq!(
            command_tactic(&mut state, general, 9),
            Err(TacticError::UnknownTactic {
                index: 9,
                available: 7
            })
        );
    }

    #[test]
    fn general_walks_to_its_flag_and_drops_it() {
        let (mut state, general) = battle_with_general(Side::First, Position::new(10, 10));
        place_flag(&mut state, general, Position::new(12, 10));
        assert_eq!(flag_position(&state, general), Some(Position::new(12, 10)));

        for _ in 0..20 {
            update(&mut state, general);
        }
        assert_eq!(state.entity(general).unwrap().position, Position::new(12, 10));
        assert_eq!(flag_position(&state, general), None);
    }

    #[test]
    fn skill_use_resets_and_overcasts() {
        let (mut state, general) = battle_with_general(Side::First, Position::new(10, 10));
        {
            let commander = state.entity_mut(general).unwrap().general_mut().unwrap();
            for skill in &mut commander.skills {
                skill.cd = skill.max_cd;
            }
        }
        assert_eq!(
            use_skill(&mut state, general, 0, Position::new(30, 30)),
            Err(SkillError::NoEffect { index: 0 })
        );

        use_skill(&mut state, general, 3, Position::NOWHERE).unwrap();
        let commander = state.entity(general).unwrap().general().unwrap();
        assert_eq!(commander.skills[3].cd, 0);
        assert_eq!(commander.skills[0].cd, 45);
        assert_eq!(commander.last_skill_used, Some(3));
        assert_eq!(
            use_skill(&mut state, general, 3, Position::NOWHERE),
            Err(SkillError::OnCooldown {
                index: 3,
                remaining: 50
            })
        );
    }

    #[test]
    fn swap_hands_over_tile_and_flag() {
        let (mut state, general) = battle_with_general(Side::First, Position::new(10, 10));
        let reserve = roster::bench_general(&mut state, Side::First, &roster::default_general(Side::First)).unwrap();
        assert_eq!(swap(&mut state, Side::First, 0), Err(SwapError::NotReady { remaining: 200 }));

        state.entity_mut(general).unwrap().general_mut().unwrap().swap_cd = 200;
        place_flag(&mut state, general, Position::new(20, 10));
        assert_eq!(swap(&mut state, Side::First, 1), Err(SwapError::NoReserve { index: 1 }));
        swap(&mut state, Side::First, 0).unwrap();

        assert_eq!(state.general_id(Side::First), Some(reserve));
        assert_eq!(state.reserves[0], vec![general]);
        let incoming = state.entity(reserve).unwrap();
        assert_eq!(incoming.position, Position::new(10, 10));
        assert_eq!(incoming.next_action, 10);
        assert_eq!(flag_position(&state, reserve), Some(Position::new(20, 10)));
        assert_eq!(flag_position(&state, general), None);
        state.check_occupancy().unwrap();
    }

    fn blinker(state: &mut BattleState, side: Side) {
        let template = crate::state::UnitTemplate::minion("cell", 'c');
        for x in 10..=12 {
            minion::enlist(state, side, &template, Tactic::Null, Position::new(x, 10)).unwrap();
        }
    }

    fn occupied(state: &BattleState, side: Side) -> Vec<Position> {
        let mut cells: Vec<Position> = state.live_minions(side).map(|minion| minion.position).collect();
        cells.sort();
        cells
    }

    #[test]
    fn null_tactic_runs_the_life_rule() {
        let mut state = BattleState::new(Battleground::bordered(30, 20));
        let spec = roster::GeneralSpec::conway('c');
        let general = roster::place_general(&mut state, Side::First, &spec, Position::new(2, 2)).unwrap();
        blinker(&mut state, Side::First);
        command_tactic(&mut state, general, 1).unwrap();

        state.entity_mut(general).unwrap().next_action = 0;
        update(&mut state, general);
        assert_eq!(
            occupied(&state, Side::First),
            vec![Position::new(11, 9), Position::new(11, 10), Position::new(11, 11)]
        );
        assert_eq!(state.entity(general).unwrap().general().unwrap().minions_alive, 3);
        // The general spent its action on the generation and did not move.
        assert_eq!(state.entity(general).unwrap().position, Position::new(2, 2));

        state.entity_mut(general).unwrap().next_action = 0;
        update(&mut state, general);
        assert_eq!(
            occupied(&state, Side::First),
            vec![Position::new(10, 10), Position::new(11, 10), Position::new(12, 10)]
        );
        state.check_occupancy().unwrap();
    }

    #[test]
    fn life_rule_needs_both_the_rule_and_the_null_tactic() {
        let mut state = BattleState::new(Battleground::bordered(30, 20));
        let spec = roster::GeneralSpec::conway('c');
        let general = roster::place_general(&mut state, Side::First, &spec, Position::new(2, 2)).unwrap();
        blinker(&mut state, Side::First);
        state.entity_mut(general).unwrap().next_action = 0;
        update(&mut state, general);
        assert_eq!(
            occupied(&state, Side::First),
            vec![Position::new(10, 10), Position::new(11, 10), Position::new(12, 10)]
        );

        let (mut state, general) = battle_with_general(Side::Second, Position::new(2, 2));
        blinker(&mut state, Side::Second);
        let null = Tactic::DEFAULT_SET.iter().position(|&tactic| tactic == Tactic::Null);
        if let Some(index) = null {
            command_tactic(&mut state, general, index).unwrap();
        }
        state.entity_mut(general).unwrap().next_action = 0;
        update(&mut state, general);
        assert_eq!(state.live_minions(Side::Second).count(), 3);
        assert_eq!(
            occupied(&state, Side::Second),
            vec![Position::new(10, 10), Position::new(11, 10), Position::new(12, 10)]
        );
    }

    #[test]
    fn lethal_blow_reforms_the_emperor_once() {
        let mut state = BattleState::new(Battleground::bordered(30, 20));
        let spec = roster::GeneralSpec::emperor();
        let general = roster::place_general(&mut state, Side::First, &spec, Position::new(5, 5)).unwrap();
        let blow = combat::Strike {
            power: 1_000,
            damage_type: crate::state::DamageType::Magical,
            visual: None,
            credit: combat::KillCredit::default(),
        };

        combat::receive(&mut state, general, blow);
        let entity = state.entity(general).unwrap();
        assert!(entity.alive);
        assert_eq!(entity.glyph, 'N');
        assert_eq!(entity.hp(), Some(60));
        let commander = entity.general().unwrap();
        assert_eq!(commander.unit.name, "Nightspirit");
        assert_eq!(commander.skills.len(), 4);
        assert_eq!(commander.rule, GeneralRule::Standard);

        combat::receive(&mut state, general, blow);
        assert!(!state.is_alive(general));
        assert_eq!(state.grid.occupant(Position::new(5, 5)), None);
    }
}
