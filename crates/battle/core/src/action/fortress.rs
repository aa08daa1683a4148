//! Fortress construction, adjacency, and hosting.
//!
//! Fortresses stand on anchor tiles, which are impassable, so they bypass
//! the usual placement checks and only require their footprint to be free.

use std::collections::BTreeSet;

use crate::state::{
    BattleState, Entity, EntityId, EntityKind, FORTRESS_GLYPH, Fortress, Position, Side,
};

use super::error::HostError;
use super::movement;

/// Glyph shown for an empty guest slot.
const EMPTY_SLOT: char = FORTRESS_GLYPH;

/// Raises a fortress at every anchor of the grid, in row-major order, then
/// links them. Anchors covered by an earlier fortress are skipped.
pub(crate) fn build_all(state: &mut BattleState) {
    for anchor in state.grid.fortress_anchors() {
        let cells = crate::state::footprint(anchor, Fortress::LENGTH);
        let free = cells
            .iter()
            .all(|cell| state.grid.is_inside(*cell) && state.grid.occupant(*cell).is_none());
        if !free {
            continue;
        }

        let id = state.allocate_id();
        let entity = Entity::new(
            id,
            Side::Neutral,
            anchor,
            EMPTY_SLOT,
            EntityKind::Fortress(Fortress::new()),
        );
        state.entities.insert(id, entity);
        movement::claim(state, id);
        state.fortresses.push(id);
    }

    let fortresses = state.fortresses.clone();
    for fortress in fortresses {
        let connections = connections(state, fortress);
        if let Some(profile) = state.entity_mut(fortress).and_then(Entity::fortress_mut) {
            profile.connections = connections;
        }
    }
}

/// Flood-fills passable floor from each tile of the ring around `fortress`
/// and records every other fortress touched, with the ring tile the search
/// started from.
fn connections(state: &BattleState, fortress: EntityId) -> Vec<(EntityId, Position)> {
    let Some(entity) = state.entity(fortress) else {
        return Vec::new();
    };
    let origin = entity.position;
    let mut checked: BTreeSet<Position> = entity.footprint().into_iter().collect();
    let starts: Vec<Position> = (-1..=Fortress::LENGTH)
        .flat_map(|i| (-1..=Fortress::LENGTH).map(move |j| origin.offset(i, j)))
        .filter(|tile| state.grid.is_passable(*tile) && !checked.contains(tile))
        .collect();

    let mut found: Vec<(EntityId, Position)> = Vec::new();
    for start in starts {
        // Already flooded from an earlier ring tile.
        if !checked.insert(start) {
            continue;
        }
        let mut frontier = vec![start];
        while let Some(tile) = frontier.pop() {
            for i in -1..=1 {
                for j in -1..=1 {
                    let next = tile.offset(i, j);
                    if !state.grid.is_inside(next) {
                        continue;
                    }
                    if let Some(other) = state.grid.occupant(next)
                        && other != fortress
                        && state.fortresses.contains(&other)
                        && !found.iter().any(|(known, _)| *known == other)
                    {
                        found.push((other, start));
                    }
                    if state.grid.is_passable(next) && checked.insert(next) {
                        frontier.push(next);
                    }
                }
            }
        }
    }
    found
}

/// Whether `fortress` accepts guests from `side`.
pub fn can_host(state: &BattleState, fortress: EntityId, side: Side) -> bool {
    state
        .entity(fortress)
        .is_some_and(|entity| entity.side == side || entity.side == Side::Neutral)
}

/// Takes `general` off the board and into `fortress`. An empty fortress
/// adopts its first guest's side.
pub fn host(state: &mut BattleState, fortress: EntityId, general: EntityId) -> Result<(), HostError> {
    let profile = state
        .entity(fortress)
        .and_then(Entity::fortress)
        .ok_or(HostError::NotAFortress)?;
    let guest = state
        .entity(general)
        .filter(|entity| entity.alive && entity.is_general())
        .ok_or(HostError::NotAGeneral)?;
    let side = guest.side;
    let slot = side.index().ok_or(HostError::NotAGeneral)?;
    if state.generals[slot] != Some(general) {
        return Err(HostError::NotAGeneral);
    }
    if !can_host(state, fortress, side) {
        let owner = state.entity(fortress).map_or(Side::Neutral, |entity| entity.side);
        return Err(HostError::WrongSide { owner });
    }
    if profile.is_full() {
        return Err(HostError::Full);
    }

    movement::vacate(state, general);
    if let Some(entity) = state.entity_mut(general) {
        entity.position = Position::NOWHERE;
    }
    state.generals[slot] = None;
    if let Some(entity) = state.entity_mut(fortress) {
        entity.side = side;
        if let Some(profile) = entity.fortress_mut() {
            profile.guests.push(general);
        }
    }
    refresh_glyphs(state, fortress);
    Ok(())
}

/// Puts `general` back on the first free tile around `fortress` and makes it
/// its side's active general again. The last guest leaving turns the
/// fortress neutral.
pub fn unhost(state: &mut BattleState, fortress: EntityId, general: EntityId) -> Result<(), HostError> {
    let entity = state.entity(fortress).ok_or(HostError::NotAFortress)?;
    let profile = entity.fortress().ok_or(HostError::NotAFortress)?;
    if !profile.guests.contains(&general) {
        return Err(HostError::NotAGuest);
    }
    let origin = entity.position;
    let side = state
        .entity(general)
        .map(|guest| guest.side)
        .ok_or(HostError::NotAGuest)?;
    let slot = side.index().ok_or(HostError::NotAGuest)?;
    if state.generals[slot].is_some_and(|active| state.is_alive(active)) {
        return Err(HostError::SeatTaken { side });
    }

    let exit = (-1..=Fortress::LENGTH)
        .flat_map(|i| (-1..=Fortress::LENGTH).map(move |j| origin.offset(i, j)))
        .find(|tile| movement::fits(state, *tile, 1))
        .ok_or(HostError::NoRoom)?;

    if let Some(entity) = state.entity_mut(general) {
        entity.position = exit;
    }
    movement::claim(state, general);
    state.generals[slot] = Some(general);
    if let Some(entity) = state.entity_mut(fortress) {
        if let Some(profile) = entity.fortress_mut() {
            profile.guests.retain(|guest| *guest != general);
        }
        if entity.fortress().is_some_and(|profile| profile.guests.is_empty()) {
            entity.side = Side::Neutral;
        }
    }
    refresh_glyphs(state, fortress);
    Ok(())
}

/// Re-derives the slot glyphs from the current guests.
pub fn refresh_glyphs(state: &mut BattleState, fortress: EntityId) {
    let Some(guests) = state
        .entity(fortress)
        .and_then(Entity::fortress)
        .map(|profile| profile.guests.clone())
    else {
        return;
    };
    let glyphs: Vec<char> = guests
        .iter()
        .map(|guest| state.entity(*guest).map_or(EMPTY_SLOT, |entity| entity.glyph))
        .collect();
    if let Some(profile) = state.entity_mut(fortress).and_then(Entity::fortress_mut) {
        for (index, slot) in profile.glyphs.iter_mut().enumerate() {
            *slot = glyphs.get(index).copied().unwrap_or(EMPTY_SLOT);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster;
    use crate::state::Battleground;

    const MAP: &str = "\
##########
#::....::#
#::....::#
#........#
##########
";

    #[test]
    fn anchors_raise_linked_fortresses() {
        let mut state = BattleState::new(Battleground::parse(MAP).unwrap());
        build_all(&mut state);

        assert_eq!(state.fortresses.len(), 2);
        let first = state.entity(state.fortresses[0]).unwrap();
        assert_eq!(first.position, Position::new(1, 1));
        let links = &first.fortress().unwrap().connections;
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].0, state.fortresses[1]);
        state.check_occupancy().unwrap();
    }

    #[test]
    fn walls_split_fortress_links() {
        let map = "\
##############
#::....::#.::#
#::....::#.::#
#........#...#
##############
";
        let mut state = BattleState::new(Battleground::parse(map).unwrap());
        build_all(&mut state);
        assert_eq!(state.fortresses.len(), 3);

        let at = |x: i32| {
            let id = state.grid.occupant(Position::new(x, 1)).unwrap();
            (id, state.entity(id).unwrap().fortress().unwrap().connections.clone())
        };
        let (left, left_links) = at(1);
        let (middle, middle_links) = at(7);
        let (_, right_links) = at(11);
        assert_eq!(left_links, vec![(middle, Position::new(1, 3))]);
        assert_eq!(middle_links, vec![(left, Position::new(6, 1))]);
        assert!(right_links.is_empty());
    }

    #[test]
    fn hosting_round_trip() {
        let mut state = BattleState::new(Battleground::parse(MAP).unwrap());
        build_all(&mut state);
        let fortress = state.fortresses[0];
        let spec = roster::default_general(Side::Second);
        let general = roster::place_general(&mut state, Side::Second, &spec, Position::new(4, 3)).unwrap();

        host(&mut state, fortress, general).unwrap();
        assert_eq!(state.general_id(Side::Second), None);
        assert_eq!(state.entity(fortress).unwrap().side, Side::Second);
        assert_eq!(state.entity(fortress).unwrap().fortress().unwrap().glyphs[0], 'G');
        assert!(!can_host(&state, fortress, Side::First));
        state.check_occupancy().unwrap();

        unhost(&mut state, fortress, general).unwrap();
        assert_eq!(state.general_id(Side::Second), Some(general));
        assert_eq!(state.entity(fortress).unwrap().side, Side::Neutral);
        assert_eq!(state.entity(general).unwrap().position, Position::new(1, 3));
        assert_eq!(state.entity(fortress).unwrap().fortress().unwrap().glyphs[0], ':');
        state.check_occupancy().unwrap();
    }
}
