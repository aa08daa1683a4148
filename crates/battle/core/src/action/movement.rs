//! Single-step movement, push chains, teleports, and board placement.
//!
//! Every helper here keeps the grid and the entity positions in lock-step:
//! a move is fully validated (including the whole push chain) before any
//! tile is touched, so a rejected move leaves the board unchanged.

use crate::error::{ErrorSeverity, GameError};
use crate::state::{BattleState, Entity, EntityId, Position};

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MoveError {
    #[error("entity {0} not found")]
    EntityNotFound(EntityId),

    #[error("entity {0} is not on the board")]
    OffBoard(EntityId),

    #[error("entity {0} was shoved and loses this move")]
    Pushed(EntityId),

    #[error("destination {destination} is blocked")]
    Blocked { destination: Position },

    #[error("destination {destination} is held by non-ally {occupant}")]
    Occupied {
        destination: Position,
        occupant: EntityId,
    },

    #[error("push chain through {destination} cannot resolve")]
    PushRejected { destination: Position },
}

impl GameError for MoveError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::EntityNotFound(_) => ErrorSeverity::Internal,
            _ => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::EntityNotFound(_) => "MOVE_ENTITY_NOT_FOUND",
            Self::OffBoard(_) => "MOVE_OFF_BOARD",
            Self::Pushed(_) => "MOVE_PUSHED",
            Self::Blocked { .. } => "MOVE_BLOCKED",
            Self::Occupied { .. } => "MOVE_OCCUPIED",
            Self::PushRejected { .. } => "MOVE_PUSH_REJECTED",
        }
    }
}

/// Whether `id` can be shoved one step by `(dx, dy)`.
///
/// The next tile must be passable and either empty or held by an ally that
/// can itself be shoved the same way. Generals, big units, fortresses and
/// effects never move when pushed.
pub fn can_be_pushed(state: &BattleState, id: EntityId, dx: i32, dy: i32) -> bool {
    let Some(entity) = state.entity(id) else {
        return false;
    };
    if !entity.is_pushable() {
        return false;
    }
    let next = entity.position.offset(dx, dy);
    if !state.grid.is_passable(next) {
        return false;
    }
    match state.occupant(next) {
        None => true,
        Some(other) => {
            other.id != id && other.is_ally(entity) && can_be_pushed(state, other.id, dx, dy)
        }
    }
}

/// Checks every tile of the destination footprint, push chains included.
pub fn check_move(state: &BattleState, id: EntityId, dx: i32, dy: i32) -> Result<(), MoveError> {
    let entity = state.entity(id).ok_or(MoveError::EntityNotFound(id))?;
    if !entity.is_on_board() {
        return Err(MoveError::OffBoard(id));
    }

    for destination in entity.footprint_at(entity.position.offset(dx, dy)) {
        if !state.grid.is_passable(destination) {
            return Err(MoveError::Blocked { destination });
        }
        let Some(occupant) = state.occupant(destination) else {
            continue;
        };
        if occupant.id == id {
            continue;
        }
        if !occupant.is_ally(entity) {
            return Err(MoveError::Occupied {
                destination,
                occupant: occupant.id,
            });
        }
        if !can_be_pushed(state, occupant.id, dx, dy) {
            return Err(MoveError::PushRejected { destination });
        }
    }
    Ok(())
}

pub fn can_move(state: &BattleState, id: EntityId, dx: i32, dy: i32) -> bool {
    check_move(state, id, dx, dy).is_ok()
}

/// Moves `id` one step, shoving allies out of the way first.
///
/// A unit that was shoved since its last own move consumes that flag
/// instead of moving.
pub fn step(state: &mut BattleState, id: EntityId, dx: i32, dy: i32) -> Result<(), MoveError> {
    let entity = state.entity_mut(id).ok_or(MoveError::EntityNotFound(id))?;
    if entity.pushed {
        entity.pushed = false;
        return Err(MoveError::Pushed(id));
    }
    check_move(state, id, dx, dy)?;

    let (origin, cells) = {
        let entity = state.entity(id).ok_or(MoveError::EntityNotFound(id))?;
        let destination = entity.position.offset(dx, dy);
        (entity.position, entity.footprint_at(destination))
    };

    let mut shoved: Vec<EntityId> = Vec::new();
    for cell in &cells {
        if let Some(occupant) = state.grid.occupant(*cell)
            && occupant != id
            && !shoved.contains(&occupant)
        {
            shoved.push(occupant);
        }
    }
    for other in shoved {
        get_pushed(state, other, dx, dy);
    }

    if let Some(cell) = cells.iter().find(|cell| {
        state
            .grid
            .occupant(**cell)
            .is_some_and(|occupant| occupant != id)
    }) {
        return Err(MoveError::PushRejected { destination: *cell });
    }

    vacate(state, id);
    if let Some(entity) = state.entity_mut(id) {
        entity.position = origin.offset(dx, dy);
        if dx != 0 {
            entity.facing = dx.signum();
        }
    }
    claim(state, id);
    Ok(())
}

/// Shoves `id` one step and marks it so its next own move is skipped.
pub(crate) fn get_pushed(state: &mut BattleState, id: EntityId, dx: i32, dy: i32) {
    if let Some(entity) = state.entity_mut(id) {
        entity.pushed = false;
    }
    let _ = step(state, id, dx, dy);
    if let Some(entity) = state.entity_mut(id) {
        entity.pushed = true;
    }
}

/// Jumps `id` to `destination`, ignoring push rules. Every footprint tile
/// must be inside, passable, and empty.
pub fn teleport(state: &mut BattleState, id: EntityId, destination: Position) -> Result<(), MoveError> {
    let entity = state.entity(id).ok_or(MoveError::EntityNotFound(id))?;
    for cell in entity.footprint_at(destination) {
        if !state.grid.is_inside(cell) || !state.grid.is_passable(cell) {
            return Err(MoveError::Blocked { destination: cell });
        }
        if let Some(occupant) = state.grid.occupant(cell)
            && occupant != id
        {
            return Err(MoveError::Occupied {
                destination: cell,
                occupant,
            });
        }
    }

    vacate(state, id);
    let half_width = state.grid.width() / 2;
    if let Some(entity) = state.entity_mut(id) {
        entity.position = destination;
        entity.facing = if destination.x >= half_width { -1 } else { 1 };
    }
    claim(state, id);
    Ok(())
}

/// Whether a body of side `length` fits at `anchor` on free floor.
pub fn fits(state: &BattleState, anchor: Position, length: i32) -> bool {
    crate::state::footprint(anchor, length).into_iter().all(|cell| {
        state.grid.is_inside(cell) && state.grid.is_passable(cell) && state.grid.occupant(cell).is_none()
    })
}

/// Adds a board entity (anything but an effect) at its own position.
///
/// Returns `None`, leaving the state untouched, when the footprint does not fit.
pub(crate) fn spawn(state: &mut BattleState, mut entity: Entity) -> Option<EntityId> {
    if !fits(state, entity.position, entity.footprint_len()) {
        return None;
    }
    let id = state.allocate_id();
    entity.id = id;
    state.entities.insert(id, entity);
    claim(state, id);
    Some(id)
}

/// Releases every tile of `id`'s footprint that still points at it.
pub(crate) fn vacate(state: &mut BattleState, id: EntityId) {
    let Some(entity) = state.entity(id) else {
        return;
    };
    for cell in entity.footprint() {
        state.grid.release(cell, id);
    }
}

pub(crate) fn claim(state: &mut BattleState, id: EntityId) {
    let Some(entity) = state.entity(id) else {
        return;
    };
    if entity.position.is_nowhere() {
        return;
    }
    for cell in entity.footprint() {
        state.grid.set_occupant(cell, Some(id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Battleground, EntityKind, Side, UnitTemplate};
    use crate::tactic::Tactic;

    fn minion(side: Side, position: Position) -> Entity {
        let unit = UnitTemplate::default().instantiate(side, Tactic::Stop);
        Entity::new(EntityId::default(), side, position, 'm', EntityKind::Unit(unit))
    }

    fn spawn_minion(state: &mut BattleState, side: Side, x: i32, y: i32) -> EntityId {
        let id = spawn(state, minion(side, Position::new(x, y))).unwrap();
        state.minions.push(id);
        id
    }

    #[test]
    fn step_into_empty_floor() {
        let mut state = BattleState::new(Battleground::bordered(8, 5));
        let a = spawn_minion(&mut state, Side::First, 2, 2);
        step(&mut state, a, 1, 0).unwrap();
        assert_eq!(state.entity(a).unwrap().position, Position::new(3, 2));
        assert_eq!(state.grid.occupant(Position::new(2, 2)), None);
        assert_eq!(state.grid.occupant(Position::new(3, 2)), Some(a));
        state.check_occupancy().unwrap();
    }

    #[test]
    fn walls_and_enemies_block() {
        let mut state = BattleState::new(Battleground::bordered(8, 5));
        let a = spawn_minion(&mut state, Side::First, 1, 2);
        let enemy = spawn_minion(&mut state, Side::Second, 1, 3);
        assert!(matches!(step(&mut state, a, -1, 0), Err(MoveError::Blocked { .. })));
        assert_eq!(
            step(&mut state, a, 0, 1),
            Err(MoveError::Occupied {
                destination: Position::new(1, 3),
                occupant: enemy
            })
        );
    }

    #[test]
    fn allies_are_shoved_and_lose_their_next_move() {
        let mut state = BattleState::new(Battleground::bordered(8, 5));
        let a = spawn_minion(&mut state, Side::First, 2, 2);
        let b = spawn_minion(&mut state, Side::First, 3, 2);
        step(&mut state, a, 1, 0).unwrap();
        assert_eq!(state.entity(a).unwrap().position, Position::new(3, 2));
        assert_eq!(state.entity(b).unwrap().position, Position::new(4, 2));
        assert!(state.entity(b).unwrap().pushed);

        assert_eq!(step(&mut state, b, 1, 0), Err(MoveError::Pushed(b)));
        step(&mut state, b, 1, 0).unwrap();
        state.check_occupancy().unwrap();
    }

    #[test]
    fn blocked_chain_moves_nobody() {
        let mut state = BattleState::new(Battleground::bordered(6, 5));
        let a = spawn_minion(&mut state, Side::First, 2, 2);
        let b = spawn_minion(&mut state, Side::First, 3, 2);
        let c = spawn_minion(&mut state, Side::First, 4, 2);
        assert!(matches!(
            step(&mut state, a, 1, 0),
            Err(MoveError::PushRejected { .. })
        ));
        assert_eq!(state.entity(a).unwrap().position, Position::new(2, 2));
        assert_eq!(state.entity(b).unwrap().position, Position::new(3, 2));
        assert_eq!(state.entity(c).unwrap().position, Position::new(4, 2));
        assert!(!state.entity(b).unwrap().pushed);
        state.check_occupancy().unwrap();
    }

    #[test]
    fn teleport_requires_free_floor() {
        let mut state = BattleState::new(Battleground::bordered(8, 5));
        let a = spawn_minion(&mut state, Side::First, 2, 2);
        let b = spawn_minion(&mut state, Side::Second, 5, 2);
        assert!(teleport(&mut state, a, Position::new(0, 0)).is_err());
        assert!(teleport(&mut state, a, Position::new(5, 2)).is_err());
        teleport(&mut state, a, Position::new(5, 3)).unwrap();
        assert_eq!(state.grid.occupant(Position::new(5, 3)), Some(a));
        assert_eq!(state.grid.occupant(Position::new(5, 2)), Some(b));
        state.check_occupancy().unwrap();
    }

    #[test]
    fn big_units_move_their_whole_body() {
        let mut state = BattleState::new(Battleground::bordered(10, 8));
        let unit = UnitTemplate::big("giant", 'G', 2).instantiate(Side::First, Tactic::Stop);
        let giant = spawn(
            &mut state,
            Entity::new(EntityId::default(), Side::First, Position::new(2, 2), 'G', EntityKind::Unit(unit)),
        )
        .unwrap();
        let ally = spawn_minion(&mut state, Side::First, 4, 3);

        step(&mut state, giant, 1, 0).unwrap();
        assert_eq!(state.grid.occupant(Position::new(2, 2)), None);
        assert_eq!(state.grid.occupant(Position::new(4, 3)), Some(giant));
        assert_eq!(state.entity(ally).unwrap().position, Position::new(5, 3));
        assert!(!can_be_pushed(&state, giant, 1, 0));
        state.check_occupancy().unwrap();
    }
}
