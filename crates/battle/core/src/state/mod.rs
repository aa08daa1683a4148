//! Authoritative battle state representation.
//!
//! [`BattleState`] owns every entity (in one id-keyed map), the tile grid, and
//! the per-side rosters. Rosters hold ids only; an id stays in its roster after
//! death until the periodic sweep compacts it, so roster readers filter on
//! `alive`. Runtime layers clone or query this state but mutate it exclusively
//! through [`crate::Battle`].
mod common;
mod effect;
mod entity;
mod grid;
mod skill;
mod status;

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

pub use common::{
    Armor, DamageType, EntityId, Position, Side, step_toward, step_toward_or_hold,
};
pub use effect::{Effect, EffectKind};
pub use entity::{
    Deployment, Entity, EntityKind, Fortress, General, GeneralRule, RebirthForm, Unit, UnitClass,
    UnitTemplate,
};
pub use grid::{
    Battleground, FLOOR_GLYPH, FORTRESS_GLYPH, MapError, Tile, TileFlags, WALL_GLYPH,
};
pub use skill::{MinionPattern, Placeable, Skill, SkillCategory, SkillEffect};
pub use status::{Status, StatusKind, StatusList};

pub(crate) use entity::{attack_glyph, footprint};

/// Broken occupancy link found by [`BattleState::check_occupancy`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum OccupancyError {
    #[error("tile {position} references unknown entity {occupant}")]
    UnknownOccupant { position: Position, occupant: EntityId },

    #[error("tile {position} references dead entity {occupant}")]
    DeadOccupant { position: Position, occupant: EntityId },

    #[error("tile {position} holds {occupant} whose footprint does not cover it")]
    Misplaced { position: Position, occupant: EntityId },

    #[error("entity {id} is on the board but tile {position} does not reference it")]
    Unreferenced { id: EntityId, position: Position },
}

/// Canonical snapshot of a battle.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleState {
    /// Sequential id allocator. Ids are never reused.
    next_entity_id: u32,

    /// Current turn number.
    pub turn: u64,
    pub grid: Battleground,
    /// Every entity tracked by the battle, including dead ones awaiting the sweep.
    pub entities: BTreeMap<EntityId, Entity>,
    /// Active general per side. `None` while the side's general is hosted.
    pub generals: [Option<EntityId>; 2],
    /// Benched generals per side, in swap order.
    pub reserves: [Vec<EntityId>; 2],
    /// Rank-and-file units of both sides, in spawn order.
    pub minions: Vec<EntityId>,
    /// Transient effects, in spawn order.
    pub effects: Vec<EntityId>,
    pub fortresses: Vec<EntityId>,
}

impl BattleState {
    pub fn new(grid: Battleground) -> Self {
        Self {
            next_entity_id: 1,
            turn: 0,
            grid,
            entities: BTreeMap::new(),
            generals: [None, None],
            reserves: [Vec::new(), Vec::new()],
            minions: Vec::new(),
            effects: Vec::new(),
            fortresses: Vec::new(),
        }
    }

    pub(crate) fn allocate_id(&mut self) -> EntityId {
        let id = EntityId(self.next_entity_id);
        self.next_entity_id += 1;
        id
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.entity(id).is_some_and(|entity| entity.alive)
    }

    /// Entity standing on `position`, if any.
    pub fn occupant(&self, position: Position) -> Option<&Entity> {
        self.grid
            .occupant(position)
            .and_then(|id| self.entities.get(&id))
    }

    pub fn general_id(&self, side: Side) -> Option<EntityId> {
        side.index().and_then(|index| self.generals[index])
    }

    /// Active general of `side`, dead or alive.
    pub fn general(&self, side: Side) -> Option<&Entity> {
        self.general_id(side).and_then(|id| self.entity(id))
    }

    pub fn is_minion(&self, id: EntityId) -> bool {
        self.minions.contains(&id)
    }

    /// Whether `id` is a minion or an active general.
    pub fn is_unit(&self, id: EntityId) -> bool {
        self.is_minion(id) || self.generals.contains(&Some(id))
    }

    pub fn live_minions(&self, side: Side) -> impl Iterator<Item = &Entity> {
        self.minions
            .iter()
            .filter_map(|id| self.entities.get(id))
            .filter(move |entity| entity.alive && entity.side == side)
    }

    pub fn live_effects(&self) -> impl Iterator<Item = &Entity> {
        self.effects
            .iter()
            .filter_map(|id| self.entities.get(id))
            .filter(|entity| entity.alive)
    }

    /// Drops dead minions and finished effects from the rosters and the
    /// entity map. Dead entities are already unlinked from their tiles.
    pub(crate) fn sweep(&mut self) {
        let entities = &self.entities;
        let is_live = |id: &EntityId| entities.get(id).is_some_and(|entity| entity.alive);
        let dead: Vec<EntityId> = self
            .minions
            .iter()
            .chain(self.effects.iter())
            .filter(|id| !is_live(id))
            .copied()
            .collect();

        self.minions.retain(|id| !dead.contains(id));
        self.effects.retain(|id| !dead.contains(id));
        for id in dead {
            self.entities.remove(&id);
        }
    }

    /// Verifies that every occupant reference points at a live entity whose
    /// footprint covers the tile, and that every on-board entity is
    /// referenced by each tile of its footprint.
    pub fn check_occupancy(&self) -> Result<(), OccupancyError> {
        for tile in self.grid.tiles() {
            let Some(occupant) = tile.occupant else {
                continue;
            };
            let entity = self
                .entities
                .get(&occupant)
                .ok_or(OccupancyError::UnknownOccupant {
                    position: tile.position,
                    occupant,
                })?;
            if !entity.alive {
                return Err(OccupancyError::DeadOccupant {
                    position: tile.position,
                    occupant,
                });
            }
            if !entity.footprint().contains(&tile.position) {
                return Err(OccupancyError::Misplaced {
                    position: tile.position,
                    occupant,
                });
            }
        }

        for entity in self.entities.values().filter(|entity| entity.is_on_board()) {
            for position in entity.footprint() {
                if self.grid.occupant(position) != Some(entity.id) {
                    return Err(OccupancyError::Unreferenced {
                        id: entity.id,
                        position,
                    });
                }
            }
        }
        Ok(())
    }

    /// SHA-256 over the canonical gameplay fields: turn, every entity's
    /// position, liveness, clock, hp and kill count, and tile occupancy.
    ///
    /// Two battles fed the same actions produce the same digest.
    pub fn digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.turn.to_le_bytes());
        for (id, entity) in &self.entities {
            hasher.update(id.0.to_le_bytes());
            hasher.update([side_byte(entity.side), u8::from(entity.alive)]);
            hasher.update(entity.position.x.to_le_bytes());
            hasher.update(entity.position.y.to_le_bytes());
            hasher.update(entity.next_action.to_le_bytes());
            hasher.update(entity.hp().unwrap_or(0).to_le_bytes());
            hasher.update(entity.kills.to_le_bytes());
            for name in entity.statuses.names() {
                hasher.update(name.as_bytes());
            }
        }
        for tile in self.grid.tiles() {
            hasher.update(tile.occupant.map_or(0, |id| id.0).to_le_bytes());
        }
        hasher.finalize().into()
    }
}

fn side_byte(side: Side) -> u8 {
    match side {
        Side::First => 0,
        Side::Second => 1,
        Side::Neutral => 2,
    }
}
