//! Tile store: passability, occupancy, and per-tile effect stacks.
//!
//! The grid is the single source of truth for occupancy. Every entity that is
//! on the board is referenced by exactly the tiles of its footprint, and every
//! occupant reference points back at a live entity covering that tile.

use bitflags::bitflags;

use crate::error::{ErrorSeverity, GameError};

use super::{EntityId, Position};

bitflags! {
    /// Static classification of a tile, fixed at construction.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct TileFlags: u8 {
        const PASSABLE        = 1 << 0;
        const FORTRESS_ANCHOR = 1 << 1;
    }
}

/// Glyph for passable floor in map files.
pub const FLOOR_GLYPH: char = '.';
/// Glyph for fortress anchor cells in map files.
pub const FORTRESS_GLYPH: char = ':';
/// Glyph used for the procedurally generated border walls.
pub const WALL_GLYPH: char = '#';

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tile {
    pub position: Position,
    pub glyph: char,
    pub flags: TileFlags,
    /// Entity standing on this tile. Non-owning: entities live in the roster.
    pub occupant: Option<EntityId>,
    /// Effects on this tile, most recent last.
    pub effects: Vec<EntityId>,
}

impl Tile {
    pub fn new(position: Position, glyph: char, flags: TileFlags) -> Self {
        Self {
            position,
            glyph,
            flags,
            occupant: None,
            effects: Vec::new(),
        }
    }

    pub fn floor(position: Position) -> Self {
        Self::new(position, FLOOR_GLYPH, TileFlags::PASSABLE)
    }

    pub fn wall(position: Position) -> Self {
        Self::new(position, WALL_GLYPH, TileFlags::empty())
    }

    #[inline]
    pub fn is_passable(&self) -> bool {
        self.flags.contains(TileFlags::PASSABLE)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.occupant.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MapError {
    #[error("map contains no rows")]
    Empty,

    #[error("map row {row} has {found} columns, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
}

impl GameError for MapError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Empty => "MAP_EMPTY",
            Self::Ragged { .. } => "MAP_RAGGED",
        }
    }
}

/// Fixed-size rectangular arena.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Battleground {
    width: i32,
    height: i32,
    /// Row-major tiles, `index = y * width + x`.
    tiles: Vec<Tile>,
    /// Impassable stand-in returned for every out-of-range lookup.
    sentinel: Tile,
}

impl Battleground {
    /// Open arena of floor tiles ringed by walls.
    pub fn bordered(width: i32, height: i32) -> Self {
        let mut tiles = Vec::with_capacity((width.max(0) * height.max(0)) as usize);
        for y in 0..height {
            for x in 0..width {
                let position = Position::new(x, y);
                if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
                    tiles.push(Tile::wall(position));
                } else {
                    tiles.push(Tile::floor(position));
                }
            }
        }
        Self::from_tiles(width, height, tiles)
    }

    /// Open arena with no border walls at all. Mostly useful for geometry tests.
    pub fn open(width: i32, height: i32) -> Self {
        let tiles = (0..height)
            .flat_map(|y| (0..width).map(move |x| Tile::floor(Position::new(x, y))))
            .collect();
        Self::from_tiles(width, height, tiles)
    }

    /// Parses a text map: one row per line, `.` is floor, `:` marks a
    /// fortress anchor, anything else is wall.
    pub fn parse(text: &str) -> Result<Self, MapError> {
        let rows: Vec<&str> = text
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty())
            .collect();
        let first = rows.first().ok_or(MapError::Empty)?;
        let width = first.chars().count();

        let mut tiles = Vec::with_capacity(width * rows.len());
        for (y, row) in rows.iter().enumerate() {
            let found = row.chars().count();
            if found != width {
                return Err(MapError::Ragged {
                    row: y,
                    expected: width,
                    found,
                });
            }
            for (x, glyph) in row.chars().enumerate() {
                let mut flags = TileFlags::empty();
                if glyph == FLOOR_GLYPH {
                    flags |= TileFlags::PASSABLE;
                }
                if glyph == FORTRESS_GLYPH {
                    flags |= TileFlags::FORTRESS_ANCHOR;
                }
                tiles.push(Tile::new(Position::new(x as i32, y as i32), glyph, flags));
            }
        }

        Ok(Self::from_tiles(width as i32, rows.len() as i32, tiles))
    }

    fn from_tiles(width: i32, height: i32, tiles: Vec<Tile>) -> Self {
        Self {
            width,
            height,
            tiles,
            sentinel: Tile::new(Position::NOWHERE, ' ', TileFlags::empty()),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn is_inside(&self, position: Position) -> bool {
        (0..self.width).contains(&position.x) && (0..self.height).contains(&position.y)
    }

    fn index(&self, position: Position) -> Option<usize> {
        self.is_inside(position)
            .then(|| (position.y * self.width + position.x) as usize)
    }

    /// Tile at `position`, or the sentinel tile when out of range.
    pub fn tile(&self, position: Position) -> &Tile {
        match self.index(position) {
            Some(index) => &self.tiles[index],
            None => &self.sentinel,
        }
    }

    /// Mutable tile access; the sentinel is never handed out.
    pub fn tile_mut(&mut self, position: Position) -> Option<&mut Tile> {
        let index = self.index(position)?;
        self.tiles.get_mut(index)
    }

    pub fn occupant(&self, position: Position) -> Option<EntityId> {
        self.tile(position).occupant
    }

    pub fn is_passable(&self, position: Position) -> bool {
        self.tile(position).is_passable()
    }

    /// Every in-bounds tile in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.tiles.iter().map(|tile| tile.position)
    }

    pub fn fortress_anchors(&self) -> Vec<Position> {
        self.tiles
            .iter()
            .filter(|tile| tile.flags.contains(TileFlags::FORTRESS_ANCHOR))
            .map(|tile| tile.position)
            .collect()
    }

    pub(crate) fn set_occupant(&mut self, position: Position, occupant: Option<EntityId>) {
        if let Some(tile) = self.tile_mut(position) {
            tile.occupant = occupant;
        }
    }

    /// Clears `position` only if it is currently held by `id`.
    pub(crate) fn release(&mut self, position: Position, id: EntityId) {
        if let Some(tile) = self.tile_mut(position)
            && tile.occupant == Some(id)
        {
            tile.occupant = None;
        }
    }

    pub(crate) fn push_effect(&mut self, position: Position, id: EntityId) {
        if let Some(tile) = self.tile_mut(position) {
            tile.effects.push(id);
        }
    }

    pub(crate) fn remove_effect(&mut self, position: Position, id: EntityId) {
        if let Some(tile) = self.tile_mut(position)
            && let Some(index) = tile.effects.iter().position(|effect| *effect == id)
        {
            tile.effects.remove(index);
        }
    }
}
