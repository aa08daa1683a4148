//! Arena layout loader.
//!
//! One row per line: `.` is floor, `:` marks a fortress anchor, anything
//! else is wall. Fortresses are raised when the battle is built.

use std::path::Path;

use skirmish_core::Battleground;

use crate::loaders::{LoadResult, read_file};

/// Loader for text map files.
pub struct MapLoader;

impl MapLoader {
    /// Load a battleground from a map file.
    pub fn load(path: &Path) -> LoadResult<Battleground> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse map {}: {}", path.display(), e))
    }

    /// Parse an in-memory map.
    pub fn parse(content: &str) -> LoadResult<Battleground> {
        Ok(Battleground::parse(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::Position;

    #[test]
    fn parses_walls_floor_and_anchors() {
        let grid = MapLoader::parse("#####\n#.:.#\n#####\n").unwrap();
        assert_eq!((grid.width(), grid.height()), (5, 3));
        assert!(grid.is_passable(Position::new(1, 1)));
        assert!(!grid.is_passable(Position::new(0, 1)));
        assert_eq!(grid.fortress_anchors(), vec![Position::new(2, 1)]);
    }

    #[test]
    fn ragged_maps_are_rejected() {
        let error = MapLoader::parse("####\n#..\n####\n").unwrap_err();
        assert!(error.to_string().contains("columns"));
    }
}
