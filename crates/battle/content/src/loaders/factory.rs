//! Content factory for building battle setups from data files.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use skirmish_core::{BattleConfig, BattleSetup, Battleground, GeneralSpec};

use crate::loaders::{ConfigLoader, LoadResult, MapLoader, RosterLoader};

/// Content factory that loads all battle content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── battle.toml
/// ├── roster.ron
/// └── maps/
///     ├── arena.txt
///     └── keep.txt
/// ```
///
/// Every file is optional except a map that is asked for by name.
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub const CONFIG_FILE: &'static str = "battle.toml";
    pub const ROSTER_FILE: &'static str = "roster.ron";
    pub const MAPS_DIR: &'static str = "maps";

    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Load battle rules from `battle.toml`, or the defaults without one.
    pub fn load_config(&self) -> LoadResult<BattleConfig> {
        let path = self.data_dir.join(Self::CONFIG_FILE);
        if !path.exists() {
            return Ok(BattleConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load one table of `battle.toml`, or its default without one.
    pub fn load_table<T>(&self, table: &str) -> LoadResult<T>
    where
        T: DeserializeOwned + Default,
    {
        let path = self.data_dir.join(Self::CONFIG_FILE);
        if !path.exists() {
            return Ok(T::default());
        }
        ConfigLoader::load_table(&path, table)
    }

    /// Load rosters from `roster.ron`, or the stock generals without one.
    pub fn load_rosters(&self) -> LoadResult<[Vec<GeneralSpec>; 2]> {
        let path = self.data_dir.join(Self::ROSTER_FILE);
        if !path.exists() {
            return Ok(BattleSetup::default().rosters);
        }
        RosterLoader::load(&path)
    }

    /// Load `maps/<name>.txt`.
    pub fn load_map(&self, name: &str) -> LoadResult<Battleground> {
        let path = self.data_dir.join(Self::MAPS_DIR).join(format!("{name}.txt"));
        MapLoader::load(&path)
    }

    /// Assemble a setup from the directory, on the named map or on the
    /// bordered default arena.
    pub fn build_setup(&self, map: Option<&str>) -> LoadResult<BattleSetup> {
        let config = self.load_config()?;
        let rosters = self.load_rosters()?;
        let mut setup = BattleSetup::new(config);
        setup.rosters = rosters;
        if let Some(name) = map {
            setup = setup.with_grid(self.load_map(name)?);
        }
        Ok(setup)
    }
}
