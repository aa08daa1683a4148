//! Battle configuration loader.
//!
//! The top level of the file holds [`BattleConfig`] fields; other tables
//! (such as `[ai]`) belong to the layers that read them through
//! [`ConfigLoader::load_table`].

use std::path::Path;

use serde::de::DeserializeOwned;
use skirmish_core::BattleConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for battle configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load the battle rules. Missing fields keep their defaults.
    pub fn load(path: &Path) -> LoadResult<BattleConfig> {
        let content = read_file(path)?;
        let config: BattleConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML {}: {}", path.display(), e))?;

        Ok(config)
    }

    /// Load one named table of the file, or `T::default()` when the table
    /// is absent.
    pub fn load_table<T>(path: &Path, table: &str) -> LoadResult<T>
    where
        T: DeserializeOwned + Default,
    {
        let content = read_file(path)?;
        let mut root: toml::Table = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML {}: {}", path.display(), e))?;

        match root.remove(table) {
            Some(value) => value.try_into().map_err(|e| {
                anyhow::anyhow!(
                    "Failed to parse [{}] in {}: {}",
                    table,
                    path.display(),
                    e
                )
            }),
            None => Ok(T::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use skirmish_core::Position;

    #[derive(Debug, Default, PartialEq, serde::Deserialize)]
    struct Extra {
        answer: i32,
    }

    fn write(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let file = write("width = 30\nstarting_minions = 12\n");
        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.width, 30);
        assert_eq!(config.height, BattleConfig::DEFAULT_HEIGHT);
        assert_eq!(config.starting_minions, Some(12));
        assert_eq!(config.general_starts, BattleConfig::DEFAULT_GENERAL_STARTS);
    }

    #[test]
    fn general_starts_are_read() {
        let file = write("general_starts = [{ x = 2, y = 3 }, { x = 20, y = 3 }]\n");
        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.general_starts, [Position::new(2, 3), Position::new(20, 3)]);
    }

    #[test]
    fn tables_are_read_independently() {
        let file = write("width = 30\n\n[extra]\nanswer = 42\n");
        let extra: Extra = ConfigLoader::load_table(file.path(), "extra").unwrap();
        assert_eq!(extra, Extra { answer: 42 });
        let missing: Extra = ConfigLoader::load_table(file.path(), "nothing").unwrap();
        assert_eq!(missing, Extra::default());
    }

    #[test]
    fn missing_file_names_the_path() {
        let error = ConfigLoader::load(Path::new("/nonexistent/battle.toml")).unwrap_err();
        assert!(error.to_string().contains("/nonexistent/battle.toml"));
    }
}
