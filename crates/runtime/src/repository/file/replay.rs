use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::repository::{ReplayRecord, ReplayRepository, RepositoryError, Result};

/// On-disk encoding of a record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReplayFormat {
    /// Compact bincode, `<name>.replay.bin`.
    #[default]
    Binary,
    /// Pretty-printed JSON, `<name>.replay.json`.
    Json,
}

impl ReplayFormat {
    fn extension(self) -> &'static str {
        match self {
            Self::Binary => "replay.bin",
            Self::Json => "replay.json",
        }
    }

    fn encode(self, record: &ReplayRecord) -> Result<Vec<u8>> {
        match self {
            Self::Binary => {
                bincode::serialize(record).map_err(|e| RepositoryError::Serialization(e.to_string()))
            }
            Self::Json => serde_json::to_vec_pretty(record).map_err(|e| RepositoryError::Json(e.to_string())),
        }
    }

    fn decode(self, bytes: &[u8]) -> Result<ReplayRecord> {
        match self {
            Self::Binary => {
                bincode::deserialize(bytes).map_err(|e| RepositoryError::Serialization(e.to_string()))
            }
            Self::Json => serde_json::from_slice(bytes).map_err(|e| RepositoryError::Json(e.to_string())),
        }
    }
}

/// Stores each record as one file in a directory.
///
/// Writes go to a temporary file first and are renamed into place, so a
/// crash never leaves a half-written record behind.
pub struct FileReplayRepository {
    base_dir: PathBuf,
    format: ReplayFormat,
}

impl FileReplayRepository {
    /// Opens (creating if needed) a repository in `base_dir`.
    pub fn new(base_dir: impl AsRef<Path>, format: ReplayFormat) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir, format })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Path of the record stored under `name`.
    pub fn path(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(RepositoryError::InvalidName(name.to_string()));
        }
        Ok(self.base_dir.join(format!("{name}.{}", self.format.extension())))
    }
}

impl ReplayRepository for FileReplayRepository {
    fn save(&self, name: &str, record: &ReplayRecord) -> Result<()> {
        let path = self.path(name)?;
        let temp_path = path.with_extension("tmp");

        fs::write(&temp_path, self.format.encode(record)?)?;
        fs::rename(&temp_path, &path)?;

        debug!(
            turns = record.log.final_turn,
            orders = record.log.len(),
            "saved replay to {}",
            path.display()
        );
        Ok(())
    }

    fn load(&self, name: &str) -> Result<Option<ReplayRecord>> {
        let path = self.path(name)?;
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path)?;
        let record = self.format.decode(&bytes)?;
        debug!(turns = record.log.final_turn, "loaded replay from {}", path.display());
        Ok(Some(record))
    }

    fn list(&self) -> Result<Vec<String>> {
        let suffix = format!(".{}", self.format.extension());
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.base_dir)? {
            let file_name = entry?.file_name();
            if let Some(name) = file_name.to_str().and_then(|name| name.strip_suffix(&suffix)) {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn delete(&self, name: &str) -> Result<()> {
        let path = self.path(name)?;
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}
