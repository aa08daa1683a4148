use std::collections::BTreeMap;
use std::sync::RwLock;

use super::{ReplayRecord, ReplayRepository, RepositoryError, Result};

/// Keeps records in memory. Mostly useful for tests.
#[derive(Debug, Default)]
pub struct InMemoryReplayRepo {
    records: RwLock<BTreeMap<String, ReplayRecord>>,
}

impl InMemoryReplayRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReplayRepository for InMemoryReplayRepo {
    fn save(&self, name: &str, record: &ReplayRecord) -> Result<()> {
        let mut records = self.records.write().map_err(|_| RepositoryError::LockPoisoned)?;
        records.insert(name.to_string(), record.clone());
        Ok(())
    }

    fn load(&self, name: &str) -> Result<Option<ReplayRecord>> {
        let records = self.records.read().map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(records.get(name).cloned())
    }

    fn list(&self) -> Result<Vec<String>> {
        let records = self.records.read().map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(records.keys().cloned().collect())
    }

    fn delete(&self, name: &str) -> Result<()> {
        let mut records = self.records.write().map_err(|_| RepositoryError::LockPoisoned)?;
        records.remove(name);
        Ok(())
    }
}
