use super::{ReplayRecord, Result};

/// Storage for finished battles, keyed by name.
pub trait ReplayRepository: Send + Sync {
    /// Store `record` under `name`, replacing any earlier one.
    fn save(&self, name: &str, record: &ReplayRecord) -> Result<()>;

    /// The record stored under `name`, if any.
    fn load(&self, name: &str) -> Result<Option<ReplayRecord>>;

    /// Names of every stored record, sorted.
    fn list(&self) -> Result<Vec<String>>;

    fn delete(&self, name: &str) -> Result<()>;
}
