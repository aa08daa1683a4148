//! Repository layer for finished battles.
//!
//! A [`ReplayRecord`] holds everything needed to rebuild a battle: the setup
//! it started from and the log of accepted orders. Repositories store and
//! return records by name; [`ReplayRecord::verify`] re-runs one and checks it
//! lands on the recorded digest.

mod error;
mod file;
mod memory;
mod record;
mod traits;

pub use error::{RepositoryError, Result};
pub use file::{FileReplayRepository, ReplayFormat};
pub use memory::InMemoryReplayRepo;
pub use record::ReplayRecord;
pub use traits::ReplayRepository;
