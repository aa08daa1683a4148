//! File-based [`ReplayRepository`](super::ReplayRepository).

mod replay;

pub use replay::{FileReplayRepository, ReplayFormat};
