//! Runtime orchestration for two-general battles.
//!
//! This crate wires the action provider abstraction, the built-in AI, peer
//! transports and the simulation worker into a cohesive runtime API.
//! Consumers embed [`Runtime`] to drive turns and subscribe to events, and
//! talk to the battle through [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`providers`] holds ready-made order sources, the AI among them
//! - [`transport`] frames and carries orders between networked peers
//! - [`repository`] stores finished battles for replay
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod providers;
pub mod repository;
pub mod runtime;
pub mod transport;

mod workers;

pub use api::{
    ActionProvider, BattleEvent, BattleSnapshot, IdleProvider, Result, RuntimeError,
    RuntimeHandle,
};
pub use providers::{
    AiConfig, AiController, AiProvider, Decision, DecisionSource, RelayProvider, RemoteProvider,
    ScriptedProvider,
};
pub use repository::{
    FileReplayRepository, InMemoryReplayRepo, ReplayFormat, ReplayRecord, ReplayRepository,
    RepositoryError,
};
pub use runtime::{MatchSummary, Runtime, RuntimeBuilder, RuntimeConfig};
pub use transport::{LoopbackTransport, Transport, TransportError};
