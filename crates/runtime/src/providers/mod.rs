//! Ready-made [`ActionProvider`](crate::ActionProvider) implementations.

pub mod ai;
mod remote;
mod scripted;

pub use ai::{AiConfig, AiController, AiProvider, Decision, DecisionSource};
pub use remote::{RelayProvider, RemoteProvider};
pub use scripted::ScriptedProvider;
