//! Built-in decision engine for AI-controlled generals.
//!
//! Each decision assesses the battle ([`Assessment`]), picks a strategy for
//! the current [`Phase`], and tries tactic, skill and movement orders in the
//! strategy's preferred sequence. Orders that repeat recent ones too closely
//! are filtered out by [`AiMemory`]. When nothing qualifies a fallback chain
//! runs, and as a last resort the general steps toward the enemy or holds
//! still, so a general on the board always receives an order.

mod analysis;
mod config;
mod controller;
mod memory;
mod positions;
mod provider;
mod strategy;
mod targeting;

pub use analysis::Assessment;
pub use config::{
    AiConfig, CategoryWeights, Personality, PhaseThresholds, SpamRules, StrategyWeights,
    TacticPersistence,
};
pub use controller::{AiController, Decision, DecisionSource};
pub use memory::AiMemory;
pub use provider::AiProvider;
pub use strategy::{ActionCategory, Phase, Strategy, StrategyKind};
