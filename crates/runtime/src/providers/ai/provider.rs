use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use skirmish_core::{Action, BattleState, Side};
use tracing::warn;

use super::config::AiConfig;
use super::controller::AiController;
use crate::api::{ActionProvider, Result};

/// [`AiController`] behind the provider interface.
///
/// One provider drives one side; its memory follows that side's general.
pub struct AiProvider {
    controller: Mutex<AiController>,
}

impl AiProvider {
    pub fn new(side: Side, config: AiConfig, seed: u64) -> Self {
        Self::from_controller(AiController::new(side, config, seed))
    }

    pub fn from_controller(controller: AiController) -> Self {
        Self {
            controller: Mutex::new(controller),
        }
    }
}

#[async_trait]
impl ActionProvider for AiProvider {
    async fn provide_action(&self, side: Side, turn: u64, state: &BattleState) -> Result<Option<Action>> {
        let mut controller = self.controller.lock().unwrap_or_else(PoisonError::into_inner);
        if controller.side() != side {
            warn!(%side, controlled = %controller.side(), "ai asked to play the wrong side");
            return Ok(None);
        }
        Ok(controller.decide_action(state, turn).map(|decision| decision.action))
    }
}
