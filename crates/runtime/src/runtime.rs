//! High-level runtime orchestrator.
//!
//! The runtime owns the simulation worker, wires up command/event channels,
//! and drives the turn loop: every turn it asks both sides' providers for an
//! order within the turn budget, submits what arrived, and advances.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use skirmish_content::ContentFactory;
use skirmish_core::{Action, Battle, BattleSetup, BattleState, GameError, Outcome, Side, TurnReport};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{info, trace, warn};

use crate::api::{ActionProvider, BattleEvent, Result, RuntimeError, RuntimeHandle};
use crate::providers::{AiConfig, AiProvider};
use crate::repository::ReplayRecord;
use crate::workers::{Command, SimulationWorker};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Wall-clock time each provider gets per turn.
    pub turn_budget: Duration,
    /// Turn cap after which [`Runtime::run`] stops without a winner.
    pub max_turns: u64,
    /// Seeds for the AI of each side, indexed by side.
    pub seeds: [u64; 2],
    /// Map file name under the content directory's `maps/`.
    pub map: Option<String>,
    /// Directory holding `battle.toml`, `roster.ron` and `maps/`.
    pub content_dir: Option<PathBuf>,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
}

impl RuntimeConfig {
    pub const DEFAULT_TURN_BUDGET: Duration = Duration::from_millis(100);
    pub const DEFAULT_MAX_TURNS: u64 = 20_000;

    /// Defaults overridden by `SKIRMISH_*` environment variables.
    ///
    /// Unset or unparseable variables keep their default.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(millis) = read_env::<u64>("SKIRMISH_TURN_BUDGET_MS") {
            config.turn_budget = Duration::from_millis(millis);
        }
        if let Some(max_turns) = read_env("SKIRMISH_MAX_TURNS") {
            config.max_turns = max_turns;
        }
        if let Some(seed) = read_env::<u64>("SKIRMISH_SEED") {
            config.seeds = [seed, seed.wrapping_add(1)];
        }
        if let Some(map) = read_env("SKIRMISH_MAP") {
            config.map = Some(map);
        }
        if let Some(dir) = read_env("SKIRMISH_CONFIG") {
            config.content_dir = Some(dir);
        }

        config
    }

    pub fn seed(&self, side: Side) -> u64 {
        side.index().map_or(0, |index| self.seeds[index])
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            turn_budget: Self::DEFAULT_TURN_BUDGET,
            max_turns: Self::DEFAULT_MAX_TURNS,
            seeds: [0, 1],
            map: None,
            content_dir: None,
            event_buffer_size: 256,
            command_buffer_size: 32,
        }
    }
}

fn read_env<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok()?.parse().ok()
}

/// How a [`Runtime::run`] ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchSummary {
    /// `None` when the turn cap was reached first.
    pub outcome: Option<Outcome>,
    pub turns: u64,
    pub digest: [u8; 32],
}

/// Main runtime that orchestrates a battle.
///
/// The runtime owns the worker and the providers; [`RuntimeHandle`] is the
/// cloneable façade for everything else.
pub struct Runtime {
    handle: RuntimeHandle,
    providers: [Option<Arc<dyn ActionProvider>>; 2],
    config: RuntimeConfig,
    setup: BattleSetup,
    worker: JoinHandle<()>,
}

impl Runtime {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BattleEvent> {
        self.handle.subscribe()
    }

    pub fn set_provider(&mut self, side: Side, provider: Arc<dyn ActionProvider>) {
        if let Some(index) = side.index() {
            self.providers[index] = Some(provider);
        }
    }

    fn provider(&self, side: Side) -> Result<Arc<dyn ActionProvider>> {
        side.index()
            .and_then(|index| self.providers[index].clone())
            .ok_or(RuntimeError::ProviderNotSet { side })
    }

    /// Collects both sides' orders for the current turn and resolves it.
    ///
    /// Requires a provider for each side.
    pub async fn step(&mut self) -> Result<TurnReport> {
        let first = self.provider(Side::First)?;
        let second = self.provider(Side::Second)?;

        let snapshot = self.handle.query_state().await?;
        let turn = snapshot.turn;
        let budget = self.config.turn_budget;
        let (first_action, second_action) = tokio::join!(
            collect(first.as_ref(), Side::First, turn, &snapshot.state, budget),
            collect(second.as_ref(), Side::Second, turn, &snapshot.state, budget),
        );

        for (side, action) in [(Side::First, first_action), (Side::Second, second_action)] {
            let Some(action) = action else {
                continue;
            };
            match self.handle.submit(side, turn, action).await {
                Ok(()) => trace!(%side, turn, %action, "order submitted"),
                Err(RuntimeError::Battle(error)) => warn!(
                    %side,
                    turn,
                    severity = error.severity().as_str(),
                    code = error.error_code(),
                    %error,
                    "order not accepted"
                ),
                Err(error) => return Err(error),
            }
        }

        let report = self.handle.advance().await?;
        for (side, rejected) in Side::PLAYERS.into_iter().zip(&report.rejected) {
            if let Some(error) = rejected {
                warn!(
                    %side,
                    turn = report.turn,
                    severity = error.severity().as_str(),
                    code = error.error_code(),
                    %error,
                    "order had no effect"
                );
            }
        }
        Ok(report)
    }

    /// Runs turns until a general falls or the turn cap is reached.
    pub async fn run(&mut self) -> Result<MatchSummary> {
        info!(max_turns = self.config.max_turns, "battle started");
        loop {
            let snapshot = self.handle.query_state().await?;
            if let Some(outcome) = snapshot.outcome {
                let summary = MatchSummary {
                    outcome: Some(outcome),
                    turns: snapshot.turn,
                    digest: snapshot.state.digest(),
                };
                info!(winner = %outcome.winner, turn = outcome.turn, "battle finished");
                return Ok(summary);
            }
            if snapshot.turn >= self.config.max_turns {
                warn!(turn = snapshot.turn, "turn cap reached without a winner");
                return Ok(MatchSummary {
                    outcome: None,
                    turns: snapshot.turn,
                    digest: snapshot.state.digest(),
                });
            }
            self.step().await?;
        }
    }

    /// The battle so far in replayable form.
    pub async fn record(&self) -> Result<ReplayRecord> {
        let snapshot = self.handle.query_state().await?;
        let log = self.handle.replay_log().await?;
        Ok(ReplayRecord {
            setup: self.setup.clone(),
            log,
            outcome: snapshot.outcome,
            digest: snapshot.state.digest(),
        })
    }

    /// Stops the worker and waits for it to finish.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);
        drop(self.providers);
        self.worker.await.map_err(RuntimeError::WorkerJoin)
    }
}

/// One provider's order for `turn`, or `None` when it passes, fails or runs
/// out of time.
async fn collect(
    provider: &dyn ActionProvider,
    side: Side,
    turn: u64,
    state: &BattleState,
    budget: Duration,
) -> Option<Action> {
    match timeout(budget, provider.provide_action(side, turn, state)).await {
        Ok(Ok(action)) => action,
        Ok(Err(error)) => {
            warn!(%side, turn, %error, "provider failed, passing this turn");
            None
        }
        Err(_) => {
            warn!(%side, turn, budget_ms = budget.as_millis() as u64, "turn budget expired, passing this turn");
            None
        }
    }
}

/// Builder for [`Runtime`].
///
/// The battle comes from an explicit [`BattleSetup`], or else from the
/// configured content directory.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    setup: Option<BattleSetup>,
    ai_config: Option<AiConfig>,
    providers: [Option<Arc<dyn ActionProvider>>; 2],
    ai_sides: [bool; 2],
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            setup: None,
            ai_config: None,
            providers: [None, None],
            ai_sides: [false, false],
        }
    }

    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn setup(mut self, setup: BattleSetup) -> Self {
        self.setup = Some(setup);
        self
    }

    /// Tuning for AI sides. Read from the content directory's `[ai]` table
    /// when not given.
    pub fn ai_config(mut self, config: AiConfig) -> Self {
        self.ai_config = Some(config);
        self
    }

    pub fn provider(self, side: Side, provider: impl ActionProvider + 'static) -> Self {
        self.shared_provider(side, Arc::new(provider))
    }

    pub fn shared_provider(mut self, side: Side, provider: Arc<dyn ActionProvider>) -> Self {
        if let Some(index) = side.index() {
            self.providers[index] = Some(provider);
            self.ai_sides[index] = false;
        }
        self
    }

    /// Hands `side` to the built-in AI, seeded from the config.
    pub fn ai(mut self, side: Side) -> Self {
        if let Some(index) = side.index() {
            self.providers[index] = None;
            self.ai_sides[index] = true;
        }
        self
    }

    pub async fn build(self) -> Result<Runtime> {
        let content = self.config.content_dir.as_ref().map(ContentFactory::new);

        let mut setup = match (self.setup, &content) {
            (Some(setup), _) => setup,
            (None, Some(content)) => content
                .build_setup(self.config.map.as_deref())
                .map_err(RuntimeError::Content)?,
            (None, None) => return Err(RuntimeError::MissingSetup),
        };

        let ai_config = match (self.ai_config, &content) {
            (Some(config), _) => config,
            (None, Some(content)) => content
                .load_table::<AiConfig>("ai")
                .map_err(RuntimeError::Content)?,
            (None, None) => AiConfig::default(),
        };

        let mut providers = self.providers;
        for side in Side::PLAYERS {
            let Some(index) = side.index() else {
                continue;
            };
            if self.ai_sides[index] {
                setup = setup.with_ai(side);
                let ai = AiProvider::new(side, ai_config.clone(), self.config.seed(side));
                providers[index] = Some(Arc::new(ai));
            }
        }

        let battle = Battle::new(setup.clone())?;

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let (event_tx, _event_rx) = broadcast::channel::<BattleEvent>(self.config.event_buffer_size);

        let handle = RuntimeHandle::new(command_tx, event_tx.clone());
        let worker = SimulationWorker::new(battle, command_rx, event_tx);
        let worker = tokio::spawn(async move {
            worker.run().await;
        });

        Ok(Runtime {
            handle,
            providers,
            config: self.config,
            setup,
            worker,
        })
    }
}
