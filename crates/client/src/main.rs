//! Skirmish battle client.
//!
//! Composition root: reads configuration from the environment (and `.env`),
//! sets up logging, then plays one battle between two AI generals, logs the
//! outcome and optionally stores the replay.
//!
//! ```bash
//! SKIRMISH_CONFIG=crates/battle/content/data SKIRMISH_MAP=arena SKIRMISH_SEED=7 \
//!     cargo run -p skirmish-client
//! ```

mod config;
mod logging;

use anyhow::Result;
use skirmish_core::{BattleSetup, Side};
use skirmish_runtime::{
    BattleEvent, FileReplayRepository, ReplayFormat, ReplayRepository, Runtime, RuntimeConfig,
};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let client_config = ClientConfig::from_env();
    let runtime_config = RuntimeConfig::from_env();
    let session = client_config.session();
    let _guard = logging::setup_logging(&client_config, &session)?;

    info!(
        turn_budget_ms = runtime_config.turn_budget.as_millis() as u64,
        max_turns = runtime_config.max_turns,
        seeds = ?runtime_config.seeds,
        content = ?runtime_config.content_dir,
        map = ?runtime_config.map,
        "starting skirmish"
    );

    let mut builder = Runtime::builder().ai(Side::First).ai(Side::Second);
    if runtime_config.content_dir.is_none() {
        builder = builder.setup(BattleSetup::default());
    }
    let mut runtime = builder.config(runtime_config).build().await?;

    let mut events = runtime.subscribe();
    let watcher = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(BattleEvent::TurnResolved(report)) => {
                    debug!(turn = report.turn, resolved = ?report.resolved, "turn resolved");
                }
                Ok(BattleEvent::Finished { outcome, .. }) => {
                    info!(winner = %outcome.winner, turn = outcome.turn, "general fallen");
                }
                Err(RecvError::Lagged(missed)) => warn!(missed, "event stream lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let summary = runtime.run().await?;
    match summary.outcome {
        Some(outcome) => info!(
            winner = %outcome.winner,
            turns = summary.turns,
            digest = %hex::encode(summary.digest),
            "battle won"
        ),
        None => info!(
            turns = summary.turns,
            digest = %hex::encode(summary.digest),
            "battle drawn at the turn cap"
        ),
    }

    if let Some(dir) = &client_config.replay_dir {
        let format = if client_config.replay_json {
            ReplayFormat::Json
        } else {
            ReplayFormat::Binary
        };
        let repository = FileReplayRepository::new(dir, format)?;
        repository.save(&session, &runtime.record().await?)?;
        info!(path = %repository.path(&session)?.display(), "replay saved");
    }

    runtime.shutdown().await?;
    watcher.await?;
    Ok(())
}
