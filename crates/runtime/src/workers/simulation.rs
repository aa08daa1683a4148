//! Simulation worker that owns the authoritative [`skirmish_core::Battle`].
//!
//! Receives commands from [`RuntimeHandle`](crate::RuntimeHandle), resolves
//! turns, and broadcasts [`BattleEvent`]s. Each command is handled to
//! completion before the next one is read, so a turn's resolution is a
//! single critical section.

use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info, trace};

use skirmish_core::{Action, Battle, ReplayLog, Side, TurnReport};

use crate::api::{BattleEvent, BattleSnapshot, Result};

/// Commands that can be sent to the simulation worker
pub enum Command {
    /// Queue one side's order for a turn.
    Submit {
        side: Side,
        turn: u64,
        action: Action,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Resolve the current turn.
    Advance {
        reply: oneshot::Sender<Result<TurnReport>>,
    },
    /// Query the current battle (read-only).
    QueryState { reply: oneshot::Sender<BattleSnapshot> },
    /// Copy out the replay log.
    QueryLog { reply: oneshot::Sender<ReplayLog> },
}

/// Background task that processes battle commands.
///
/// The worker does not own providers or do any I/O beyond its channels;
/// provider orchestration is done by [`Runtime`](crate::Runtime).
pub struct SimulationWorker {
    battle: Battle,
    command_rx: mpsc::Receiver<Command>,
    event_tx: broadcast::Sender<BattleEvent>,
}

impl SimulationWorker {
    /// Creates a new simulation worker.
    pub fn new(
        battle: Battle,
        command_rx: mpsc::Receiver<Command>,
        event_tx: broadcast::Sender<BattleEvent>,
    ) -> Self {
        info!(
            "SimulationWorker initialized at turn {} with {} minions on the field",
            battle.turn(),
            battle.state().minions.len()
        );

        Self {
            battle,
            command_rx,
            event_tx,
        }
    }

    /// Main worker loop. Ends once every handle has been dropped.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(cmd) = self.command_rx.recv() => {
                    self.handle_command(cmd);
                }
                else => break,
            }
        }
        debug!("SimulationWorker stopped at turn {}", self.battle.turn());
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Submit {
                side,
                turn,
                action,
                reply,
            } => {
                trace!(%side, turn, %action, "order queued");
                let result = self.battle.submit(side, turn, action).map_err(Into::into);
                if reply.send(result).is_err() {
                    debug!("Submit reply channel closed (caller dropped)");
                }
            }
            Command::Advance { reply } => {
                let result = self.handle_advance();
                if reply.send(result).is_err() {
                    debug!("Advance reply channel closed (caller dropped)");
                }
            }
            Command::QueryState { reply } => {
                let snapshot = BattleSnapshot {
                    turn: self.battle.turn(),
                    state: self.battle.state().clone(),
                    outcome: self.battle.outcome(),
                };
                if reply.send(snapshot).is_err() {
                    debug!("QueryState reply channel closed (caller dropped)");
                }
            }
            Command::QueryLog { reply } => {
                if reply.send(self.battle.log().clone()).is_err() {
                    debug!("QueryLog reply channel closed (caller dropped)");
                }
            }
        }
    }

    /// Resolves one turn and publishes its report, followed by
    /// [`BattleEvent::Finished`] when the turn decided the battle.
    fn handle_advance(&mut self) -> Result<TurnReport> {
        let report = self.battle.advance()?;

        // No subscribers is fine; events are advisory.
        let _ = self.event_tx.send(BattleEvent::TurnResolved(report.clone()));

        if let Some(outcome) = self.battle.outcome() {
            let digest = self.battle.digest();
            info!(
                winner = %outcome.winner,
                turn = outcome.turn,
                digest = %hex::encode(digest),
                "battle decided"
            );
            let _ = self.event_tx.send(BattleEvent::Finished { outcome, digest });
        }

        Ok(report)
    }
}
