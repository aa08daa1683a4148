//! Turn resolution.
//!
//! [`Battle`] is the authoritative reducer for [`BattleState`]. Each call to
//! [`Battle::advance`] resolves one turn:
//!
//! 1. the actions submitted for `turn - TURN_LAG` are executed, first side first
//! 2. active generals update, then effects, then minions
//! 3. the battle ends if an active general is dead
//! 4. every [`BattleConfig::SWEEP_INTERVAL`] turns the rosters are compacted
//!
//! Actions are buffered by the turn they were submitted for, so what a side
//! orders on turn `T` only becomes visible once both sides had the chance to
//! commit their turn-`T` orders.

mod errors;
mod replay;

use std::collections::BTreeMap;

pub use errors::BattleError;
pub use replay::ReplayLog;

use crate::action::{Action, CommandError, HostError, effect, fortress, general, minion};
use crate::config::BattleConfig;
use crate::roster::{self, GeneralSpec};
use crate::state::{BattleState, Battleground, EntityId, Side};

/// Everything needed to build a battle: rules, arena, and the two rosters.
///
/// The first general of each roster takes the field; the rest are benched
/// in order.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleSetup {
    pub config: BattleConfig,
    /// Arena layout. A bordered rectangle of the configured size when absent.
    pub grid: Option<Battleground>,
    pub rosters: [Vec<GeneralSpec>; 2],
    /// Sides driven by the decision engine.
    pub ai_controlled: [bool; 2],
}

impl BattleSetup {
    pub fn new(config: BattleConfig) -> Self {
        Self {
            config,
            grid: None,
            rosters: [
                vec![roster::default_general(Side::First)],
                vec![roster::default_general(Side::Second)],
            ],
            ai_controlled: [false, false],
        }
    }

    pub fn with_grid(mut self, grid: Battleground) -> Self {
        self.grid = Some(grid);
        self
    }

    /// Replaces `side`'s roster. Neutral is ignored.
    pub fn with_roster(mut self, side: Side, specs: Vec<GeneralSpec>) -> Self {
        if let Some(slot) = side.index() {
            self.rosters[slot] = specs;
        }
        self
    }

    pub fn with_ai(mut self, side: Side) -> Self {
        if let Some(slot) = side.index() {
            self.ai_controlled[slot] = true;
        }
        self
    }

    fn battleground(&self) -> Battleground {
        self.grid
            .clone()
            .unwrap_or_else(|| Battleground::bordered(self.config.width, self.config.height))
    }
}

impl Default for BattleSetup {
    fn default() -> Self {
        Self::new(BattleConfig::default())
    }
}

/// How a battle ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Outcome {
    pub winner: Side,
    /// Turn on which the losing general was found dead.
    pub turn: u64,
}

/// What happened while resolving one turn.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnReport {
    pub turn: u64,
    /// Actions executed this turn, indexed by side. They were submitted for
    /// `turn - TURN_LAG`.
    pub resolved: [Option<Action>; 2],
    /// Why a resolved action had no effect, indexed by side.
    pub rejected: [Option<CommandError>; 2],
    pub winner: Option<Side>,
}

impl TurnReport {
    fn new(turn: u64) -> Self {
        Self {
            turn,
            ..Self::default()
        }
    }

    pub fn is_final(&self) -> bool {
        self.winner.is_some()
    }
}

/// A running battle.
#[derive(Clone, Debug)]
pub struct Battle {
    setup: BattleSetup,
    state: BattleState,
    pending: BTreeMap<u64, [Option<Action>; 2]>,
    log: ReplayLog,
    outcome: Option<Outcome>,
}

impl Battle {
    /// Builds the arena, raises its fortresses, fields and benches every
    /// general, and deploys the starting minions.
    pub fn new(setup: BattleSetup) -> Result<Self, BattleError> {
        let mut state = BattleState::new(setup.battleground());
        fortress::build_all(&mut state);

        for (slot, side) in Side::PLAYERS.into_iter().enumerate() {
            let mut specs = setup.rosters[slot].clone();
            if let Some(count) = setup.config.starting_minions {
                for spec in &mut specs {
                    spec.starting_minions = count;
                }
            }
            let (active, bench) = specs
                .split_first()
                .ok_or(BattleError::EmptyRoster { side })?;
            let position = setup.config.general_starts[slot];
            let id = roster::place_general(&mut state, side, active, position)
                .ok_or(BattleError::Placement { side, position })?;
            let mut fielded = vec![id];
            fielded.extend(
                bench
                    .iter()
                    .filter_map(|spec| roster::bench_general(&mut state, side, spec)),
            );
            if setup.ai_controlled[slot] {
                for id in fielded {
                    if let Some(commander) = state.entity_mut(id).and_then(|entity| entity.general_mut()) {
                        commander.ai_controlled = true;
                    }
                }
            }
        }

        for side in Side::PLAYERS {
            if let Some(id) = state.general_id(side) {
                general::start_battle(&mut state, id);
            }
        }

        Ok(Self {
            setup,
            state,
            pending: BTreeMap::new(),
            log: ReplayLog::new(),
            outcome: None,
        })
    }

    /// Default arena and stock generals.
    pub fn standard() -> Result<Self, BattleError> {
        Self::new(BattleSetup::default())
    }

    /// Rebuilds a battle from its setup and the actions it accepted.
    pub fn replay(setup: BattleSetup, log: &ReplayLog) -> Result<Self, BattleError> {
        let mut battle = Self::new(setup)?;
        for (turn, side, action) in log.iter() {
            battle.submit(side, turn, action)?;
        }
        while battle.state.turn < log.final_turn && battle.outcome.is_none() {
            battle.advance()?;
        }
        Ok(battle)
    }

    pub fn state(&self) -> &BattleState {
        &self.state
    }

    pub fn setup(&self) -> &BattleSetup {
        &self.setup
    }

    pub fn turn(&self) -> u64 {
        self.state.turn
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn log(&self) -> &ReplayLog {
        &self.log
    }

    pub fn digest(&self) -> [u8; 32] {
        self.state.digest()
    }

    /// Queues `side`'s order for `turn`. It is executed when the battle
    /// reaches `turn + TURN_LAG`.
    pub fn submit(&mut self, side: Side, turn: u64, action: Action) -> Result<(), BattleError> {
        self.ensure_running()?;
        let slot = side.index().ok_or(BattleError::NotAPlayer(side))?;
        let current = self.state.turn;
        if turn + BattleConfig::TURN_LAG < current {
            return Err(BattleError::StaleTurn { turn, current });
        }
        let queued = self.pending.entry(turn).or_default();
        if queued[slot].is_some() {
            return Err(BattleError::AlreadySubmitted { side, turn });
        }
        queued[slot] = Some(action);
        Ok(())
    }

    /// Decodes and queues a text order. A line that does not parse leaves
    /// the side without an action for that turn.
    pub fn submit_line(&mut self, side: Side, turn: u64, line: &str) -> Result<Action, BattleError> {
        let action: Action = line.parse()?;
        self.submit(side, turn, action)?;
        Ok(action)
    }

    /// Resolves the current turn.
    pub fn advance(&mut self) -> Result<TurnReport, BattleError> {
        self.ensure_running()?;
        let turn = self.state.turn;
        let mut report = TurnReport::new(turn);

        if let Some(due) = turn.checked_sub(BattleConfig::TURN_LAG) {
            let actions = self.pending.remove(&due).unwrap_or_default();
            for (slot, side) in Side::PLAYERS.into_iter().enumerate() {
                let Some(action) = actions[slot] else {
                    continue;
                };
                self.log.record(due, slot, action);
                report.resolved[slot] = Some(action);
                if let Err(error) = action.execute(&mut self.state, side) {
                    report.rejected[slot] = Some(error);
                }
            }
        }

        self.update_entities();
        report.winner = self.check_winner();

        if turn % BattleConfig::SWEEP_INTERVAL == 0 {
            self.state.sweep();
        }
        self.state.turn += 1;
        self.log.final_turn = self.state.turn;

        if let Some(winner) = report.winner {
            self.outcome = Some(Outcome { winner, turn });
        }
        Ok(report)
    }

    /// Moves `side`'s active general into `fortress`.
    pub fn host(&mut self, side: Side, fortress: EntityId) -> Result<(), HostError> {
        let general = self.state.general_id(side).ok_or(HostError::NotAGeneral)?;
        fortress::host(&mut self.state, fortress, general)
    }

    /// Brings `general` back out of `fortress`.
    pub fn unhost(&mut self, fortress: EntityId, general: EntityId) -> Result<(), HostError> {
        fortress::unhost(&mut self.state, fortress, general)
    }

    fn ensure_running(&self) -> Result<(), BattleError> {
        match self.outcome {
            Some(Outcome { winner, turn }) => Err(BattleError::Finished { winner, turn }),
            None => Ok(()),
        }
    }

    fn update_entities(&mut self) {
        for side in Side::PLAYERS {
            if let Some(id) = self.state.general_id(side) {
                general::update(&mut self.state, id);
            }
        }
        let effects = self.state.effects.clone();
        for id in effects {
            effect::update(&mut self.state, id);
        }
        let minions = self.state.minions.clone();
        for id in minions {
            minion::update(&mut self.state, id);
        }
    }

    /// The first side found with a dead active general loses. Both generals
    /// falling on the same turn therefore hands the win to the second side.
    fn check_winner(&self) -> Option<Side> {
        Side::PLAYERS.into_iter().find_map(|side| {
            let id = self.state.general_id(side)?;
            (!self.state.is_alive(id)).then_some(side.opponent())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{SkillError, combat};
    use crate::error::{ErrorSeverity, GameError};

    fn small_battle() -> Battle {
        let config = BattleConfig::new().with_starting_minions(5);
        Battle::new(BattleSetup::new(config)).unwrap()
    }

    #[test]
    fn standard_battle_opens_with_full_ranks() {
        let battle = Battle::standard().unwrap();
        let state = battle.state();
        assert_eq!(state.live_minions(Side::First).count(), 101);
        assert_eq!(state.live_minions(Side::Second).count(), 101);
        assert_eq!(state.general(Side::First).unwrap().position, BattleConfig::DEFAULT_GENERAL_STARTS[0]);
        assert_eq!(state.general(Side::Second).unwrap().position, BattleConfig::DEFAULT_GENERAL_STARTS[1]);
        state.check_occupancy().unwrap();
    }

    #[test]
    fn actions_resolve_one_turn_late() {
        let mut battle = small_battle();
        battle.submit(Side::First, 0, Action::SelectTactic { index: 1 }).unwrap();

        let report = battle.advance().unwrap();
        assert_eq!(report.resolved, [None, None]);
        let first = battle.state().general(Side::First).unwrap().general().unwrap();
        assert_eq!(first.selected_tactic, 0);

        let report = battle.advance().unwrap();
        assert_eq!(report.resolved[0], Some(Action::SelectTactic { index: 1 }));
        let first = battle.state().general(Side::First).unwrap().general().unwrap();
        assert_eq!(first.selected_tactic, 1);
    }

    #[test]
    fn rejected_actions_are_reported_not_raised() {
        let mut battle = small_battle();
        battle.submit(Side::Second, 0, Action::skill(9, 1, 1)).unwrap();
        battle.advance().unwrap();
        let report = battle.advance().unwrap();
        assert_eq!(
            report.rejected[1],
            Some(CommandError::Skill(SkillError::UnknownSkill { index: 9 }))
        );
        assert!(report.rejected[0].is_none());

        let error = report.rejected[1].as_ref().unwrap();
        assert_eq!(error.severity(), ErrorSeverity::Validation);
        assert_eq!(error.error_code(), "SKILL_UNKNOWN");
    }

    #[test]
    fn contested_rejections_are_recoverable() {
        // Skills start uncharged, so an opening cast is turned away.
        let mut battle = small_battle();
        battle.submit(Side::First, 0, Action::skill(3, 0, 0)).unwrap();
        battle.advance().unwrap();
        let report = battle.advance().unwrap();

        let error = report.rejected[0].as_ref().expect("skill is still charging");
        assert!(matches!(error, CommandError::Skill(SkillError::OnCooldown { index: 3, .. })));
        assert!(error.severity().is_recoverable());
        assert_eq!(error.error_code(), "SKILL_ON_COOLDOWN");
    }

    #[test]
    fn submissions_are_checked() {
        let mut battle = small_battle();
        battle.advance().unwrap();
        battle.advance().unwrap();
        assert_eq!(
            battle.submit(Side::First, 0, Action::Stop),
            Err(BattleError::StaleTurn { turn: 0, current: 2 })
        );
        battle.submit(Side::First, 1, Action::Stop).unwrap();
        assert_eq!(
            battle.submit(Side::First, 1, Action::Stop),
            Err(BattleError::AlreadySubmitted { side: Side::First, turn: 1 })
        );
        assert_eq!(
            battle.submit(Side::Neutral, 3, Action::Stop),
            Err(BattleError::NotAPlayer(Side::Neutral))
        );
        assert!(matches!(
            battle.submit_line(Side::Second, 3, "fly 1 2"),
            Err(BattleError::Parse(_))
        ));
    }

    #[test]
    fn dead_general_ends_the_battle() {
        let mut battle = small_battle();
        let loser = battle.state.general_id(Side::Second).unwrap();
        combat::die(&mut battle.state, loser);

        let report = battle.advance().unwrap();
        assert_eq!(report.winner, Some(Side::First));
        assert_eq!(battle.outcome(), Some(Outcome { winner: Side::First, turn: 0 }));
        assert_eq!(
            battle.advance(),
            Err(BattleError::Finished { winner: Side::First, turn: 0 })
        );
    }

    #[test]
    fn simultaneous_deaths_favor_the_second_side() {
        let mut battle = small_battle();
        for side in Side::PLAYERS {
            let id = battle.state.general_id(side).unwrap();
            combat::die(&mut battle.state, id);
        }
        assert_eq!(battle.advance().unwrap().winner, Some(Side::Second));
    }

    #[test]
    fn replay_reproduces_the_battle() {
        let mut battle = small_battle();
        let script = [
            (0, Side::First, "tactic1"),
            (0, Side::Second, "flag 50 10"),
            (3, Side::Second, "tactic5"),
            (5, Side::First, "skill3 0 0"),
            (8, Side::First, "flag 10 30"),
        ];
        for turn in 0..20 {
            for (at, side, line) in script {
                if at == turn {
                    battle.submit_line(side, turn, line).unwrap();
                }
            }
            battle.advance().unwrap();
        }

        let replayed = Battle::replay(battle.setup().clone(), battle.log()).unwrap();
        assert_eq!(replayed.turn(), 20);
        assert_eq!(replayed.digest(), battle.digest());
        assert_eq!(replayed.state(), battle.state());
    }

    #[test]
    fn empty_roster_is_rejected() {
        let setup = BattleSetup::default().with_roster(Side::Second, Vec::new());
        assert_eq!(
            Battle::new(setup).unwrap_err(),
            BattleError::EmptyRoster { side: Side::Second }
        );
    }

    #[test]
    fn reserves_are_benched_in_order() {
        let reserve = GeneralSpec::standard("Reserve", 'r');
        let setup = BattleSetup::default().with_roster(
            Side::First,
            vec![roster::default_general(Side::First), reserve.clone(), reserve],
        );
        let battle = Battle::new(setup).unwrap();
        assert_eq!(battle.state().reserves[0].len(), 2);
        assert!(battle.state().reserves[1].is_empty());
    }
}
