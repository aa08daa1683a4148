//! Read-only view of the battle from one general's seat, and the numbers
//! the controller derives from it each decision.

use skirmish_core::{BattleState, Entity, General, Position, Side};

use super::config::PhaseThresholds;
use super::strategy::Phase;

/// The battle as seen by the general of `side`.
pub(crate) struct Battlefield<'a> {
    pub state: &'a BattleState,
    pub side: Side,
    pub general: &'a Entity,
    pub commander: &'a General,
    /// `None` while the enemy general is hosted or dead.
    pub enemy: Option<&'a Entity>,
}

impl<'a> Battlefield<'a> {
    /// `None` when `side` has no living general on the board.
    pub fn new(state: &'a BattleState, side: Side) -> Option<Self> {
        let on_board = |entity: &&Entity| entity.alive && !entity.position.is_nowhere();
        let general = state.general(side).filter(on_board)?;
        let commander = general.general()?;
        let enemy = state.general(side.opponent()).filter(on_board);
        Some(Self {
            state,
            side,
            general,
            commander,
            enemy,
        })
    }

    pub fn position(&self) -> Position {
        self.general.position
    }

    /// The enemy general's tile, or the middle of the enemy half when it is
    /// not on the board.
    pub fn enemy_position(&self) -> Position {
        match self.enemy {
            Some(enemy) => enemy.position,
            None => {
                let (width, height) = (self.width(), self.height());
                let x = match self.enemy_side() {
                    Side::First => width / 4,
                    _ => width * 3 / 4,
                };
                Position::new(x, height / 2)
            }
        }
    }

    pub fn enemy_side(&self) -> Side {
        self.side.opponent()
    }

    pub fn width(&self) -> i32 {
        self.state.grid.width()
    }

    pub fn height(&self) -> i32 {
        self.state.grid.height()
    }

    pub fn is_inside(&self, position: Position) -> bool {
        self.state.grid.is_inside(position)
    }

    /// Pulls `position` inside the playable area, one tile off every edge.
    pub fn clamp(&self, position: Position) -> Position {
        let max_x = (self.width() - 2).max(1);
        let max_y = (self.height() - 2).max(1);
        Position::new(position.x.clamp(1, max_x), position.y.clamp(1, max_y))
    }

    /// Inside, and either empty or holding our own general.
    pub fn is_free(&self, position: Position) -> bool {
        self.is_inside(position)
            && self
                .state
                .grid
                .occupant(position)
                .is_none_or(|id| id == self.general.id)
    }

    pub fn is_enemy_general(&self, entity: &Entity) -> bool {
        self.enemy.is_some_and(|enemy| enemy.id == entity.id)
    }

    /// Living unit on `position`, minion or general.
    pub fn unit_at(&self, position: Position) -> Option<&'a Entity> {
        self.state
            .occupant(position)
            .filter(|entity| entity.alive && self.state.is_unit(entity.id))
    }

    pub fn distance_to_enemy(&self, position: Position) -> i32 {
        position.manhattan(self.enemy_position())
    }

    /// Allied units below full health, most damaged first, general included.
    pub fn damaged_allies(&self) -> Vec<(&'a Entity, f32)> {
        let mut damaged: Vec<(&Entity, f32)> = std::iter::once(self.general)
            .chain(self.state.live_minions(self.side))
            .filter_map(|entity| {
                let unit = entity.unit()?;
                (unit.hp < unit.max_hp).then(|| (entity, 1.0 - unit.health_ratio()))
            })
            .collect();
        damaged.sort_by(|a, b| b.1.total_cmp(&a.1));
        damaged
    }
}

/// Snapshot of the numbers every decision starts from.
#[derive(Clone, Debug, PartialEq)]
pub struct Assessment {
    pub turn: u64,
    pub ours: Position,
    pub theirs: Position,
    pub our_hp: i32,
    pub our_max_hp: i32,
    pub our_health: f32,
    pub enemy_health: f32,
    pub our_minions: usize,
    pub enemy_minions: usize,
    /// Manhattan distance between the generals.
    pub distance: i32,
    pub our_spread: f32,
    pub enemy_spread: f32,
    /// 0..=100, how pressed we are.
    pub urgency: i32,
    pub phase: Phase,
}

impl Assessment {
    pub(crate) fn new(field: &Battlefield<'_>, turn: u64, thresholds: &PhaseThresholds) -> Self {
        let state = field.state;
        let ours = field.position();
        let theirs = field.enemy_position();
        let unit = &field.commander.unit;
        let our_health = unit.health_ratio();
        let enemy_health = field
            .enemy
            .and_then(Entity::unit)
            .map_or(1.0, |unit| unit.health_ratio());
        let our_minions = state.live_minions(field.side).count();
        let enemy_minions = state.live_minions(field.enemy_side()).count();
        let distance = ours.manhattan(theirs);

        let mut assessment = Self {
            turn,
            ours,
            theirs,
            our_hp: unit.hp,
            our_max_hp: unit.max_hp,
            our_health,
            enemy_health,
            our_minions,
            enemy_minions,
            distance,
            our_spread: spread(state, field.side, ours),
            enemy_spread: spread(state, field.enemy_side(), theirs),
            urgency: 0,
            phase: Phase::EarlyGame,
        };
        assessment.urgency = assessment.urgency();
        assessment.phase = assessment.phase(thresholds);
        assessment
    }

    fn urgency(&self) -> i32 {
        let mut urgency = 0;
        if self.our_health < 0.3 {
            urgency += 40;
        } else if self.our_health < 0.6 {
            urgency += 20;
        }

        let (ours, theirs) = (self.our_minions as f32, self.enemy_minions as f32);
        if theirs > ours * 1.5 {
            urgency += 30;
        } else if theirs > ours {
            urgency += 15;
        }

        if self.distance < 8 {
            urgency += 25;
        }
        if self.enemy_health < 0.5 {
            urgency += 15;
        }
        urgency.min(100)
    }

    fn phase(&self, thresholds: &PhaseThresholds) -> Phase {
        if self.turn < thresholds.early_game_turns {
            Phase::EarlyGame
        } else if self.our_health < thresholds.end_game_health
            || self.enemy_health < thresholds.end_game_health
        {
            Phase::EndGame
        } else if self.distance < thresholds.combat_distance {
            Phase::Combat
        } else {
            Phase::Positioning
        }
    }
}

/// Widest distance of a side's minions from their mean column, measured
/// level with the side's general. The general's column stands in for the
/// mean when no minion is alive.
fn spread(state: &BattleState, side: Side, general: Position) -> f32 {
    let (sum, count) = state
        .live_minions(side)
        .fold((0i64, 0usize), |(sum, count), minion| (sum + i64::from(minion.position.x), count + 1));
    let center_x = if count == 0 {
        general.x as f32
    } else {
        sum as f32 / count as f32
    };
    state
        .live_minions(side)
        .map(|minion| (minion.position.x as f32 - center_x).abs() + (minion.position.y - general.y).abs() as f32)
        .fold(0.0, f32::max)
}
