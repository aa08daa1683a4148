//! Stateless movement rules minions follow when nothing is in reach.

use crate::state::{BattleState, Entity, Position, Side, step_toward};

/// Per-tick movement rule shared by all minions of a side.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Default,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::EnumCount,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Tactic {
    /// Hold position. Ranged units fire instead.
    #[default]
    Stop,
    Forward,
    Backward,
    GoSides,
    GoCenter,
    AttackGeneral,
    DefendGeneral,
    Disperse,
    GoTop,
    GoBottom,
    Null,
}

/// What a tactic asks of its unit this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TacticIntent {
    /// Stay put and act again next tick.
    Hold,
    /// Try a single step.
    Step { dx: i32, dy: i32 },
    /// Do nothing at all.
    Idle,
}

impl Tactic {
    /// Tactics a freshly created general can select, indexed by `tacticN`.
    pub const DEFAULT_SET: [Tactic; 7] = [
        Tactic::Stop,
        Tactic::Forward,
        Tactic::Backward,
        Tactic::GoSides,
        Tactic::GoCenter,
        Tactic::AttackGeneral,
        Tactic::DefendGeneral,
    ];

    pub const DISPERSE_RADIUS: i32 = 5;

    pub fn intent(self, state: &BattleState, unit: &Entity) -> TacticIntent {
        let forward = unit.side.forward();
        let midline = f64::from(state.grid.height()) / 2.0;
        let upper_half = f64::from(unit.position.y) >= midline;

        match self {
            Tactic::Stop => TacticIntent::Hold,
            Tactic::Forward => TacticIntent::Step { dx: forward, dy: 0 },
            Tactic::Backward => TacticIntent::Step { dx: -forward, dy: 0 },
            Tactic::GoCenter => TacticIntent::Step {
                dx: 0,
                dy: if upper_half { -1 } else { 1 },
            },
            Tactic::GoSides => TacticIntent::Step {
                dx: 0,
                dy: if upper_half { 1 } else { -1 },
            },
            Tactic::GoTop => TacticIntent::Step { dx: 0, dy: -1 },
            Tactic::GoBottom => TacticIntent::Step { dx: 0, dy: 1 },
            Tactic::AttackGeneral => toward_general(state, unit, unit.side.opponent()),
            Tactic::DefendGeneral => toward_general(state, unit, unit.side),
            Tactic::Disperse => disperse(state, unit),
            Tactic::Null => TacticIntent::Idle,
        }
    }
}

fn toward_general(state: &BattleState, unit: &Entity, side: Side) -> TacticIntent {
    match state.general(side) {
        Some(general) if !general.position.is_nowhere() => TacticIntent::Step {
            dx: step_toward(general.position.x - unit.position.x),
            dy: step_toward(general.position.y - unit.position.y),
        },
        _ => TacticIntent::Idle,
    }
}

/// Steps diagonally toward the least crowded quadrant.
fn disperse(state: &BattleState, unit: &Entity) -> TacticIntent {
    const QUADRANTS: [(i32, i32); 4] = [(1, 1), (-1, 1), (-1, -1), (1, -1)];
    let mut counts = [0u32; 4];
    let radius = Tactic::DISPERSE_RADIUS;

    for i in -radius..=radius {
        for j in -radius..=radius {
            let position = Position::new(unit.position.x + i, unit.position.y + j);
            if !state.grid.is_inside(position) {
                continue;
            }
            if let Some(occupant) = state.grid.occupant(position)
                && occupant != unit.id
            {
                let quadrant = (step_toward(i), step_toward(j));
                if let Some(index) = QUADRANTS.iter().position(|q| *q == quadrant) {
                    counts[index] += 1;
                }
            }
        }
    }

    let mut best = 0;
    for index in 1..QUADRANTS.len() {
        if counts[index] < counts[best] {
            best = index;
        }
    }
    let (dx, dy) = QUADRANTS[best];
    TacticIntent::Step { dx, dy }
}
