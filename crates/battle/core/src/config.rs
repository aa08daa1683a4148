use crate::state::Position;

/// Battle configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BattleConfig {
    /// Arena width in tiles (ignored when a map file supplies the layout).
    pub width: i32,
    /// Arena height in tiles (ignored when a map file supplies the layout).
    pub height: i32,
    /// Starting tiles of the two generals, indexed by side.
    pub general_starts: [Position; 2],
    /// Overrides every general's starting minion count when set.
    pub starting_minions: Option<i32>,
}

impl BattleConfig {
    // ===== compile-time constants =====
    /// Turns between an action being submitted and being resolved.
    pub const TURN_LAG: u64 = 1;
    /// Roster lists are compacted every this many turns.
    pub const SWEEP_INTERVAL: u64 = 100;
    /// Duration used for statuses that last until removed.
    pub const NEAR_INFINITE_DURATION: i32 = 9999;
    /// Cooldown knocked off every skill of a general that casts one.
    pub const OVERCAST_REDUCTION: i32 = 5;
    /// Ticks between actions for ordinary units.
    pub const DEFAULT_NEXT_ACTION: i32 = 5;
    /// Next-action value held by units that are fading, vanished or recalling.
    pub const SUSPENDED_NEXT_ACTION: i32 = 100;
    pub const MAX_STATUS_EFFECTS: usize = 16;
    pub const MAX_FORTRESS_GUESTS: usize = 4;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_WIDTH: i32 = 60;
    pub const DEFAULT_HEIGHT: i32 = 43;
    pub const DEFAULT_GENERAL_STARTS: [Position; 2] = [Position { x: 3, y: 21 }, Position { x: 56, y: 21 }];

    pub fn new() -> Self {
        Self {
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_HEIGHT,
            general_starts: Self::DEFAULT_GENERAL_STARTS,
            starting_minions: None,
        }
    }

    pub fn with_dimensions(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            ..Self::new()
        }
    }

    pub fn with_general_starts(mut self, first: Position, second: Position) -> Self {
        self.general_starts = [first, second];
        self
    }

    pub fn with_starting_minions(mut self, count: i32) -> Self {
        self.starting_minions = Some(count);
        self
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}
