use super::{EntityId, Position};

/// Transient board marker. Effects sit in a tile's effect stack and never
/// claim the tile's occupant slot.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Effect {
    pub kind: EffectKind,
    /// Physical damage dealt by striking effects.
    pub power: i32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectKind {
    /// Flies forward one tile per tick and breaks on the first attackable occupant.
    Arrow,
    /// Rolls forward one tile per tick, striking every entity once, allies included.
    Wave {
        #[cfg_attr(feature = "serde", serde(default))]
        struck: Vec<EntityId>,
    },
    /// Flag or stun marker. Toggles visibility every default cadence.
    Blinking {
        #[cfg_attr(feature = "serde", serde(default = "visible"))]
        visible: bool,
    },
    /// Lingering marker removed once `duration` drops below zero.
    Temp { duration: i32 },
    /// Strikes its tile after `warmup` ticks, then disappears.
    Explosion { warmup: u8 },
    /// Strikes on spawn, then burns whoever stands on it for `duration` ticks.
    Lava { duration: i32 },
    /// Sweeps around `general` for `max_steps` ticks.
    Slash {
        general: EntityId,
        step: i32,
        max_steps: i32,
    },
    /// Ping-pongs along `path`, reversing on every hit.
    Bouncing {
        path: Vec<Position>,
        #[cfg_attr(feature = "serde", serde(default = "first_leg"))]
        cursor: usize,
        #[cfg_attr(feature = "serde", serde(default = "forward"))]
        direction: i32,
    },
}

#[cfg(feature = "serde")]
fn visible() -> bool {
    true
}

#[cfg(feature = "serde")]
fn first_leg() -> usize {
    1
}

#[cfg(feature = "serde")]
fn forward() -> i32 {
    1
}

impl Effect {
    pub fn arrow(power: i32) -> Self {
        Self {
            kind: EffectKind::Arrow,
            power,
        }
    }

    pub fn wave(power: i32) -> Self {
        Self {
            kind: EffectKind::Wave { struck: Vec::new() },
            power,
        }
    }

    pub fn blinking() -> Self {
        Self {
            kind: EffectKind::Blinking { visible: true },
            power: 0,
        }
    }

    pub fn temp(duration: i32) -> Self {
        Self {
            kind: EffectKind::Temp { duration },
            power: 0,
        }
    }

    pub fn explosion(power: i32) -> Self {
        Self {
            kind: EffectKind::Explosion { warmup: 2 },
            power,
        }
    }

    pub fn lava(power: i32, duration: i32) -> Self {
        Self {
            kind: EffectKind::Lava { duration },
            power,
        }
    }

    pub fn slash(general: EntityId, power: i32, max_steps: i32) -> Self {
        Self {
            kind: EffectKind::Slash {
                general,
                step: 0,
                max_steps,
            },
            power,
        }
    }

    pub fn bouncing(power: i32, path: Vec<Position>) -> Self {
        Self {
            kind: EffectKind::Bouncing {
                path,
                cursor: 1,
                direction: 1,
            },
            power,
        }
    }

    /// Whether the effect is currently listed in its tile's effect stack.
    pub fn is_visible(&self) -> bool {
        match self.kind {
            EffectKind::Blinking { visible } => visible,
            _ => true,
        }
    }

    pub fn glyph(&self) -> char {
        match &self.kind {
            EffectKind::Arrow => '>',
            EffectKind::Wave { .. } => '~',
            EffectKind::Blinking { .. } => 'q',
            EffectKind::Temp { .. } => '/',
            EffectKind::Explosion { .. } => '*',
            EffectKind::Lava { .. } => 'L',
            EffectKind::Slash { .. } => '|',
            EffectKind::Bouncing { .. } => 'o',
        }
    }
}
