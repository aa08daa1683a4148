use crate::state::{Position, Side};

/// Deployment pattern used to lay out a general's minions.
///
/// A formation only enumerates candidate tiles in placement order; the
/// caller skips candidates that cannot hold a minion and stops once enough
/// minions are down.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Formation {
    /// Columns five to fourteen from the general's edge, rows fanning out
    /// around the general's row.
    Rows { rows: i32 },
    FlyingWedge { increment: i32 },
    InvertedWedge { increment: i32 },
}

impl Default for Formation {
    fn default() -> Self {
        Self::Rows { rows: 21 }
    }
}

impl Formation {
    /// Candidate tiles for a general of `side` standing on row `anchor_y`.
    pub fn slots(self, side: Side, anchor_y: i32, width: i32, height: i32) -> Vec<Position> {
        let mirror = |x: i32, y: i32| {
            if side == Side::Second {
                Position::new(width - x - 1, height - y - 1)
            } else {
                Position::new(x, y)
            }
        };

        let mut slots = Vec::new();
        match self {
            Formation::Rows { rows } => {
                for x in 5..15 {
                    let mut offset = 0;
                    let mut r = rows;
                    while r > 0 {
                        slots.push(mirror(x, anchor_y + offset));
                        offset = if r % 2 != 0 || rows % 2 == 0 {
                            offset.abs() + 1
                        } else {
                            -offset
                        };
                        r -= 1;
                    }
                }
            }
            Formation::FlyingWedge { increment } => {
                for i in (4..=14).rev() {
                    let mut offset = 0;
                    for x in (4..=i).rev() {
                        wedge_column(&mut slots, &mirror, x, anchor_y, &mut offset, increment);
                    }
                }
            }
            Formation::InvertedWedge { increment } => {
                for i in 4..15 {
                    let mut offset = 0;
                    for x in i..15 {
                        wedge_column(&mut slots, &mirror, x, anchor_y, &mut offset, increment);
                    }
                }
            }
        }
        slots
    }
}

fn wedge_column(
    slots: &mut Vec<Position>,
    mirror: &impl Fn(i32, i32) -> Position,
    x: i32,
    anchor_y: i32,
    offset: &mut i32,
    increment: i32,
) {
    for j in 0..=increment {
        slots.push(mirror(x, anchor_y + *offset));
        *offset = if j % 2 != 0 {
            offset.abs() + 1
        } else {
            -*offset
        };
    }
}
