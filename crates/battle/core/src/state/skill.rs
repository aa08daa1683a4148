use crate::area::Area;

use super::{DamageType, Effect, Position, Side, Status};

/// Behavioral tag for a skill, set when the skill is defined.
///
/// Descriptions stay player-facing flavor; AI scoring reads the category.
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
pub enum SkillCategory {
    Damage,
    Heal,
    Buff,
    Movement,
    #[default]
    Other,
}

impl SkillCategory {
    const DAMAGE_KEYWORDS: [&'static str; 6] =
        ["damage", "deals", "area", "explosion", "burst", "nova"];
    const HEAL_KEYWORDS: [&'static str; 4] = ["heal", "restore", "regenerate", "mend"];
    const BUFF_KEYWORDS: [&'static str; 6] =
        ["grants", "shield", "buff", "enhance", "armor", "resist"];
    const MOVEMENT_KEYWORDS: [&'static str; 5] = ["teleport", "blink", "move", "dash", "rush"];

    /// Derives a category from free-text flavor, for definitions that omit one.
    ///
    /// Keyword groups are checked in order (damage, heal, buff, movement), so
    /// "deals damage and heals" is a damage skill.
    pub fn from_description(description: &str) -> Self {
        let text = description.to_lowercase();
        let matches = |keywords: &[&str]| keywords.iter().any(|keyword| text.contains(keyword));

        if matches(&Self::DAMAGE_KEYWORDS) {
            Self::Damage
        } else if matches(&Self::HEAL_KEYWORDS) {
            Self::Heal
        } else if matches(&Self::BUFF_KEYWORDS) {
            Self::Buff
        } else if matches(&Self::MOVEMENT_KEYWORDS) {
            Self::Movement
        } else {
            Self::Other
        }
    }
}

/// What a skill does to each tile its area yields (or to the caster, for
/// untargeted effects).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SkillEffect {
    /// Restores hp to the occupant; fails on empty tiles and full health.
    Heal { amount: i32 },
    /// Drops a copy of the placeable on an empty, passable tile.
    Place(Placeable),
    /// Attaches a copy of the status, owned by the caster.
    ApplyStatus(Status),
    /// Strikes the occupant with the caster as attacker.
    Nuke { power: i32, damage_type: DamageType },
    /// Magical nuke on every tile of a circle around the target.
    Explosion { power: i32, radius: i32 },
    /// Kills the occupant, heals the caster, and shifts every cooldown.
    Consume { hp_gain: i32, cooldown_delta: i32 },
    /// Leaves a lingering marker on passable tiles.
    Darkness { duration: i32 },
    /// Moves the caster onto the target tile.
    TeleportSelf,
    /// Spawns one minion from the caster's template.
    SummonMinion,
    /// Brings back a vanished ally onto the target tile.
    Recall { duration: i32 },
    /// Pushes everything around the target one tile outward.
    WaterPusher,
    /// Untargeted: redeploys `number` minions in formation.
    RestockMinions { number: i32 },
    /// Untargeted: three-lane wave burst in front of the caster.
    SonicWaves { power: i32, waves: i32 },
    /// Seeds a shape of minions from the caster's template around the target.
    Pattern(MinionPattern),
    Nothing,
}

impl SkillEffect {
    /// Whether the effect ignores the target tile entirely.
    pub fn is_untargeted(&self) -> bool {
        matches!(
            self,
            Self::RestockMinions { .. } | Self::SonicWaves { .. } | Self::Nothing
        )
    }
}

/// Shapes of minions a skill can seed. Drawn for the first side and
/// mirrored horizontally for the second.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MinionPattern {
    /// Five-cell glider heading down, or up when `downward` is false.
    Glider { downward: bool },
    /// Nine-cell lightweight ship heading forward.
    Lightweight,
}

impl MinionPattern {
    /// Cells of the shape centered on `at`, or nothing when its bounding
    /// box leaves the grid of `width` by `height`.
    pub fn cells(self, side: Side, at: Position, width: i32, height: i32) -> Vec<Position> {
        let reach = match self {
            Self::Glider { .. } => 1,
            Self::Lightweight => 2,
        };
        let inside = |x: i32, y: i32| (0..width).contains(&x) && (0..height).contains(&y);
        if !inside(at.x - reach, at.y - reach) || !inside(at.x + reach, at.y + reach) {
            return Vec::new();
        }

        let offsets: &[(i32, i32)] = match self {
            Self::Glider { downward: true } => &[(-1, -1), (0, -1), (0, 0), (1, 0), (-1, 1)],
            Self::Glider { downward: false } => &[(-1, 1), (0, 1), (0, 0), (1, 0), (-1, -1)],
            Self::Lightweight => &[
                (-1, -1),
                (0, -1),
                (1, -1),
                (2, -1),
                (-2, 0),
                (2, 0),
                (2, 1),
                (-2, 2),
                (1, 2),
            ],
        };
        offsets
            .iter()
            .map(|&(dx, dy)| at.offset(side.mirror_dx(dx), dy))
            .collect()
    }
}

/// Something a skill can drop onto the board.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Placeable {
    Mine { power: i32 },
    Effect(Effect),
}

/// Cooldown-gated ability owned by a general.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Skill {
    pub name: String,
    pub description: String,
    pub category: SkillCategory,
    pub effect: SkillEffect,
    pub area: Option<Area>,
    /// Charges up by one per tick; the skill is ready at `cd >= max_cd`.
    pub cd: i32,
    pub max_cd: i32,
}

impl Skill {
    pub fn new(
        name: impl Into<String>,
        category: SkillCategory,
        effect: SkillEffect,
        max_cd: i32,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            category,
            effect,
            area: None,
            cd: 0,
            max_cd,
        }
    }

    #[must_use]
    pub fn with_area(mut self, area: Area) -> Self {
        self.area = Some(area);
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn is_ready(&self) -> bool {
        self.cd >= self.max_cd
    }

    /// Shifts the cooldown by `delta`, clamped to `0..=max_cd`.
    pub fn change_cd(&mut self, delta: i32) {
        self.cd = (self.cd + delta).clamp(0, self.max_cd.max(0));
    }

    pub fn reset_cd(&mut self) {
        self.cd = 0;
    }

    /// One tick of charging.
    pub fn tick(&mut self) {
        if self.cd < self.max_cd {
            self.cd += 1;
        }
    }
}
