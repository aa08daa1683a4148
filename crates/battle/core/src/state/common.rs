use std::fmt;

/// Unique identifier for any entity tracked in the battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Discrete grid position expressed in tile coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };
    /// Off-grid sentinel. Entities that left the board (vanished, benched,
    /// hosted) report this position.
    pub const NOWHERE: Self = Self { x: -1, y: -1 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub const fn is_nowhere(self) -> bool {
        self.x == Self::NOWHERE.x && self.y == Self::NOWHERE.y
    }

    pub fn manhattan(self, other: Self) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    pub fn chebyshev(self, other: Self) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::ORIGIN
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Unit step toward `delta`, treating zero as positive.
pub fn step_toward(delta: i32) -> i32 {
    if delta < 0 { -1 } else { 1 }
}

/// Unit step toward `delta`, standing still on zero.
pub fn step_toward_or_hold(delta: i32) -> i32 {
    delta.signum()
}

/// Faction an entity fights for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Side {
    /// Deploys on the left edge and advances toward +x.
    First,
    /// Deploys on the right edge and advances toward -x.
    Second,
    /// Unaligned structures and hazards (mines, empty fortresses).
    Neutral,
}

impl Side {
    pub const PLAYERS: [Side; 2] = [Side::First, Side::Second];

    pub const fn from_index(index: usize) -> Self {
        match index {
            0 => Self::First,
            1 => Self::Second,
            _ => Self::Neutral,
        }
    }

    pub const fn index(self) -> Option<usize> {
        match self {
            Self::First => Some(0),
            Self::Second => Some(1),
            Self::Neutral => None,
        }
    }

    pub const fn opponent(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
            Self::Neutral => Self::Neutral,
        }
    }

    /// Horizontal direction toward the enemy baseline.
    pub const fn forward(self) -> i32 {
        match self {
            Self::First => 1,
            _ => -1,
        }
    }

    /// Mirrors a horizontal offset so that positive means "forward".
    pub const fn mirror_dx(self, dx: i32) -> i32 {
        match self {
            Self::First => dx,
            _ => -dx,
        }
    }
}

/// Damage channel used to pick the defending armor value.
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
pub enum DamageType {
    #[default]
    Physical,
    Magical,
}

/// Per-damage-type armor; unlisted types default to zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Armor {
    pub physical: i32,
    pub magical: i32,
}

impl Armor {
    pub const NONE: Self = Self {
        physical: 0,
        magical: 0,
    };

    pub const fn physical(value: i32) -> Self {
        Self {
            physical: value,
            magical: 0,
        }
    }

    pub const fn get(&self, damage_type: DamageType) -> i32 {
        match damage_type {
            DamageType::Physical => self.physical,
            DamageType::Magical => self.magical,
        }
    }

    pub fn adjust(&mut self, damage_type: DamageType, delta: i32) {
        match damage_type {
            DamageType::Physical => self.physical += delta,
            DamageType::Magical => self.magical += delta,
        }
    }

    /// Damage that survives this armor: `max(0, power - armor[type])`.
    pub const fn mitigate(&self, power: i32, damage_type: DamageType) -> i32 {
        let damage = power - self.get(damage_type);
        if damage > 0 { damage } else { 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_toward_treats_zero_as_positive() {
        assert_eq!(step_toward(0), 1);
        assert_eq!(step_toward(-7), -1);
        assert_eq!(step_toward(3), 1);
        assert_eq!(step_toward_or_hold(0), 0);
    }

    #[test]
    fn side_helpers() {
        assert_eq!(Side::First.opponent(), Side::Second);
        assert_eq!(Side::Second.forward(), -1);
        assert_eq!(Side::from_index(1), Side::Second);
        assert_eq!(Side::Neutral.index(), None);
    }

    #[test]
    fn armor_mitigation_floors_at_zero() {
        let armor = Armor::physical(4);
        assert_eq!(armor.mitigate(10, DamageType::Physical), 6);
        assert_eq!(armor.mitigate(3, DamageType::Physical), 0);
        assert_eq!(armor.mitigate(3, DamageType::Magical), 3);
    }

    #[test]
    fn distances() {
        let a = Position::new(1, 1);
        let b = Position::new(4, -1);
        assert_eq!(a.manhattan(b), 5);
        assert_eq!(a.chebyshev(b), 3);
    }
}
