//! Timed modifiers attached to a single entity.
//!
//! A status is not an entity: it lives in its carrier's [`StatusList`] and is
//! identified there by name. Attaching a status whose name is already present
//! refreshes the existing instance (`duration = max(old, new)`) instead of
//! stacking a second one. Every stat mutation a status makes on attach is
//! recorded in its payload so that the end hook can undo exactly that delta.
//!
//! The per-tick behavior lives in `action::status`; this module only holds
//! the data.

use arrayvec::ArrayVec;

use crate::config::BattleConfig;

use super::{DamageType, EntityId, Position};

/// Active statuses on an entity, in attachment order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusList {
    statuses: ArrayVec<Status, { BattleConfig::MAX_STATUS_EFFECTS }>,
}

impl StatusList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Status> {
        self.statuses.iter().find(|status| status.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Status> {
        self.statuses.iter_mut().find(|status| status.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns the status back if the list is full.
    pub(crate) fn push(&mut self, status: Status) -> Result<(), Status> {
        self.statuses.try_push(status).map_err(|err| err.element())
    }

    pub(crate) fn remove(&mut self, name: &str) -> Option<Status> {
        let index = self.statuses.iter().position(|status| status.name == name)?;
        Some(self.statuses.remove(index))
    }

    pub fn is_full(&self) -> bool {
        self.statuses.is_full()
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Status> {
        self.statuses.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.statuses.iter().map(|status| status.name.as_str())
    }
}

/// A timed modifier. Also used as an unattached template inside skills.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Status {
    /// De-duplication key.
    pub name: String,
    /// Ticks remaining. [`BattleConfig::NEAR_INFINITE_DURATION`] means "until removed".
    pub duration: i32,
    /// Entity credited for kills caused by this status.
    pub owner: Option<EntityId>,
    pub kind: StatusKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatusKind {
    /// Deals `power` magical damage every `interval + 1` ticks.
    Poison {
        power: i32,
        interval: i32,
        timer: i32,
    },
    /// Grants `armor` points against one damage type.
    Shield { armor: i32, damage_type: DamageType },
    /// Holds the carrier's next action at its default value.
    Stunned {
        #[cfg_attr(feature = "serde", serde(default))]
        marker: Option<EntityId>,
    },
    /// Shaves `speedup` off the carrier's countdown every tick.
    Haste { speedup: i32 },
    /// Fading out; becomes [`StatusKind::Vanished`] for `vanished_duration` on end.
    Vanishing { vanished_duration: i32 },
    /// Off the board; returns to `return_to` on end, or dies if it is taken.
    Vanished {
        #[cfg_attr(feature = "serde", serde(default))]
        return_to: Position,
    },
    /// Skill cooldowns are pinned. Only attaches to active generals.
    FreezeCooldowns,
    /// Raises power by `percent` of its value at attach time.
    Empower {
        percent: i32,
        #[cfg_attr(feature = "serde", serde(default))]
        bonus: i32,
    },
    /// Power drops to zero until the status ends.
    Blind {
        #[cfg_attr(feature = "serde", serde(default))]
        saved_power: i32,
    },
    /// Generals chase the owner's position; minions switch to `attack_general`.
    Taunted,
    /// Inactive while being recalled to the board.
    Recalling,
}

impl Status {
    // ===== status names =====
    pub const POISON: &'static str = "Poison";
    pub const BURNT: &'static str = "Burnt";
    pub const SHIELD: &'static str = "Shield";
    pub const STUNNED: &'static str = "Stunned";
    pub const HASTE: &'static str = "Haste";
    pub const VANISHING: &'static str = "Vanishing";
    pub const VANISHED: &'static str = "Vanished";
    pub const FREEZE_COOLDOWNS: &'static str = "Freeze cooldowns";
    pub const EMPOWER: &'static str = "Empower";
    pub const BLIND: &'static str = "Blindness";
    pub const TAUNTED: &'static str = "Taunted";
    pub const RECALLING: &'static str = "Recalling";

    pub fn new(name: impl Into<String>, duration: i32, kind: StatusKind) -> Self {
        Self {
            name: name.into(),
            duration,
            owner: None,
            kind,
        }
    }

    #[must_use]
    pub fn with_owner(mut self, owner: EntityId) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Poison ticking `ticks` times, once every `interval + 1` updates.
    pub fn poison(power: i32, interval: i32, ticks: i32) -> Self {
        Self::new(
            Self::POISON,
            ticks * (interval + 1),
            StatusKind::Poison {
                power,
                interval,
                timer: 0,
            },
        )
    }

    /// Single-hit poison applied by lava.
    pub fn burnt() -> Self {
        Self {
            name: Self::BURNT.into(),
            ..Self::poison(1, 2, 1)
        }
    }

    pub fn shield(duration: i32, armor: i32, damage_type: DamageType) -> Self {
        Self::new(Self::SHIELD, duration, StatusKind::Shield { armor, damage_type })
    }

    pub fn stunned(duration: i32) -> Self {
        Self::new(Self::STUNNED, duration, StatusKind::Stunned { marker: None })
    }

    pub fn haste(duration: i32, speedup: i32) -> Self {
        Self::new(Self::HASTE, duration, StatusKind::Haste { speedup })
    }

    pub fn vanishing(duration: i32, vanished_duration: i32) -> Self {
        Self::new(
            Self::VANISHING,
            duration,
            StatusKind::Vanishing { vanished_duration },
        )
    }

    pub fn vanished(duration: i32) -> Self {
        Self::new(
            Self::VANISHED,
            duration,
            StatusKind::Vanished {
                return_to: Position::NOWHERE,
            },
        )
    }

    pub fn freeze_cooldowns(duration: i32) -> Self {
        Self::new(Self::FREEZE_COOLDOWNS, duration, StatusKind::FreezeCooldowns)
    }

    pub fn empower(duration: i32, percent: i32) -> Self {
        Self::new(Self::EMPOWER, duration, StatusKind::Empower { percent, bonus: 0 })
    }

    pub fn blind(duration: i32) -> Self {
        Self::new(Self::BLIND, duration, StatusKind::Blind { saved_power: 0 })
    }

    pub fn taunted(duration: i32) -> Self {
        Self::new(Self::TAUNTED, duration, StatusKind::Taunted)
    }

    pub fn recalling(duration: i32) -> Self {
        Self::new(Self::RECALLING, duration, StatusKind::Recalling)
    }

    /// Whether this status keeps its carrier out of action (`next_action`
    /// pinned high) while it lasts.
    pub fn suspends_carrier(&self) -> bool {
        matches!(
            self.kind,
            StatusKind::Vanishing { .. } | StatusKind::Vanished { .. } | StatusKind::Recalling
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poison_duration_covers_every_tick() {
        let poison = Status::poison(5, 19, 4);
        assert_eq!(poison.duration, 80);
        let burnt = Status::burnt();
        assert_eq!(burnt.name, "Burnt");
        assert_eq!(burnt.duration, 3);
    }

    #[test]
    fn list_lookup_is_by_name() {
        let mut list = StatusList::new();
        list.push(Status::shield(10, 3, DamageType::Physical)).unwrap();
        list.push(Status::haste(5, 1)).unwrap();
        assert!(list.contains("Shield"));
        assert_eq!(list.names().collect::<Vec<_>>(), vec!["Shield", "Haste"]);
        assert!(list.remove("Shield").is_some());
        assert!(!list.contains("Shield"));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn full_list_hands_the_status_back() {
        let mut list = StatusList::new();
        for i in 0..BattleConfig::MAX_STATUS_EFFECTS {
            list.push(Status::taunted(i as i32)).unwrap();
        }
        let rejected = list.push(Status::blind(3)).unwrap_err();
        assert_eq!(rejected.name, "Blindness");
    }
}
