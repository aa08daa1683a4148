//! Battlefield objects.
//!
//! Every object shares one [`Entity`] record (position, side, clocks,
//! statuses, kill credit) and carries its kind-specific data in
//! [`EntityKind`]. Multi-tile bodies are a property of the kind
//! ([`Entity::footprint_len`]), not a separate hierarchy.

use crate::config::BattleConfig;
use crate::formation::Formation;
use crate::tactic::Tactic;

use super::{Armor, DamageType, Effect, EntityId, Position, Side, Skill, StatusList};

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entity {
    pub id: EntityId,
    pub side: Side,
    /// Anchor tile (top-left of the footprint). [`Position::NOWHERE`] when off the board.
    pub position: Position,
    pub alive: bool,
    /// Ticks until this entity may act again.
    pub next_action: i32,
    pub default_next_action: i32,
    pub statuses: StatusList,
    pub kills: u32,
    /// Back-reference used to forward kill credit to a caster.
    pub owner: Option<EntityId>,
    /// Set after being shoved; the next own move is consumed.
    pub pushed: bool,
    /// Last horizontal direction moved (+1 or -1).
    pub facing: i32,
    pub glyph: char,
    pub kind: EntityKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EntityKind {
    Unit(Unit),
    General(Box<General>),
    /// Neutral trap: whoever attacks it takes `power` back and the mine breaks.
    Mine { power: i32 },
    Fortress(Fortress),
    Effect(Effect),
}

/// Combat stats shared by minions and generals.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Unit {
    pub name: String,
    pub hp: i32,
    pub max_hp: i32,
    pub armor: Armor,
    pub power: i32,
    pub damage_type: DamageType,
    pub tactic: Tactic,
    /// Glyph of the visual spawned on the defender when this unit strikes.
    pub attack_glyph: char,
    pub class: UnitClass,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnitClass {
    Basic,
    /// Occupies a `length` x `length` block.
    Big { length: i32 },
    /// Fires arrows of `ranged_power` while holding position.
    Ranged { ranged_power: i32 },
}

impl Unit {
    pub fn health_ratio(&self) -> f32 {
        if self.max_hp <= 0 {
            0.0
        } else {
            self.hp as f32 / self.max_hp as f32
        }
    }
}

/// Blueprint for spawning minions.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct UnitTemplate {
    pub name: String,
    pub glyph: char,
    pub max_hp: i32,
    pub armor: Armor,
    pub power: i32,
    pub damage_type: DamageType,
    pub default_next_action: i32,
    pub class: UnitClass,
}

impl UnitTemplate {
    pub const MINION_HP: i32 = 30;
    pub const MINION_POWER: i32 = 5;

    pub fn minion(name: impl Into<String>, glyph: char) -> Self {
        Self {
            name: name.into(),
            glyph,
            max_hp: Self::MINION_HP,
            armor: Armor::NONE,
            power: Self::MINION_POWER,
            damage_type: DamageType::Physical,
            default_next_action: BattleConfig::DEFAULT_NEXT_ACTION,
            class: UnitClass::Basic,
        }
    }

    /// Giant occupying a `length` x `length` block; hp scales with `length`.
    pub fn big(name: impl Into<String>, glyph: char, length: i32) -> Self {
        Self {
            max_hp: Self::MINION_HP * length,
            class: UnitClass::Big { length },
            ..Self::minion(name, glyph)
        }
    }

    pub fn ranged(name: impl Into<String>, glyph: char) -> Self {
        Self {
            max_hp: 10,
            power: 1,
            default_next_action: 10,
            class: UnitClass::Ranged { ranged_power: 4 },
            ..Self::minion(name, glyph)
        }
    }

    pub fn footprint_len(&self) -> i32 {
        match self.class {
            UnitClass::Big { length } => length,
            _ => 1,
        }
    }

    pub(crate) fn instantiate(&self, side: Side, tactic: Tactic) -> Unit {
        Unit {
            name: self.name.clone(),
            hp: self.max_hp,
            max_hp: self.max_hp,
            armor: self.armor,
            power: self.power,
            damage_type: self.damage_type,
            tactic,
            attack_glyph: attack_glyph(side),
            class: self.class,
        }
    }
}

impl Default for UnitTemplate {
    fn default() -> Self {
        Self::minion("minion", 'm')
    }
}

pub(crate) fn attack_glyph(side: Side) -> char {
    match side {
        Side::First => '\\',
        _ => '/',
    }
}

/// Strategic-layer bookkeeping carried by generals but unused in battle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Deployment {
    pub cost: i32,
    pub requisition: i32,
    pub deployed: bool,
}

/// Faction rule a general carries on top of the stock behavior.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GeneralRule {
    #[default]
    Standard,
    /// While the `null` tactic is selected, every action of the general runs
    /// one generation of the life rule over its side's minions.
    Life,
    /// The first lethal blow turns the general into this form instead of
    /// killing it.
    Rebirth(Box<RebirthForm>),
}

/// What a general becomes when its rebirth triggers.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RebirthForm {
    pub name: String,
    pub glyph: char,
    pub skills: Vec<Skill>,
}

/// Commanding unit of a side.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct General {
    pub unit: Unit,
    pub skills: Vec<Skill>,
    pub tactics: Vec<Tactic>,
    pub selected_tactic: usize,
    pub previous_tactic: usize,
    /// Blinking marker of the current move order.
    pub flag: Option<EntityId>,
    pub swap_cd: i32,
    pub swap_max_cd: i32,
    /// Next-action delay imposed on a general swapped in from reserve.
    pub swap_sickness: i32,
    pub last_skill_used: Option<usize>,
    pub minions_alive: i32,
    pub starting_minions: i32,
    pub minion: UnitTemplate,
    pub formation: Formation,
    pub deployment: Deployment,
    pub ai_controlled: bool,
    pub rule: GeneralRule,
}

impl General {
    pub fn selected(&self) -> Tactic {
        self.tactics
            .get(self.selected_tactic)
            .copied()
            .unwrap_or(Tactic::Null)
    }

    pub fn swap_ready(&self) -> bool {
        self.swap_cd >= self.swap_max_cd
    }

    pub fn ready_skills(&self) -> impl Iterator<Item = (usize, &Skill)> {
        self.skills
            .iter()
            .enumerate()
            .filter(|(_, skill)| skill.is_ready())
    }
}

/// Capturable 2x2 structure that can host generals.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Fortress {
    pub capacity: usize,
    pub guests: Vec<EntityId>,
    /// Reachable fortresses and the tile next to this one the path starts from.
    pub connections: Vec<(EntityId, Position)>,
    /// Display glyph per slot, re-derived from the current guests.
    pub glyphs: Vec<char>,
}

impl Fortress {
    pub const LENGTH: i32 = 2;

    pub fn new() -> Self {
        Self {
            capacity: BattleConfig::MAX_FORTRESS_GUESTS,
            guests: Vec::new(),
            connections: Vec::new(),
            glyphs: vec![':'; BattleConfig::MAX_FORTRESS_GUESTS],
        }
    }

    pub fn is_full(&self) -> bool {
        self.guests.len() >= self.capacity
    }
}

impl Default for Fortress {
    fn default() -> Self {
        Self::new()
    }
}

impl Entity {
    pub fn new(id: EntityId, side: Side, position: Position, glyph: char, kind: EntityKind) -> Self {
        let default_next_action = match &kind {
            EntityKind::Unit(unit) => match unit.class {
                UnitClass::Ranged { .. } => 10,
                _ => BattleConfig::DEFAULT_NEXT_ACTION,
            },
            _ => BattleConfig::DEFAULT_NEXT_ACTION,
        };
        Self {
            id,
            side,
            position,
            alive: true,
            next_action: default_next_action,
            default_next_action,
            statuses: StatusList::new(),
            kills: 0,
            owner: None,
            pushed: false,
            facing: side.forward(),
            glyph,
            kind,
        }
    }

    pub fn unit(&self) -> Option<&Unit> {
        match &self.kind {
            EntityKind::Unit(unit) => Some(unit),
            EntityKind::General(general) => Some(&general.unit),
            _ => None,
        }
    }

    pub fn unit_mut(&mut self) -> Option<&mut Unit> {
        match &mut self.kind {
            EntityKind::Unit(unit) => Some(unit),
            EntityKind::General(general) => Some(&mut general.unit),
            _ => None,
        }
    }

    pub fn general(&self) -> Option<&General> {
        match &self.kind {
            EntityKind::General(general) => Some(general),
            _ => None,
        }
    }

    pub fn general_mut(&mut self) -> Option<&mut General> {
        match &mut self.kind {
            EntityKind::General(general) => Some(general),
            _ => None,
        }
    }

    pub fn effect(&self) -> Option<&Effect> {
        match &self.kind {
            EntityKind::Effect(effect) => Some(effect),
            _ => None,
        }
    }

    pub fn effect_mut(&mut self) -> Option<&mut Effect> {
        match &mut self.kind {
            EntityKind::Effect(effect) => Some(effect),
            _ => None,
        }
    }

    pub fn fortress(&self) -> Option<&Fortress> {
        match &self.kind {
            EntityKind::Fortress(fortress) => Some(fortress),
            _ => None,
        }
    }

    pub fn fortress_mut(&mut self) -> Option<&mut Fortress> {
        match &mut self.kind {
            EntityKind::Fortress(fortress) => Some(fortress),
            _ => None,
        }
    }

    pub fn is_effect(&self) -> bool {
        matches!(self.kind, EntityKind::Effect(_))
    }

    pub fn is_general(&self) -> bool {
        matches!(self.kind, EntityKind::General(_))
    }

    pub fn hp(&self) -> Option<i32> {
        self.unit().map(|unit| unit.hp)
    }

    pub fn is_ally(&self, other: &Entity) -> bool {
        self.side == other.side
    }

    /// Side length of the square body.
    pub fn footprint_len(&self) -> i32 {
        match &self.kind {
            EntityKind::Unit(Unit {
                class: UnitClass::Big { length },
                ..
            }) => *length,
            EntityKind::Fortress(_) => Fortress::LENGTH,
            _ => 1,
        }
    }

    /// Tiles covered when anchored at `anchor`, column by column.
    pub fn footprint_at(&self, anchor: Position) -> Vec<Position> {
        footprint(anchor, self.footprint_len())
    }

    pub fn footprint(&self) -> Vec<Position> {
        self.footprint_at(self.position)
    }

    pub fn can_be_attacked(&self) -> bool {
        !self.is_effect()
    }

    /// Whether the kind can ever be shoved; the tile check happens separately.
    pub fn is_pushable(&self) -> bool {
        match &self.kind {
            EntityKind::Unit(unit) => !matches!(unit.class, UnitClass::Big { .. }),
            EntityKind::Mine { .. } => true,
            _ => false,
        }
    }

    pub fn reset_action(&mut self) {
        self.next_action = self.default_next_action;
    }

    pub fn is_on_board(&self) -> bool {
        self.alive && !self.is_effect() && !self.position.is_nowhere()
    }
}

pub(crate) fn footprint(anchor: Position, length: i32) -> Vec<Position> {
    let mut cells = Vec::with_capacity((length * length).max(1) as usize);
    for i in 0..length {
        for j in 0..length {
            cells.push(anchor.offset(i, j));
        }
    }
    cells
}
