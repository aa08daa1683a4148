//! General definitions and the stock roster.
//!
//! A [`GeneralSpec`] is the serializable description of a general; the
//! battle turns it into a live entity when the general is fielded or
//! benched.

use crate::action::movement;
use crate::area::{Area, Sieve};
use crate::formation::Formation;
use crate::state::{
    Armor, BattleState, DamageType, Deployment, Entity, EntityId, EntityKind, General, GeneralRule,
    MinionPattern, Placeable, Position, RebirthForm, Side, Skill, SkillCategory, SkillEffect,
    Status, Unit, UnitClass, UnitTemplate, attack_glyph,
};
use crate::tactic::Tactic;

/// Everything needed to field a general.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeneralSpec {
    pub name: String,
    pub glyph: char,
    pub max_hp: i32,
    pub armor: Armor,
    pub power: i32,
    pub damage_type: DamageType,
    pub skills: Vec<Skill>,
    pub tactics: Vec<Tactic>,
    pub minion: UnitTemplate,
    pub formation: Formation,
    pub starting_minions: i32,
    pub swap_max_cd: i32,
    pub swap_sickness: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub rule: GeneralRule,
}

impl GeneralSpec {
    // ===== stock numbers =====
    pub const HP: i32 = 300;
    pub const ARMOR: i32 = 2;
    pub const POWER: i32 = 10;
    pub const SWAP_MAX_CD: i32 = 200;
    pub const SWAP_SICKNESS: i32 = 10;
    pub const STARTING_MINIONS: i32 = 101;
    pub const SKILL_COOLDOWN: i32 = 50;

    /// Stock general leading minions drawn as `minion_glyph`.
    pub fn standard(name: impl Into<String>, minion_glyph: char) -> Self {
        let name = name.into();
        let glyph = name.chars().next().unwrap_or('G');
        Self {
            glyph,
            max_hp: Self::HP,
            armor: Armor::physical(Self::ARMOR),
            power: Self::POWER,
            damage_type: DamageType::Physical,
            skills: default_skills(),
            tactics: Tactic::DEFAULT_SET.to_vec(),
            minion: UnitTemplate::minion(name.clone(), minion_glyph),
            formation: Formation::default(),
            starting_minions: Self::STARTING_MINIONS,
            swap_max_cd: Self::SWAP_MAX_CD,
            swap_sickness: Self::SWAP_SICKNESS,
            rule: GeneralRule::Standard,
            name,
        }
    }

    /// Leader whose minions follow the life rule while the `null` tactic is
    /// selected. Skills seed gliders and light ships.
    pub fn conway(minion_glyph: char) -> Self {
        let cd = Self::SKILL_COOLDOWN;
        let seed = |name: &str, pattern: MinionPattern| {
            Skill::new(name, SkillCategory::Other, SkillEffect::Pattern(pattern), cd)
                .with_area(Area::single_target().with_sieve(Sieve::Empty))
                .with_description("Seeds living minions around an empty tile")
        };
        Self {
            skills: vec![
                seed("Glide from the top!", MinionPattern::Glider { downward: false }),
                seed("Glide from the bottom!", MinionPattern::Glider { downward: true }),
                seed("Lightweight strike force!", MinionPattern::Lightweight),
                Skill::new(
                    "Poison on your veins!",
                    SkillCategory::Damage,
                    SkillEffect::ApplyStatus(Status::poison(19, 4, 5)),
                    cd,
                )
                .with_area(Area::single_target().with_sieve(Sieve::Enemy))
                .with_description("Poisons one enemy, dealing damage over time"),
            ],
            tactics: vec![Tactic::Stop, Tactic::Null],
            rule: GeneralRule::Life,
            ..Self::standard("Conway", minion_glyph)
        }
    }

    /// Frail leader of wizards with no starting army. The first lethal blow
    /// turns it into the Nightspirit instead of ending the battle.
    pub fn emperor() -> Self {
        let cd = Self::SKILL_COOLDOWN;
        let nightspirit = RebirthForm {
            name: "Nightspirit".into(),
            glyph: 'N',
            skills: vec![
                Skill::new(
                    "Thus spake the Nightspirit",
                    SkillCategory::Damage,
                    SkillEffect::SonicWaves { power: 10, waves: 3 },
                    cd,
                )
                .with_description("Three waves that deal damage to everything they cross"),
                Skill::new(
                    "Nightside eclipse",
                    SkillCategory::Other,
                    SkillEffect::Darkness { duration: 20 },
                    cd,
                )
                .with_area(Area::all_battleground()),
                Skill::new(
                    "My wizards are many, but their essence is mine",
                    SkillCategory::Heal,
                    SkillEffect::Consume {
                        hp_gain: 1,
                        cooldown_delta: 1,
                    },
                    cd,
                )
                .with_area(Area::all_battleground().with_sieve(Sieve::AllyMinion)),
                Skill::new(
                    "I am the Emperor!",
                    SkillCategory::Damage,
                    SkillEffect::SonicWaves { power: 50, waves: 50 },
                    250,
                ),
            ],
        };
        Self {
            max_hp: 60,
            starting_minions: 0,
            minion: UnitTemplate::ranged("wizard", 'w'),
            skills: vec![
                Skill::new(
                    "Once destroyed, their souls are being summoned",
                    SkillCategory::Other,
                    SkillEffect::RestockMinions { number: 21 },
                    25,
                ),
                Skill::new(
                    "I curse you of all men",
                    SkillCategory::Other,
                    SkillEffect::ApplyStatus(Status::freeze_cooldowns(15)),
                    cd,
                )
                .with_area(Area::all_battleground().with_sieve(Sieve::EnemyGeneral)),
                Skill::new("Towards the Pantheon", SkillCategory::Other, SkillEffect::WaterPusher, cd)
                    .with_area(Area::single_target()),
            ],
            rule: GeneralRule::Rebirth(Box::new(nightspirit)),
            ..Self::standard("Emperor", 'w')
        }
    }

    /// The live entity for `side`, off the board until placed.
    pub fn instantiate(&self, side: Side) -> Entity {
        let unit = Unit {
            name: self.name.clone(),
            hp: self.max_hp,
            max_hp: self.max_hp,
            armor: self.armor,
            power: self.power,
            damage_type: self.damage_type,
            tactic: Tactic::Stop,
            attack_glyph: attack_glyph(side),
            class: UnitClass::Basic,
        };
        let general = General {
            unit,
            skills: self.skills.clone(),
            tactics: self.tactics.clone(),
            selected_tactic: 0,
            previous_tactic: 0,
            flag: None,
            swap_cd: 0,
            swap_max_cd: self.swap_max_cd,
            swap_sickness: self.swap_sickness,
            last_skill_used: None,
            minions_alive: self.starting_minions,
            starting_minions: self.starting_minions,
            minion: self.minion.clone(),
            formation: self.formation,
            deployment: Deployment::default(),
            ai_controlled: false,
            rule: self.rule.clone(),
        };
        Entity::new(
            EntityId::default(),
            side,
            Position::NOWHERE,
            self.glyph,
            EntityKind::General(Box::new(general)),
        )
    }
}

/// Stock general of `side`; its minions are drawn `d` for the first side and
/// `b` for the second.
pub fn default_general(side: Side) -> GeneralSpec {
    let minion_glyph = if side == Side::First { 'd' } else { 'b' };
    GeneralSpec::standard("General", minion_glyph)
}

/// The five skills every stock general carries.
pub fn default_skills() -> Vec<Skill> {
    let cd = GeneralSpec::SKILL_COOLDOWN;
    vec![
        Skill::new("Don't die!", SkillCategory::Heal, SkillEffect::Heal { amount: 100 }, cd)
            .with_area(Area::single_target().with_sieve(Sieve::AllyMinion))
            .with_description("Heals one of your minions for 100"),
        Skill::new("Heal you all men!", SkillCategory::Heal, SkillEffect::Heal { amount: 20 }, cd)
            .with_area(Area::all_battleground().with_sieve(Sieve::Minion))
            .with_description("Heals every minion on the field for 20"),
        Skill::new(
            "Can't touch this",
            SkillCategory::Other,
            SkillEffect::Place(Placeable::Mine { power: 50 }),
            cd,
        )
        .with_area(Area::single_target().with_sieve(Sieve::Empty))
        .with_description("Lays a mine on an empty tile"),
        Skill::new(
            "Sonic Waves",
            SkillCategory::Damage,
            SkillEffect::SonicWaves { power: 10, waves: 3 },
            cd,
        )
        .with_description("Three waves that deal damage to everything they cross"),
        Skill::new("Hidro Pump", SkillCategory::Other, SkillEffect::WaterPusher, cd)
            .with_area(Area::single_target())
            .with_description("Pushes everything around a tile one step outward"),
    ]
}

/// Fields `spec` as the active general of `side` at `at`.
///
/// Returns `None` if the tile cannot hold it.
pub fn place_general(state: &mut BattleState, side: Side, spec: &GeneralSpec, at: Position) -> Option<EntityId> {
    let slot = side.index()?;
    let mut entity = spec.instantiate(side);
    entity.position = at;
    let id = movement::spawn(state, entity)?;
    state.generals[slot] = Some(id);
    Some(id)
}

/// Adds `spec` to the end of `side`'s reserve list.
pub fn bench_general(state: &mut BattleState, side: Side, spec: &GeneralSpec) -> Option<EntityId> {
    let slot = side.index()?;
    let id = state.allocate_id();
    let mut entity = spec.instantiate(side);
    entity.id = id;
    state.entities.insert(id, entity);
    state.reserves[slot].push(id);
    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Battleground;

    #[test]
    fn stock_general_numbers() {
        let spec = default_general(Side::Second);
        assert_eq!(spec.glyph, 'G');
        assert_eq!(spec.minion.glyph, 'b');
        assert_eq!(spec.skills.len(), 5);
        assert!(spec.skills.iter().all(|skill| skill.max_cd == 50 && skill.cd == 0));

        let entity = spec.instantiate(Side::Second);
        let unit = entity.unit().unwrap();
        assert_eq!((unit.hp, unit.power), (300, 10));
        assert_eq!(unit.armor.get(DamageType::Physical), 2);
        assert_eq!(unit.attack_glyph, '/');
    }

    #[test]
    fn placement_fills_the_roster_slot() {
        let mut state = BattleState::new(Battleground::bordered(20, 10));
        let spec = default_general(Side::First);
        let general = place_general(&mut state, Side::First, &spec, Position::new(3, 4)).unwrap();
        assert_eq!(state.general_id(Side::First), Some(general));
        assert_eq!(place_general(&mut state, Side::Second, &spec, Position::new(3, 4)), None);

        let reserve = bench_general(&mut state, Side::First, &spec).unwrap();
        assert_eq!(state.reserves[0], vec![reserve]);
        assert!(state.entity(reserve).unwrap().position.is_nowhere());
        state.check_occupancy().unwrap();
    }

    #[test]
    fn faction_generals_carry_their_rules() {
        let conway = GeneralSpec::conway('c');
        assert_eq!(conway.glyph, 'C');
        assert_eq!(conway.tactics, vec![Tactic::Stop, Tactic::Null]);
        assert_eq!(conway.rule, GeneralRule::Life);
        assert_eq!(conway.skills.len(), 4);

        let emperor = GeneralSpec::emperor();
        assert_eq!((emperor.max_hp, emperor.starting_minions), (60, 0));
        assert!(matches!(emperor.minion.class, UnitClass::Ranged { .. }));
        let GeneralRule::Rebirth(form) = &emperor.rule else {
            panic!("emperor is reborn");
        };
        assert_eq!(form.name, "Nightspirit");

        let entity = emperor.instantiate(Side::First);
        assert_eq!(entity.general().unwrap().rule, emperor.rule);
    }
}
