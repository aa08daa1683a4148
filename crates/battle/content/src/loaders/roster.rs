//! General roster loader.
//!
//! Entries only name what differs from the stock general; everything else
//! falls back to [`GeneralSpec::standard`], or to the faction general named
//! by `faction`.
//!
//! ```ron
//! #![enable(implicit_some)]
//! (
//!     first: [
//!         (name: "Hannibal", minion_glyph: 'd'),
//!         (name: "Mago", minion_glyph: 'd', formation: FlyingWedge(increment: 2)),
//!         (name: "Conway", minion_glyph: 'd', faction: Conway),
//!     ],
//!     second: [
//!         (
//!             name: "Scipio",
//!             minion_glyph: 'b',
//!             skills: [(
//!                 name: "Volley",
//!                 description: "Deals damage around a tile",
//!                 effect: Explosion(power: 20, radius: 2),
//!                 area: (shape: SingleTarget),
//!             )],
//!         ),
//!     ],
//! )
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use skirmish_core::{
    Area, Armor, Formation, GeneralSpec, Skill, SkillCategory, SkillEffect, Tactic, UnitTemplate,
};

use crate::loaders::{LoadResult, read_file};

/// Both sides' rosters; the first general of each list takes the field.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RosterFile {
    #[serde(default)]
    pub first: Vec<GeneralEntry>,
    #[serde(default)]
    pub second: Vec<GeneralEntry>,
}

impl RosterFile {
    pub fn into_rosters(self) -> [Vec<GeneralSpec>; 2] {
        [
            self.first.iter().map(GeneralEntry::to_spec).collect(),
            self.second.iter().map(GeneralEntry::to_spec).collect(),
        ]
    }
}

/// Faction general an entry builds on instead of the stock one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Faction {
    /// Minions follow the life rule under the `null` tactic.
    Conway,
    /// Wizard leader reborn once as the Nightspirit.
    Emperor,
}

impl Faction {
    fn base(self, minion_glyph: char) -> GeneralSpec {
        let mut spec = match self {
            Self::Conway => GeneralSpec::conway(minion_glyph),
            Self::Emperor => GeneralSpec::emperor(),
        };
        spec.minion.glyph = minion_glyph;
        spec
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneralEntry {
    pub name: String,
    pub minion_glyph: char,
    #[serde(default)]
    pub faction: Option<Faction>,
    #[serde(default)]
    pub glyph: Option<char>,
    #[serde(default)]
    pub max_hp: Option<i32>,
    /// Physical armor.
    #[serde(default)]
    pub armor: Option<i32>,
    #[serde(default)]
    pub power: Option<i32>,
    #[serde(default)]
    pub starting_minions: Option<i32>,
    #[serde(default)]
    pub swap_max_cd: Option<i32>,
    #[serde(default)]
    pub swap_sickness: Option<i32>,
    #[serde(default)]
    pub formation: Option<Formation>,
    /// Replaces the stock minion blueprint; its glyph wins over `minion_glyph`.
    #[serde(default)]
    pub minion: Option<UnitTemplate>,
    #[serde(default)]
    pub tactics: Option<Vec<Tactic>>,
    #[serde(default)]
    pub skills: Option<Vec<SkillEntry>>,
}

impl GeneralEntry {
    pub fn to_spec(&self) -> GeneralSpec {
        let mut spec = match self.faction {
            Some(faction) => GeneralSpec {
                name: self.name.clone(),
                ..faction.base(self.minion_glyph)
            },
            None => GeneralSpec::standard(self.name.clone(), self.minion_glyph),
        };
        if let Some(glyph) = self.glyph {
            spec.glyph = glyph;
        }
        if let Some(max_hp) = self.max_hp {
            spec.max_hp = max_hp;
        }
        if let Some(armor) = self.armor {
            spec.armor = Armor::physical(armor);
        }
        if let Some(power) = self.power {
            spec.power = power;
        }
        if let Some(count) = self.starting_minions {
            spec.starting_minions = count;
        }
        if let Some(cooldown) = self.swap_max_cd {
            spec.swap_max_cd = cooldown;
        }
        if let Some(sickness) = self.swap_sickness {
            spec.swap_sickness = sickness;
        }
        if let Some(formation) = self.formation {
            spec.formation = formation;
        }
        if let Some(minion) = &self.minion {
            spec.minion = minion.clone();
        }
        if let Some(tactics) = &self.tactics {
            spec.tactics = tactics.clone();
        }
        if let Some(skills) = &self.skills {
            spec.skills = skills.iter().map(SkillEntry::to_skill).collect();
        }
        spec
    }
}

fn default_cooldown() -> i32 {
    GeneralSpec::SKILL_COOLDOWN
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkillEntry {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Derived from the description when absent.
    #[serde(default)]
    pub category: Option<SkillCategory>,
    pub effect: SkillEffect,
    #[serde(default = "default_cooldown")]
    pub max_cd: i32,
    #[serde(default)]
    pub area: Option<Area>,
}

impl SkillEntry {
    pub fn to_skill(&self) -> Skill {
        let category = self
            .category
            .unwrap_or_else(|| SkillCategory::from_description(&self.description));
        let skill = Skill::new(self.name.clone(), category, self.effect.clone(), self.max_cd)
            .with_description(self.description.clone());
        match &self.area {
            Some(area) => skill.with_area(area.clone()),
            None => skill,
        }
    }
}

/// Loader for general rosters from RON files.
pub struct RosterLoader;

impl RosterLoader {
    /// Load both rosters. A side left empty in the file keeps the stock
    /// general.
    pub fn load(path: &Path) -> LoadResult<[Vec<GeneralSpec>; 2]> {
        let content = read_file(path)?;
        let file = Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse roster RON {}: {}", path.display(), e))?;

        let mut rosters = file.into_rosters();
        for (slot, roster) in rosters.iter_mut().enumerate() {
            if roster.is_empty() {
                let side = skirmish_core::Side::from_index(slot);
                roster.push(skirmish_core::roster::default_general(side));
            }
        }
        Ok(rosters)
    }

    pub fn parse(content: &str) -> LoadResult<RosterFile> {
        Ok(ron::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::GeneralRule;

    #[test]
    fn entries_override_only_what_they_name() {
        let file = RosterLoader::parse(
            r#"#![enable(implicit_some)]
            (
                first: [(name: "Hannibal", minion_glyph: 'h', max_hp: 500, formation: FlyingWedge(increment: 2))],
            )"#,
        )
        .unwrap();
        let [first, second] = file.into_rosters();
        assert!(second.is_empty());

        let spec = &first[0];
        assert_eq!(spec.glyph, 'H');
        assert_eq!(spec.max_hp, 500);
        assert_eq!(spec.power, GeneralSpec::POWER);
        assert_eq!(spec.minion.glyph, 'h');
        assert_eq!(spec.formation, Formation::FlyingWedge { increment: 2 });
        assert_eq!(spec.skills.len(), 5);
    }

    #[test]
    fn skill_category_falls_back_to_description() {
        let file = RosterLoader::parse(
            r#"#![enable(implicit_some)]
            (
                second: [(
                    name: "Scipio",
                    minion_glyph: 'b',
                    skills: [
                        (name: "Volley", description: "Deals damage around a tile", effect: Explosion(power: 20, radius: 2)),
                        (name: "Mend", description: "Restores the troops", category: Buff, effect: Heal(amount: 5), max_cd: 10),
                    ],
                )],
            )"#,
        )
        .unwrap();
        let [_, second] = file.into_rosters();
        let skills = &second[0].skills;
        assert_eq!(skills[0].category, SkillCategory::Damage);
        assert_eq!(skills[0].max_cd, GeneralSpec::SKILL_COOLDOWN);
        assert_eq!(skills[1].category, SkillCategory::Buff);
        assert_eq!(skills[1].max_cd, 10);
    }

    #[test]
    fn factions_keep_their_rules_under_overrides() {
        let file = RosterLoader::parse(
            r#"#![enable(implicit_some)]
            (
                first: [(name: "Life", minion_glyph: 'l', faction: Conway, max_hp: 200)],
                second: [(name: "Emperor", minion_glyph: 'w', faction: Emperor)],
            )"#,
        )
        .unwrap();
        let [first, second] = file.into_rosters();

        let conway = &first[0];
        assert_eq!(conway.name, "Life");
        assert_eq!(conway.glyph, 'C');
        assert_eq!(conway.max_hp, 200);
        assert_eq!(conway.minion.glyph, 'l');
        assert_eq!(conway.rule, GeneralRule::Life);
        assert_eq!(conway.tactics, vec![Tactic::Stop, Tactic::Null]);

        let emperor = &second[0];
        assert_eq!(emperor.starting_minions, 0);
        assert!(matches!(emperor.rule, GeneralRule::Rebirth(_)));
    }
}
