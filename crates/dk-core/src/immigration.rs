//! Immigration policy records: who may join a faction, how often, and how
//! constructed structures raise the population cap.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::actor::CreatureKind;
use crate::faction::{CountRange, Tech};

/// A constructed feature that factions can count or be attracted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum Structure {
    Throne,
    Pigsty,
    Statue,
    Workshop,
    Jeweler,
    Forge,
    TrainingRoom,
    Library,
    Laboratory,
    RitualRoom,
    Dormitory,
}

/// Behavioural flags copied onto immigrants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MinionTrait {
    /// Takes part in fights.
    Fighter,
    /// Never picks up equipment.
    NoEquipment,
    /// Leaves instead of returning home.
    NoReturning,
}

/// Time of day an immigrant is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Daylight {
    /// Arrives only during the day.
    Day,
    /// Arrives only at night.
    Night,
}

/// What an immigrant is drawn to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttractionTarget {
    /// Built structures of this kind.
    Structure(Structure),
    /// Ranged weapons in storage.
    RangedWeapons,
}

/// One attraction: each immigrant claims `weight` units of `target` and
/// needs at least `minimum` units present.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Attraction {
    /// Thing attracting the immigrant.
    pub target: AttractionTarget,
    /// Units claimed per immigrant.
    pub weight: f64,
    /// Units required before the first immigrant comes.
    pub minimum: f64,
    /// Whether the immigrant refuses to come without it.
    pub mandatory: bool,
}

impl Attraction {
    /// Optional attraction toward a structure.
    pub fn structure(structure: Structure, weight: f64, minimum: f64) -> Self {
        Self {
            target: AttractionTarget::Structure(structure),
            weight,
            minimum,
            mandatory: false,
        }
    }

    /// Mark the attraction as a hard requirement.
    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }
}

/// One row of an immigration table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImmigrantSpec {
    /// Creature that arrives.
    pub kind: CreatureKind,
    /// Relative arrival weight.
    pub frequency: f64,
    /// Flags given to the newcomer.
    pub traits: Vec<MinionTrait>,
    /// Structures or items that draw it in.
    pub attractions: Vec<Attraction>,
    /// Upkeep per payday.
    pub salary: u32,
    /// Appears in a dormitory rather than at the territory edge.
    pub spawn_at_dorm: bool,
    /// Arrives as a pack of this size.
    pub group_size: Option<CountRange>,
    /// Pack forms a team automatically.
    pub auto_team: bool,
    /// Restricted to day or night.
    pub daylight: Option<Daylight>,
    /// Technology that must be known first.
    pub requires: Option<Tech>,
}

impl ImmigrantSpec {
    /// A fighter immigrant with no attractions or salary.
    pub fn new(kind: CreatureKind, frequency: f64) -> Self {
        Self {
            kind,
            frequency,
            traits: vec![MinionTrait::Fighter],
            attractions: Vec::new(),
            salary: 0,
            spawn_at_dorm: false,
            group_size: None,
            auto_team: false,
            daylight: None,
            requires: None,
        }
    }

    /// Replace the trait list.
    pub fn with_traits(mut self, traits: Vec<MinionTrait>) -> Self {
        self.traits = traits;
        self
    }

    /// Replace the attraction list.
    pub fn with_attractions(mut self, attractions: Vec<Attraction>) -> Self {
        self.attractions = attractions;
        self
    }

    /// Set the salary.
    pub fn with_salary(mut self, salary: u32) -> Self {
        self.salary = salary;
        self
    }

    /// Spawn in a dormitory.
    pub fn at_dorm(mut self) -> Self {
        self.spawn_at_dorm = true;
        self
    }

    /// Arrive as an auto-teamed pack.
    pub fn in_packs(mut self, size: CountRange) -> Self {
        self.group_size = Some(size);
        self.auto_team = true;
        self
    }

    /// Restrict to a time of day.
    pub fn during(mut self, daylight: Daylight) -> Self {
        self.daylight = Some(daylight);
        self
    }

    /// Require a technology.
    pub fn requiring(mut self, tech: Tech) -> Self {
        self.requires = Some(tech);
        self
    }
}

/// Population cap raised by building structures of one kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PopulationBonus {
    /// Structure that grants the bonus.
    pub structure: Structure,
    /// Cap increase per built structure.
    pub per_structure: f64,
    /// Ceiling on this structure kind's total contribution.
    pub max_increase: f64,
}

/// How a faction gains members over time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImmigrationPolicy {
    /// Chance per turn that an immigrant arrives.
    pub arrival_rate: f64,
    /// Population cap before structure bonuses.
    pub population_cap: u32,
    /// Who may arrive.
    pub immigrants: Vec<ImmigrantSpec>,
    /// Structure-driven cap increases.
    pub bonuses: Vec<PopulationBonus>,
}

impl ImmigrationPolicy {
    /// A closed faction: nobody ever arrives.
    pub fn none() -> Self {
        Self {
            arrival_rate: 0.0,
            population_cap: 0,
            immigrants: Vec::new(),
            bonuses: Vec::new(),
        }
    }

    /// An open faction without structure bonuses.
    pub fn with_immigrants(arrival_rate: f64, population_cap: u32, immigrants: Vec<ImmigrantSpec>) -> Self {
        Self {
            arrival_rate,
            population_cap,
            immigrants,
            bonuses: Vec::new(),
        }
    }

    /// Add structure-driven cap increases.
    pub fn with_bonuses(mut self, bonuses: Vec<PopulationBonus>) -> Self {
        self.bonuses = bonuses;
        self
    }

    /// Returns `true` if anyone can ever arrive.
    pub fn is_open(&self) -> bool {
        self.arrival_rate > 0.0 && !self.immigrants.is_empty()
    }

    /// Effective cap given the structures built so far.
    ///
    /// Each bonus kind contributes `min(count * per_structure, max_increase)`;
    /// contributions of different kinds add up and the sum is floored.
    pub fn population_cap_with(&self, built: &BTreeMap<Structure, u32>) -> u32 {
        let bonus: f64 = self
            .bonuses
            .iter()
            .map(|b| {
                let count = f64::from(built.get(&b.structure).copied().unwrap_or(0));
                (count * b.per_structure).min(b.max_increase)
            })
            .sum();
        self.population_cap
            .saturating_add(bonus.max(0.0).floor() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keeperish() -> ImmigrationPolicy {
        ImmigrationPolicy::with_immigrants(0.011, 10, vec![ImmigrantSpec::new(CreatureKind::Goblin, 1.0)])
            .with_bonuses(vec![
                PopulationBonus {
                    structure: Structure::Pigsty,
                    per_structure: 0.25,
                    max_increase: 4.0,
                },
                PopulationBonus {
                    structure: Structure::Throne,
                    per_structure: 10.0,
                    max_increase: 10.0,
                },
            ])
    }

    #[test]
    fn cap_without_structures_is_base() {
        assert_eq!(keeperish().population_cap_with(&BTreeMap::new()), 10);
    }

    #[test]
    fn bonus_per_kind_is_capped() {
        let mut built = BTreeMap::new();
        built.insert(Structure::Pigsty, 100);
        built.insert(Structure::Throne, 3);
        // pigsty: min(25, 4) = 4, throne: min(30, 10) = 10
        assert_eq!(keeperish().population_cap_with(&built), 24);
    }

    #[test]
    fn fractional_bonus_is_floored_after_summing() {
        let mut built = BTreeMap::new();
        built.insert(Structure::Pigsty, 6);
        // 6 * 0.25 = 1.5 -> 1
        assert_eq!(keeperish().population_cap_with(&built), 11);
    }

    #[test]
    fn closed_policy() {
        let policy = ImmigrationPolicy::none();
        assert!(!policy.is_open());
        assert!(keeperish().is_open());
    }
}
