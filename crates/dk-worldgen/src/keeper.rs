//! The player's faction: the keeper, its immigrants and its starting credit.

use std::collections::BTreeMap;

use dk_core::faction::{CountRange, Resource, Tech};
use dk_core::immigration::{Attraction, AttractionTarget, Daylight, ImmigrantSpec, MinionTrait, PopulationBonus};
use dk_core::{FactionId, FactionSpec, ImmigrationPolicy, Structure, Tribe};

use crate::config::WorldOptions;

/// Base immigrant arrival chance per turn.
pub const ARRIVAL_RATE: f64 = 0.011;
/// Arrival chance with fast immigration.
pub const FAST_ARRIVAL_RATE: f64 = 0.1;
/// Population cap before structure bonuses.
pub const BASE_POPULATION_CAP: u32 = 10;
/// Cap increase contributed by pigsties at most.
pub const PIGSTY_MAX_INCREASE: f64 = 4.0;

/// The keeper faction, without settlement or hostility.
pub fn keeper_faction(id: FactionId, options: &WorldOptions) -> FactionSpec {
    let mut spec = FactionSpec::new(id, "keeper", Tribe::Keeper);
    spec.immigration = keeper_immigration(options.fast_immigration);
    spec.credit = keeper_credit(options.starting_resources);
    spec
}

/// Starting resources: mana only, or a large stock of everything.
pub fn keeper_credit(starting_resources: bool) -> BTreeMap<Resource, u32> {
    if starting_resources {
        [
            Resource::Mana,
            Resource::Gold,
            Resource::Wood,
            Resource::Iron,
            Resource::Stone,
            Resource::Minerals,
        ]
        .into_iter()
        .map(|r| (r, 10_000))
        .collect()
    } else {
        BTreeMap::from([(Resource::Mana, 200)])
    }
}

/// Immigration policy of the keeper.
pub fn keeper_immigration(fast: bool) -> ImmigrationPolicy {
    let rate = if fast { FAST_ARRIVAL_RATE } else { ARRIVAL_RATE };
    ImmigrationPolicy::with_immigrants(rate, BASE_POPULATION_CAP, immigrants()).with_bonuses(vec![
        PopulationBonus {
            structure: Structure::Pigsty,
            per_structure: 0.25,
            max_increase: PIGSTY_MAX_INCREASE,
        },
        PopulationBonus {
            structure: Structure::Statue,
            per_structure: 1.0,
            max_increase: 1000.0,
        },
        PopulationBonus {
            structure: Structure::Throne,
            per_structure: 10.0,
            max_increase: 10.0,
        },
    ])
}

fn room(structure: Structure, weight: f64, minimum: f64) -> Attraction {
    Attraction::structure(structure, weight, minimum)
}

fn immigrants() -> Vec<ImmigrantSpec> {
    use dk_core::CreatureKind::*;
    use Structure::*;

    let ranged_weapons = Attraction {
        target: AttractionTarget::RangedWeapons,
        weight: 1.0,
        minimum: 3.0,
        mandatory: true,
    };
    let no_return = vec![MinionTrait::Fighter, MinionTrait::NoReturning];

    vec![
        ImmigrantSpec::new(Goblin, 1.0)
            .with_traits(vec![MinionTrait::Fighter, MinionTrait::NoEquipment])
            .with_attractions(vec![
                room(Workshop, 1.0, 12.0),
                room(Jeweler, 1.0, 9.0),
                room(Forge, 1.0, 9.0),
            ])
            .with_salary(10),
        ImmigrantSpec::new(Orc, 0.7)
            .with_attractions(vec![room(TrainingRoom, 1.0, 12.0)])
            .with_salary(20),
        ImmigrantSpec::new(OrcShaman, 0.1)
            .with_attractions(vec![room(Library, 1.0, 16.0), room(Laboratory, 1.0, 9.0)])
            .with_salary(20),
        ImmigrantSpec::new(Ogre, 0.3)
            .with_attractions(vec![room(TrainingRoom, 3.0, 16.0)])
            .with_salary(40),
        ImmigrantSpec::new(Harpy, 0.3)
            .with_attractions(vec![room(TrainingRoom, 3.0, 16.0), ranged_weapons])
            .with_salary(40),
        ImmigrantSpec::new(SpecialHumanoid, 0.2)
            .with_attractions(vec![room(TrainingRoom, 3.0, 16.0)])
            .with_salary(40)
            .at_dorm()
            .requiring(Tech::HumanoidMutation),
        ImmigrantSpec::new(Zombie, 0.5).with_salary(10).at_dorm(),
        ImmigrantSpec::new(Vampire, 0.2)
            .with_attractions(vec![room(TrainingRoom, 2.0, 12.0)])
            .with_salary(40)
            .at_dorm(),
        ImmigrantSpec::new(LostSoul, 0.3)
            .with_attractions(vec![room(RitualRoom, 1.0, 9.0)])
            .at_dorm(),
        ImmigrantSpec::new(Succubus, 0.3)
            .with_traits(vec![MinionTrait::Fighter, MinionTrait::NoEquipment])
            .with_attractions(vec![room(RitualRoom, 2.0, 12.0)])
            .at_dorm(),
        ImmigrantSpec::new(Doppelganger, 0.2)
            .with_attractions(vec![room(RitualRoom, 4.0, 12.0)])
            .at_dorm(),
        ImmigrantSpec::new(Raven, 1.0)
            .with_traits(no_return.clone())
            .during(Daylight::Day),
        ImmigrantSpec::new(Bat, 1.0)
            .with_traits(no_return.clone())
            .during(Daylight::Night),
        ImmigrantSpec::new(Wolf, 0.15)
            .with_traits(no_return)
            .in_packs(CountRange::new(3, 9)),
        ImmigrantSpec::new(CaveBear, 0.1),
        ImmigrantSpec::new(Werewolf, 0.1).with_attractions(vec![room(TrainingRoom, 4.0, 12.0)]),
        ImmigrantSpec::new(SpecialMonsterKeeper, 0.1)
            .at_dorm()
            .requiring(Tech::BeastMutation),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use dk_core::CreatureKind;

    #[test]
    fn fast_immigration_raises_arrival_rate() {
        assert_eq!(keeper_immigration(false).arrival_rate, ARRIVAL_RATE);
        assert_eq!(keeper_immigration(true).arrival_rate, FAST_ARRIVAL_RATE);
    }

    #[test]
    fn population_cap_grows_with_structures() {
        let policy = keeper_immigration(false);
        let built = BTreeMap::from([
            (Structure::Pigsty, 8),
            (Structure::Statue, 3),
            (Structure::Throne, 1),
        ]);
        // 10 + min(2, 4) + min(3, 1000) + min(10, 10)
        assert_eq!(policy.population_cap_with(&built), 25);
    }

    #[test]
    fn immigrant_table() {
        let table = keeper_immigration(false).immigrants;
        assert_eq!(table.len(), 17);
        let harpy = table.iter().find(|i| i.kind == CreatureKind::Harpy).unwrap();
        assert!(harpy.attractions.iter().any(|a| a.mandatory));
        let wolf = table.iter().find(|i| i.kind == CreatureKind::Wolf).unwrap();
        assert_eq!(wolf.group_size, Some(CountRange::new(3, 9)));
        assert!(wolf.auto_team);
        assert!(wolf.traits.contains(&MinionTrait::NoReturning));
    }

    #[test]
    fn credit_depends_on_option() {
        assert_eq!(keeper_credit(false), BTreeMap::from([(Resource::Mana, 200)]));
        let rich = keeper_credit(true);
        assert_eq!(rich.len(), 6);
        assert!(rich.values().all(|&v| v == 10_000));
    }

    #[test]
    fn keeper_faction_is_closed_to_hostility() {
        let spec = keeper_faction(FactionId(9), &WorldOptions::default());
        assert_eq!(spec.tribe, Tribe::Keeper);
        assert!(spec.hostility.is_none());
        assert!(spec.settlement.is_none());
        assert!(spec.immigration.is_open());
    }
}
