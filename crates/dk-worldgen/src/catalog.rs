//! The archetype catalog: static declarations of every enemy faction a world
//! can contain, and the weighted rolls that turn it into faction specs.

use serde::{Deserialize, Serialize};

use dk_core::faction::{
    BuildingStyle, CountRange, ExtraArea, Furniture, LootTable, Resource, SettlementKind, Tech,
};
use dk_core::hostility::{AttackMessage, WelcomeMessage};
use dk_core::immigration::ImmigrantSpec;
use dk_core::link::LinkKeyAllocator;
use dk_core::{
    Behaviour, CreatureKind, CreatureMix, FactionId, FactionSpec, HostilityProfile,
    ImmigrationPolicy, SettlementSpec, Structure, Trigger, Tribe,
};
use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;

use crate::error::{GenError, GenResult};
use crate::names::TownNames;

/// Static declaration of one kind of faction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Archetype {
    /// Catalog name, copied onto rolled specs.
    pub name: String,
    /// Tribe of every faction rolled from this archetype.
    pub tribe: Tribe,
    /// Settlement template; its `count` is replaced by the rolled population.
    pub settlement: SettlementSpec,
    /// Inhabitant count range.
    pub population: CountRange,
    /// Immigration policy, copied verbatim.
    pub immigration: ImmigrationPolicy,
    /// Hostility template, copied verbatim and bound to the player later.
    pub hostility: Option<HostilityProfile>,
    /// Secondary area reached through a fresh descending passage.
    pub extra_area: Option<ExtraArea>,
    /// Draws a town name for each rolled settlement.
    pub named: bool,
}

impl Archetype {
    /// A closed, peaceful archetype.
    pub fn new(
        name: impl Into<String>,
        tribe: Tribe,
        settlement: SettlementSpec,
        population: CountRange,
    ) -> Self {
        Self {
            name: name.into(),
            tribe,
            settlement,
            population,
            immigration: ImmigrationPolicy::none(),
            hostility: None,
            extra_area: None,
            named: false,
        }
    }

    /// Set the immigration policy.
    pub fn with_immigration(mut self, immigration: ImmigrationPolicy) -> Self {
        self.immigration = immigration;
        self
    }

    /// Set the hostility template.
    pub fn with_hostility(mut self, hostility: HostilityProfile) -> Self {
        self.hostility = Some(hostility);
        self
    }

    /// Request a secondary area below the settlement.
    pub fn with_extra_area(mut self, extra: ExtraArea) -> Self {
        self.extra_area = Some(extra);
        self
    }

    /// Give rolled settlements a town name.
    pub fn named(mut self) -> Self {
        self.named = true;
        self
    }

    /// Roll one faction spec from this archetype.
    ///
    /// Draws the population from the declared range, a town name when the
    /// archetype is named, and a fresh descending key when it has an extra
    /// area. Hostility stays aimed at the unbound player faction.
    pub fn roll(
        &self,
        id: FactionId,
        rng: &mut StdRng,
        keys: &mut LinkKeyAllocator,
        names: &mut TownNames,
    ) -> FactionSpec {
        let mut settlement = self.settlement.clone();
        settlement.count = rng.random_range(self.population.min..=self.population.max);
        if self.named {
            settlement.location_name = Some(names.next_name());
        }
        if self.extra_area.is_some() {
            settlement.down_links.push(keys.fresh());
        }

        let mut spec = FactionSpec::new(id, self.name.clone(), self.tribe);
        spec.settlement = Some(settlement);
        spec.immigration = self.immigration.clone();
        spec.hostility = self.hostility.clone();
        spec.extra_area = self.extra_area;
        spec.main_villain = settlement_has_place_name(&spec);
        spec
    }
}

// Every settlement with a place name must fall before the keeper wins.
fn settlement_has_place_name(spec: &FactionSpec) -> bool {
    spec.settlement
        .as_ref()
        .is_some_and(|s| s.location_name.is_some())
}

/// One weighted alternative of a [`CatalogEntry::OneOf`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedArchetype {
    /// The alternative.
    pub archetype: Archetype,
    /// Relative weight.
    pub weight: f64,
}

/// A line of the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogEntry {
    /// The archetype, rolled a random number of times.
    Fixed {
        /// Archetype rolled.
        archetype: Archetype,
        /// How many factions to roll.
        count: CountRange,
    },
    /// A weighted choice among archetypes, made anew for every faction.
    OneOf {
        /// Label of the group.
        name: String,
        /// How many factions to roll.
        count: CountRange,
        /// Alternatives.
        choices: Vec<WeightedArchetype>,
    },
}

impl CatalogEntry {
    /// A single faction of `archetype`.
    pub fn once(archetype: Archetype) -> Self {
        Self::Fixed {
            archetype,
            count: CountRange::exactly(1),
        }
    }

    /// Between `min` and `max` factions of `archetype`.
    pub fn repeated(archetype: Archetype, min: u32, max: u32) -> Self {
        Self::Fixed {
            archetype,
            count: CountRange::new(min, max),
        }
    }

    /// Label shown in listings.
    pub fn name(&self) -> &str {
        match self {
            Self::Fixed { archetype, .. } => &archetype.name,
            Self::OneOf { name, .. } => name,
        }
    }

    /// Range of factions rolled.
    pub fn count(&self) -> CountRange {
        match self {
            Self::Fixed { count, .. } | Self::OneOf { count, .. } => *count,
        }
    }

    /// Archetypes this entry can produce.
    pub fn archetypes(&self) -> Vec<&Archetype> {
        match self {
            Self::Fixed { archetype, .. } => vec![archetype],
            Self::OneOf { choices, .. } => choices.iter().map(|c| &c.archetype).collect(),
        }
    }
}

/// Ordered list of catalog entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl Catalog {
    /// A catalog of the given entries, rolled in order.
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// Entries in roll order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Roll every entry in order, asking `next_id` for each faction's id.
    pub fn roll(
        &self,
        rng: &mut StdRng,
        keys: &mut LinkKeyAllocator,
        names: &mut TownNames,
        mut next_id: impl FnMut() -> FactionId,
    ) -> GenResult<Vec<FactionSpec>> {
        let mut specs = Vec::new();
        for entry in &self.entries {
            let count = entry.count();
            let times = rng.random_range(count.min..=count.max);
            for _ in 0..times {
                let archetype = match entry {
                    CatalogEntry::Fixed { archetype, .. } => archetype,
                    CatalogEntry::OneOf { name, choices, .. } => {
                        &choices
                            .choose_weighted(rng, |c| c.weight)
                            .map_err(|e| GenError::Config(format!("catalog entry {name}: {e}")))?
                            .archetype
                    }
                };
                specs.push(archetype.roll(next_id(), rng, keys, names));
            }
        }
        Ok(specs)
    }

    /// The standard enemy roster.
    pub fn standard() -> Self {
        Self::new(vec![
            CatalogEntry::repeated(cottage(), 6, 12),
            CatalogEntry::once(small_minetown().with_extra_area(ExtraArea::GnomishMines)),
            CatalogEntry::repeated(small_minetown(), 1, 4),
            CatalogEntry::once(island_vault()),
            CatalogEntry::once(dragon_cave("green_dragon_cave", CreatureKind::GreenDragon, 22, 7)),
            CatalogEntry::once(dragon_cave("red_dragon_cave", CreatureKind::RedDragon, 30, 12)),
            CatalogEntry::once(cyclops_cave()),
            CatalogEntry::once(vault(
                "insect_vault",
                Tribe::Monster,
                CreatureMix::insects(),
                CountRange::new(6, 12),
                None,
            )),
            CatalogEntry::once(vault(
                "cyclops_vault",
                Tribe::Monster,
                CreatureMix::single(CreatureKind::Cyclops),
                CountRange::exactly(1),
                Some(LootTable::Mushrooms),
            )),
            CatalogEntry::once(vault(
                "rat_vault",
                Tribe::Pest,
                CreatureMix::single(CreatureKind::Rat),
                CountRange::new(3, 8),
                Some(LootTable::Armory),
            )),
            CatalogEntry::OneOf {
                name: "friendly_vault".into(),
                count: CountRange::new(1, 3),
                choices: [
                    (CreatureKind::SpecialHumanoid, 1, 2),
                    (CreatureKind::Orc, 3, 8),
                    (CreatureKind::Ogre, 2, 5),
                    (CreatureKind::Vampire, 2, 5),
                ]
                .into_iter()
                .map(|(kind, min, max)| WeightedArchetype {
                    archetype: vault(
                        &format!("{kind}_vault"),
                        Tribe::Keeper,
                        CreatureMix::single(kind),
                        CountRange::new(min, max),
                        None,
                    ),
                    weight: 1.0,
                })
                .collect(),
            },
            CatalogEntry::once(elementalist()),
            CatalogEntry::once(viking_castle()),
            CatalogEntry::once(lizard_village()),
            CatalogEntry::once(elven_village()),
            CatalogEntry::once(dwarven_minetown()),
            CatalogEntry::once(human_castle()),
            CatalogEntry::once(witch_house()),
            CatalogEntry::once(cemetery()),
            CatalogEntry::once(bandit_cave()),
        ])
    }
}

/// Archetype of the faction living in a secondary area.
pub fn extra_area_archetype(extra: ExtraArea) -> Archetype {
    match extra {
        ExtraArea::GnomishMines => Archetype::new(
            "gnomish_mines",
            Tribe::Dwarven,
            SettlementSpec::new(
                SettlementKind::Minetown,
                CreatureMix::gnome_village(),
                0,
                BuildingStyle::Dungeon,
            )
            .with_stockpile(Resource::Gold, 1000)
            .with_stockpile(Resource::Minerals, 600)
            .with_shop(LootTable::DwarfShop)
            .with_furniture(Furniture::Rooms),
            CountRange::new(9, 14),
        ),
        ExtraArea::Crypt => Archetype::new(
            "crypt",
            Tribe::Monster,
            SettlementSpec::new(
                SettlementKind::Cemetery,
                CreatureMix::single(CreatureKind::Zombie),
                0,
                BuildingStyle::Dungeon,
            )
            .with_furniture(Furniture::CryptCoffins),
            CountRange::new(6, 10),
        ),
    }
}

fn cottage() -> Archetype {
    Archetype::new(
        "cottage",
        Tribe::Human,
        SettlementSpec::new(
            SettlementKind::Cottage,
            CreatureMix::human_village(),
            0,
            BuildingStyle::Wood,
        )
        .with_furniture(Furniture::Rooms),
        CountRange::new(3, 7),
    )
}

fn small_minetown() -> Archetype {
    Archetype::new(
        "small_minetown",
        Tribe::Dwarven,
        SettlementSpec::new(
            SettlementKind::SmallMinetown,
            CreatureMix::gnome_village(),
            0,
            BuildingStyle::Dungeon,
        )
        .with_stockpile(Resource::Minerals, 300)
        .with_furniture(Furniture::Rooms)
        .hidden(),
        CountRange::new(3, 7),
    )
}

fn island_vault() -> Archetype {
    Archetype::new(
        "island_vault",
        Tribe::Monster,
        SettlementSpec::new(
            SettlementKind::IslandVault,
            CreatureMix::weighted(&[]),
            0,
            BuildingStyle::Dungeon,
        )
        .with_stockpile(Resource::Gold, 800)
        .hidden(),
        CountRange::exactly(0),
    )
}

fn dragon_cave(name: &str, dragon: CreatureKind, population: u32, kills: u32) -> Archetype {
    Archetype::new(
        name,
        Tribe::KillEveryone,
        SettlementSpec::new(
            SettlementKind::Cave,
            CreatureMix::single(dragon),
            0,
            BuildingStyle::Dungeon,
        )
        .with_shop(LootTable::DragonHoard),
        CountRange::exactly(1),
    )
    .with_hostility(
        HostilityProfile::against_player(
            vec![Trigger::enemy_population(population), Trigger::stolen_items()],
            Behaviour::KillMembers { count: kills },
        )
        .with_team(0, 1)
        .leader_attacks()
        .with_welcome(WelcomeMessage::DragonWelcome)
        .with_attack_message(AttackMessage::CreatureTitle),
    )
}

fn cyclops_cave() -> Archetype {
    Archetype::new(
        "cyclops_cave",
        Tribe::KillEveryone,
        SettlementSpec::new(
            SettlementKind::Cave,
            CreatureMix::single(CreatureKind::Cyclops),
            0,
            BuildingStyle::Dungeon,
        )
        .with_shop(LootTable::Mushrooms),
        CountRange::exactly(1),
    )
    .with_hostility(
        HostilityProfile::against_player(
            vec![Trigger::enemy_population(14)],
            Behaviour::KillMembers { count: 4 },
        )
        .with_team(0, 1)
        .leader_attacks()
        .with_attack_message(AttackMessage::CreatureTitle),
    )
}

fn vault(
    name: &str,
    tribe: Tribe,
    creatures: CreatureMix,
    population: CountRange,
    shop: Option<LootTable>,
) -> Archetype {
    let mut settlement =
        SettlementSpec::new(SettlementKind::Vault, creatures, 0, BuildingStyle::Dungeon);
    settlement.shop = shop;
    Archetype::new(name, tribe, settlement, population)
}

fn elementalist() -> Archetype {
    Archetype::new(
        "elementalist_cottage",
        Tribe::Human,
        SettlementSpec::new(
            SettlementKind::Cottage,
            CreatureMix::single(CreatureKind::Elementalist),
            0,
            BuildingStyle::Wood,
        )
        .with_furniture(Furniture::Rooms)
        .hidden(),
        CountRange::exactly(1),
    )
    .with_hostility(
        HostilityProfile::against_player(
            vec![Trigger::room_built(Structure::Throne)],
            Behaviour::CampAndSpawn {
                reinforcements: CreatureMix::elementals(),
            },
        )
        .with_team(0, 1)
        .leader_attacks(),
    )
}

/// Immigration of a settlement that recruits a few kinds of fighters.
fn recruiting(rate: f64, cap: u32, kinds: &[CreatureKind]) -> ImmigrationPolicy {
    ImmigrationPolicy::with_immigrants(
        rate,
        cap,
        kinds.iter().map(|&kind| ImmigrantSpec::new(kind, 1.0)).collect(),
    )
}

/// The throne, self-victims and stolen-items trigger set of the big settlements.
fn throne_victims_theft() -> Vec<Trigger> {
    vec![
        Trigger::room_built(Structure::Throne),
        Trigger::self_victims(),
        Trigger::stolen_items(),
    ]
}

fn viking_castle() -> Archetype {
    Archetype::new(
        "viking_castle",
        Tribe::Human,
        SettlementSpec::new(
            SettlementKind::Castle2,
            CreatureMix::viking_town(),
            0,
            BuildingStyle::WoodCastle,
        )
        .with_stockpile(Resource::Gold, 800)
        .with_guard(CreatureKind::Warrior)
        .with_elder_loot(Tech::BeastMutation)
        .with_furniture(Furniture::Rooms),
        CountRange::new(12, 16),
    )
    .named()
    .with_immigration(recruiting(0.003, 16, &[CreatureKind::Warrior]))
    .with_hostility(
        HostilityProfile::against_player(throne_victims_theft(), Behaviour::KillLeader)
            .with_team(6, 5),
    )
}

fn lizard_village() -> Archetype {
    Archetype::new(
        "lizard_village",
        Tribe::Lizard,
        SettlementSpec::new(
            SettlementKind::Village,
            CreatureMix::lizard_town(),
            0,
            BuildingStyle::Mud,
        )
        .with_elder_loot(Tech::HumanoidMutation)
        .with_shop(LootTable::Mushrooms)
        .with_furniture(Furniture::Rooms),
        CountRange::new(8, 14),
    )
    .named()
    .with_immigration(recruiting(0.007, 15, &[CreatureKind::Lizardman]))
    .with_hostility(
        HostilityProfile::against_player(
            vec![Trigger::power(), Trigger::self_victims(), Trigger::stolen_items()],
            Behaviour::KillLeader,
        )
        .with_team(4, 4),
    )
}

fn elven_village() -> Archetype {
    Archetype::new(
        "elven_village",
        Tribe::Elven,
        SettlementSpec::new(
            SettlementKind::Village2,
            CreatureMix::elven_village(),
            0,
            BuildingStyle::Wood,
        )
        .with_stockpile(Resource::Gold, 800)
        .with_elder_loot(Tech::MasterSpells)
        .with_furniture(Furniture::Rooms),
        CountRange::new(11, 18),
    )
    .named()
    .with_immigration(recruiting(0.002, 18, &[CreatureKind::ElfArcher]))
    .with_hostility(
        HostilityProfile::against_player(vec![Trigger::stolen_items()], Behaviour::KillLeader)
            .with_team(4, 4),
    )
}

fn dwarven_minetown() -> Archetype {
    Archetype::new(
        "dwarven_minetown",
        Tribe::Dwarven,
        SettlementSpec::new(
            SettlementKind::Minetown,
            CreatureMix::dwarf_town(),
            0,
            BuildingStyle::Dungeon,
        )
        .with_stockpile(Resource::Gold, 1000)
        .with_stockpile(Resource::Minerals, 600)
        .with_shop(LootTable::DwarfShop)
        .with_furniture(Furniture::Rooms)
        .hidden(),
        CountRange::new(9, 14),
    )
    .named()
    .with_immigration(recruiting(0.002, 15, &[CreatureKind::Dwarf]))
    .with_hostility(
        HostilityProfile::against_player(
            throne_victims_theft(),
            Behaviour::KillMembers { count: 3 },
        )
        .with_team(3, 4),
    )
}

fn human_castle() -> Archetype {
    Archetype::new(
        "human_castle",
        Tribe::Human,
        SettlementSpec::new(
            SettlementKind::Castle,
            CreatureMix::human_castle(),
            0,
            BuildingStyle::Brick,
        )
        .with_stockpile(Resource::Gold, 700)
        .with_guard(CreatureKind::CastleGuard)
        .with_shop(LootTable::VillageShop)
        .with_furniture(Furniture::Castle),
        CountRange::new(20, 26),
    )
    .named()
    .with_immigration(recruiting(
        0.003,
        26,
        &[CreatureKind::Knight, CreatureKind::Archer],
    ))
    .with_hostility(
        HostilityProfile::against_player(throne_victims_theft(), Behaviour::KillLeader)
            .with_team(12, 10),
    )
}

fn witch_house() -> Archetype {
    Archetype::new(
        "witch_house",
        Tribe::Monster,
        SettlementSpec::new(
            SettlementKind::WitchHouse,
            CreatureMix::single(CreatureKind::Witch),
            0,
            BuildingStyle::Wood,
        )
        .with_elder_loot(Tech::AdvancedAlchemy)
        .with_furniture(Furniture::Cauldron),
        CountRange::exactly(1),
    )
}

fn cemetery() -> Archetype {
    Archetype::new(
        "cemetery",
        Tribe::Monster,
        SettlementSpec::new(
            SettlementKind::Cemetery,
            CreatureMix::single(CreatureKind::Zombie),
            0,
            BuildingStyle::Brick,
        )
        .with_location_name("cemetery"),
        CountRange::exactly(1),
    )
    .with_extra_area(ExtraArea::Crypt)
}

fn bandit_cave() -> Archetype {
    Archetype::new(
        "bandit_cave",
        Tribe::Bandit,
        SettlementSpec::new(
            SettlementKind::Cave,
            CreatureMix::single(CreatureKind::Bandit),
            0,
            BuildingStyle::Dungeon,
        ),
        CountRange::new(4, 9),
    )
    .with_immigration(recruiting(0.001, 10, &[CreatureKind::Bandit]))
    .with_hostility(
        HostilityProfile::against_player(vec![Trigger::gold(500)], Behaviour::StealGold)
            .with_team(0, 3),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use dk_core::{HostilityTarget, IdAllocator};
    use rand::SeedableRng;

    fn roll_standard(seed: u64) -> Vec<FactionSpec> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut keys = LinkKeyAllocator::new();
        let mut names = TownNames::new(&mut rng);
        let mut ids = IdAllocator::new();
        Catalog::standard()
            .roll(&mut rng, &mut keys, &mut names, || ids.faction())
            .unwrap()
    }

    fn count_of(specs: &[FactionSpec], archetype: &str) -> usize {
        specs.iter().filter(|s| s.archetype == archetype).count()
    }

    #[test]
    fn standard_roll_respects_declared_ranges() {
        for seed in 0..20 {
            let specs = roll_standard(seed);
            assert!((6..=12).contains(&count_of(&specs, "cottage")));
            assert!((2..=5).contains(&count_of(&specs, "small_minetown")));
            assert_eq!(count_of(&specs, "human_castle"), 1);
            let friendly = specs.iter().filter(|s| s.tribe == Tribe::Keeper).count();
            assert!((1..=3).contains(&friendly));

            for spec in &specs {
                let settlement = spec.settlement.as_ref().unwrap();
                let archetype = Catalog::standard()
                    .entries()
                    .iter()
                    .flat_map(|e| e.archetypes())
                    .find(|a| a.name == spec.archetype)
                    .cloned()
                    .unwrap();
                assert!(archetype.population.contains(settlement.count));
            }
        }
    }

    #[test]
    fn ids_are_handed_out_in_roll_order() {
        let specs = roll_standard(4);
        for (i, spec) in specs.iter().enumerate() {
            assert_eq!(spec.id, FactionId(i as u32));
        }
    }

    #[test]
    fn settlements_with_place_names_are_main_villains() {
        let specs = roll_standard(7);
        let villains: Vec<&str> = specs
            .iter()
            .filter(|s| s.main_villain)
            .map(|s| s.archetype.as_str())
            .collect();
        assert_eq!(
            villains,
            vec![
                "viking_castle",
                "lizard_village",
                "elven_village",
                "dwarven_minetown",
                "human_castle",
                "cemetery"
            ]
        );
        let cemetery = specs.iter().find(|s| s.archetype == "cemetery").unwrap();
        assert_eq!(cemetery.name(), "cemetery");
        assert!(cemetery.main_villain);
        assert!(specs
            .iter()
            .filter(|s| s.archetype == "cottage")
            .all(|s| !s.main_villain));
    }

    #[test]
    fn extra_areas_get_fresh_down_keys() {
        let specs = roll_standard(11);
        let with_extra: Vec<&FactionSpec> =
            specs.iter().filter(|s| s.extra_area.is_some()).collect();
        assert_eq!(with_extra.len(), 2);
        let keys: Vec<_> = with_extra
            .iter()
            .map(|s| s.settlement.as_ref().unwrap().down_links.clone())
            .collect();
        assert_eq!(keys[0].len(), 1);
        assert_eq!(keys[1].len(), 1);
        assert_ne!(keys[0][0], keys[1][0]);
        assert_ne!(keys[0][0], dk_core::LinkKey::SPAWN);
    }

    #[test]
    fn hostility_copied_with_forward_reference() {
        let specs = roll_standard(2);
        let dragon = specs
            .iter()
            .find(|s| s.archetype == "green_dragon_cave")
            .unwrap();
        let hostility = dragon.hostility.as_ref().unwrap();
        assert_eq!(hostility.target, HostilityTarget::PlayerFaction);
        assert_eq!(hostility.triggers[0], Trigger::enemy_population(22));
        assert_eq!(hostility.behaviour, Behaviour::KillMembers { count: 7 });
        assert!(hostility.leader_attacks);
    }

    #[test]
    fn island_vault_has_no_inhabitants() {
        let specs = roll_standard(3);
        let vault = specs.iter().find(|s| s.archetype == "island_vault").unwrap();
        let settlement = vault.settlement.as_ref().unwrap();
        assert!(settlement.has_no_inhabitants());
        assert_eq!(settlement.stock_of(Resource::Gold), 800);
    }

    #[test]
    fn same_seed_same_roll() {
        assert_eq!(roll_standard(42), roll_standard(42));
    }

    #[test]
    fn zero_weight_group_is_a_config_error() {
        let catalog = Catalog::new(vec![CatalogEntry::OneOf {
            name: "broken".into(),
            count: CountRange::exactly(1),
            choices: vec![WeightedArchetype {
                archetype: cottage(),
                weight: 0.0,
            }],
        }]);
        let mut rng = StdRng::seed_from_u64(0);
        let mut names = TownNames::new(&mut rng);
        let mut ids = IdAllocator::new();
        let err = catalog
            .roll(&mut rng, &mut LinkKeyAllocator::new(), &mut names, || ids.faction())
            .unwrap_err();
        assert!(matches!(err, GenError::Config(_)));
    }

    #[test]
    fn extra_area_factions() {
        let mines = extra_area_archetype(ExtraArea::GnomishMines);
        assert_eq!(mines.population, CountRange::new(9, 14));
        assert!(mines.extra_area.is_none());
        let crypt = extra_area_archetype(ExtraArea::Crypt);
        assert_eq!(crypt.settlement.furniture, Some(Furniture::CryptCoffins));
    }
}
