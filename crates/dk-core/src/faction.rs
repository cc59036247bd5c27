use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::actor::CreatureKind;
use crate::hostility::HostilityProfile;
use crate::id::FactionId;
use crate::immigration::ImmigrationPolicy;
use crate::link::LinkKey;

/// Inclusive integer range used for rolled counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRange {
    /// Smallest value.
    pub min: u32,
    /// Largest value.
    pub max: u32,
}

impl CountRange {
    /// Range `min..=max`. Swaps the bounds if given in the wrong order.
    pub fn new(min: u32, max: u32) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// A range holding exactly one value.
    pub fn exactly(n: u32) -> Self {
        Self { min: n, max: n }
    }

    /// Whether `n` lies in the range.
    pub fn contains(&self, n: u32) -> bool {
        (self.min..=self.max).contains(&n)
    }
}

impl fmt::Display for CountRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == self.max {
            write!(f, "{}", self.min)
        } else {
            write!(f, "{}-{}", self.min, self.max)
        }
    }
}

/// Tribe identity shared by factions that never fight each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum Tribe {
    Keeper,
    Human,
    Dwarven,
    Elven,
    Lizard,
    Monster,
    Pest,
    Bandit,
    Wildlife,
    /// Hostile to everyone, including other monsters.
    KillEveryone,
}

/// Kind of settlement a territory request asks the area builder for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum SettlementKind {
    Cottage,
    SmallMinetown,
    Minetown,
    IslandVault,
    Vault,
    Cave,
    Castle,
    Castle2,
    Village,
    Village2,
    WitchHouse,
    Cemetery,
}

impl SettlementKind {
    /// Rough footprint side length in cells before scaling by population.
    pub fn base_size(self) -> u32 {
        match self {
            Self::Cottage | Self::WitchHouse | Self::Vault | Self::Cave => 6,
            Self::SmallMinetown | Self::Cemetery | Self::IslandVault => 8,
            Self::Village | Self::Village2 | Self::Minetown => 14,
            Self::Castle | Self::Castle2 => 18,
        }
    }
}

/// Building material and style of a settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum BuildingStyle {
    Wood,
    WoodCastle,
    Mud,
    Brick,
    Dungeon,
}

/// Stored resource kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum Resource {
    Mana,
    Gold,
    Wood,
    Iron,
    Stone,
    Minerals,
}

/// A pile of a resource placed in a settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stockpile {
    /// What is stored.
    pub resource: Resource,
    /// How much.
    pub amount: u32,
}

impl Stockpile {
    /// A pile of `amount` units of `resource`.
    pub fn new(resource: Resource, amount: u32) -> Self {
        Self { resource, amount }
    }
}

/// Technologies referenced by loot and immigration requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum Tech {
    BeastMutation,
    HumanoidMutation,
    MasterSpells,
    AdvancedAlchemy,
}

/// Item table a settlement's shop or hoard is stocked from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum LootTable {
    DragonHoard,
    Mushrooms,
    Armory,
    DwarfShop,
    VillageShop,
}

/// Furniture set the area builder decorates rooms with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum Furniture {
    Rooms,
    Castle,
    Cauldron,
    CryptCoffins,
}

/// Secondary area reached from a settlement by a descending passage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtraArea {
    /// Zombie crypt under a cemetery.
    Crypt,
    /// Gnome town under a small minetown.
    GnomishMines,
}

impl ExtraArea {
    /// Label given to the built area.
    pub fn label(self) -> &'static str {
        match self {
            Self::Crypt => "Crypt",
            Self::GnomishMines => "Gnomish mines",
        }
    }
}

/// One weighted entry of a creature mix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MixEntry {
    /// Creature.
    pub kind: CreatureKind,
    /// Relative weight.
    pub weight: f64,
}

/// Weighted composition of a group of creatures, with an optional leader
/// spawned first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatureMix {
    /// Weighted members.
    pub entries: Vec<MixEntry>,
    /// Creature spawned once before the weighted members.
    pub leader: Option<CreatureKind>,
}

impl CreatureMix {
    /// A mix of a single creature kind.
    pub fn single(kind: CreatureKind) -> Self {
        Self::weighted(&[(kind, 1.0)])
    }

    /// A mix built from `(kind, weight)` pairs.
    pub fn weighted(entries: &[(CreatureKind, f64)]) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|&(kind, weight)| MixEntry { kind, weight })
                .collect(),
            leader: None,
        }
    }

    /// Spawn `leader` first.
    pub fn led_by(mut self, leader: CreatureKind) -> Self {
        self.leader = Some(leader);
        self
    }

    /// Returns `true` if nothing can be drawn from the mix.
    pub fn is_empty(&self) -> bool {
        self.leader.is_none() && !self.entries.iter().any(|e| e.weight > 0.0)
    }

    /// Human villagers.
    pub fn human_village() -> Self {
        Self::weighted(&[(CreatureKind::Villager, 3.0), (CreatureKind::Child, 1.0)])
    }

    /// Gnomes under a chief.
    pub fn gnome_village() -> Self {
        Self::single(CreatureKind::Gnome).led_by(CreatureKind::GnomeChief)
    }

    /// Dwarves under a baron.
    pub fn dwarf_town() -> Self {
        Self::single(CreatureKind::Dwarf).led_by(CreatureKind::DwarfBaron)
    }

    /// Elves and archers under a lord.
    pub fn elven_village() -> Self {
        Self::weighted(&[
            (CreatureKind::Elf, 3.0),
            (CreatureKind::ElfArcher, 1.0),
            (CreatureKind::Child, 1.0),
        ])
        .led_by(CreatureKind::ElfLord)
    }

    /// Lizardmen under a lord.
    pub fn lizard_town() -> Self {
        Self::single(CreatureKind::Lizardman).led_by(CreatureKind::LizardLord)
    }

    /// Warriors under a shaman.
    pub fn viking_town() -> Self {
        Self::single(CreatureKind::Warrior).led_by(CreatureKind::Shaman)
    }

    /// Knights, archers and townsfolk under an avatar.
    pub fn human_castle() -> Self {
        Self::weighted(&[
            (CreatureKind::Knight, 2.0),
            (CreatureKind::Archer, 2.0),
            (CreatureKind::Villager, 3.0),
            (CreatureKind::Child, 1.0),
        ])
        .led_by(CreatureKind::Avatar)
    }

    /// Vault insects.
    pub fn insects() -> Self {
        Self::weighted(&[(CreatureKind::Spider, 1.0), (CreatureKind::Scorpion, 1.0)])
    }

    /// Elementals summoned by an elementalist.
    pub fn elementals() -> Self {
        Self::weighted(&[
            (CreatureKind::AirElemental, 1.0),
            (CreatureKind::FireElemental, 1.0),
            (CreatureKind::EarthElemental, 1.0),
            (CreatureKind::WaterElemental, 1.0),
        ])
    }

    /// Forest wildlife.
    pub fn forest() -> Self {
        Self::weighted(&[
            (CreatureKind::Deer, 3.0),
            (CreatureKind::Boar, 2.0),
            (CreatureKind::Fox, 1.0),
        ])
    }
}

/// Territory request and inhabitants of a settlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementSpec {
    /// Settlement layout requested from the area builder.
    pub kind: SettlementKind,
    /// Who lives there.
    pub creatures: CreatureMix,
    /// How many inhabitants to spawn.
    pub count: u32,
    /// Building style.
    pub building: BuildingStyle,
    /// Resources stored there.
    pub stockpiles: Vec<Stockpile>,
    /// Guard posted at the entrance.
    pub guard: Option<CreatureKind>,
    /// Tech dropped by the elder.
    pub elder_loot: Option<Tech>,
    /// Shop or hoard contents.
    pub shop: Option<LootTable>,
    /// Room furniture.
    pub furniture: Option<Furniture>,
    /// Place name; named settlements are shown on the map.
    pub location_name: Option<String>,
    /// Hidden until discovered.
    pub hidden: bool,
    /// Descending passage keys placed inside the settlement.
    pub down_links: Vec<LinkKey>,
    /// Ascending passage keys placed inside the settlement.
    pub up_links: Vec<LinkKey>,
}

impl SettlementSpec {
    /// A settlement of `count` inhabitants drawn from `creatures`.
    pub fn new(kind: SettlementKind, creatures: CreatureMix, count: u32, building: BuildingStyle) -> Self {
        Self {
            kind,
            creatures,
            count,
            building,
            stockpiles: Vec::new(),
            guard: None,
            elder_loot: None,
            shop: None,
            furniture: None,
            location_name: None,
            hidden: false,
            down_links: Vec::new(),
            up_links: Vec::new(),
        }
    }

    /// Store a pile of `resource`.
    pub fn with_stockpile(mut self, resource: Resource, amount: u32) -> Self {
        self.stockpiles.push(Stockpile::new(resource, amount));
        self
    }

    /// Post a guard at the entrance.
    pub fn with_guard(mut self, guard: CreatureKind) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Let the elder drop `tech`.
    pub fn with_elder_loot(mut self, tech: Tech) -> Self {
        self.elder_loot = Some(tech);
        self
    }

    /// Stock the shop or hoard.
    pub fn with_shop(mut self, shop: LootTable) -> Self {
        self.shop = Some(shop);
        self
    }

    /// Furnish the rooms.
    pub fn with_furniture(mut self, furniture: Furniture) -> Self {
        self.furniture = Some(furniture);
        self
    }

    /// Give the place a fixed name.
    pub fn with_location_name(mut self, name: impl Into<String>) -> Self {
        self.location_name = Some(name.into());
        self
    }

    /// Hide the settlement until discovered.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Total stored amount of `resource`.
    pub fn stock_of(&self, resource: Resource) -> u32 {
        self.stockpiles
            .iter()
            .filter(|s| s.resource == resource)
            .map(|s| s.amount)
            .sum()
    }

    /// Returns `true` if the builder would have nobody to place.
    pub fn has_no_inhabitants(&self) -> bool {
        self.count == 0 || self.creatures.is_empty()
    }
}

/// Declarative description of one faction, produced by generation and
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactionSpec {
    /// Roster identity.
    pub id: FactionId,
    /// Catalog archetype the faction was rolled from.
    pub archetype: String,
    /// Tribe identity.
    pub tribe: Tribe,
    /// Territory and inhabitants; `None` for factions without a settlement.
    pub settlement: Option<SettlementSpec>,
    /// Immigration policy.
    pub immigration: ImmigrationPolicy,
    /// Hostility toward the player faction.
    pub hostility: Option<HostilityProfile>,
    /// Secondary area reached from the settlement.
    pub extra_area: Option<ExtraArea>,
    /// Starting resources.
    pub credit: BTreeMap<Resource, u32>,
    /// Counts toward victory when eliminated.
    pub main_villain: bool,
}

impl FactionSpec {
    /// A faction with no settlement, immigration or hostility.
    pub fn new(id: FactionId, archetype: impl Into<String>, tribe: Tribe) -> Self {
        Self {
            id,
            archetype: archetype.into(),
            tribe,
            settlement: None,
            immigration: ImmigrationPolicy::none(),
            hostility: None,
            extra_area: None,
            credit: BTreeMap::new(),
            main_villain: false,
        }
    }

    /// Display name: the place name when there is one, otherwise the archetype.
    pub fn name(&self) -> &str {
        self.settlement
            .as_ref()
            .and_then(|s| s.location_name.as_deref())
            .unwrap_or(&self.archetype)
    }

    /// Number of inhabitants requested at generation.
    pub fn requested_population(&self) -> u32 {
        self.settlement.as_ref().map_or(0, |s| s.count)
    }

    /// Resolve every forward reference to the player faction.
    pub fn bind_player(&mut self, player: FactionId) {
        if let Some(hostility) = &mut self.hostility {
            hostility.bind_player(player);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hostility::{Behaviour, HostilityTarget, Trigger};

    #[test]
    fn count_range_normalizes_bounds() {
        let r = CountRange::new(7, 3);
        assert_eq!(r, CountRange::new(3, 7));
        assert!(r.contains(3) && r.contains(7) && !r.contains(8));
        assert_eq!(r.to_string(), "3-7");
        assert_eq!(CountRange::exactly(1).to_string(), "1");
    }

    #[test]
    fn empty_mix_detection() {
        assert!(CreatureMix::weighted(&[]).is_empty());
        assert!(!CreatureMix::weighted(&[]).led_by(CreatureKind::Witch).is_empty());
        assert!(!CreatureMix::forest().is_empty());
    }

    #[test]
    fn settlement_without_inhabitants() {
        let vault = SettlementSpec::new(
            SettlementKind::IslandVault,
            CreatureMix::weighted(&[]),
            0,
            BuildingStyle::Dungeon,
        );
        assert!(vault.has_no_inhabitants());
    }

    #[test]
    fn settlement_builders() {
        let town = SettlementSpec::new(
            SettlementKind::Minetown,
            CreatureMix::dwarf_town(),
            9,
            BuildingStyle::Dungeon,
        )
        .with_stockpile(Resource::Gold, 1000)
        .with_stockpile(Resource::Minerals, 600)
        .with_stockpile(Resource::Gold, 5)
        .with_shop(LootTable::DwarfShop)
        .hidden();
        assert_eq!(town.stock_of(Resource::Gold), 1005);
        assert_eq!(town.stock_of(Resource::Wood), 0);
        assert_eq!(town.shop, Some(LootTable::DwarfShop));
        assert!(town.hidden);
        assert!(!town.has_no_inhabitants());
    }

    #[test]
    fn name_prefers_location() {
        let mut spec = FactionSpec::new(FactionId(1), "castle", Tribe::Human);
        assert_eq!(spec.name(), "castle");

        let mut settlement = SettlementSpec::new(
            SettlementKind::Castle,
            CreatureMix::human_castle(),
            20,
            BuildingStyle::Brick,
        );
        settlement.location_name = Some("Greywater".into());
        spec.settlement = Some(settlement);
        assert_eq!(spec.name(), "Greywater");
        assert_eq!(spec.requested_population(), 20);
    }

    #[test]
    fn bind_player_reaches_hostility() {
        let mut spec = FactionSpec::new(FactionId(1), "elven_village", Tribe::Elven);
        spec.hostility = Some(HostilityProfile::against_player(
            vec![Trigger::stolen_items()],
            Behaviour::KillLeader,
        ));
        spec.bind_player(FactionId(0));
        assert_eq!(
            spec.hostility.unwrap().target,
            HostilityTarget::Faction(FactionId(0))
        );
    }
}
