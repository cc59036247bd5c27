//! The generation pipeline: roll the catalog, lay out areas, land the
//! keeper, populate every settlement, and retry the whole world when a step
//! reports a generation-level failure.

use dk_core::faction::ExtraArea;
use dk_core::link::LinkKeyAllocator;
use dk_core::{
    Actor, ActorId, AreaId, CreatureKind, CreatureMix, FactionId, FactionSpec, LinkDirection,
    LinkKey, Location, Position, Tribe, WorldId,
};
use dk_simulation::{FactionControl, Orchestrator, SimError, TriggerControl};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, extra_area_archetype};
use crate::config::{GenConfig, WorldOptions};
use crate::error::{GenError, GenResult};
use crate::keeper::keeper_faction;
use crate::layout::{AreaBuilder, AreaRequest, RectPackingBuilder, TerritoryRequest};
use crate::names::{self, TownNames};

/// Label of the top-level area.
pub const TOP_LEVEL_LABEL: &str = "Top level";

/// A fully assembled world.
#[derive(Debug)]
pub struct GeneratedWorld {
    /// The simulation model, ready to step.
    pub model: Orchestrator,
    /// Identifier of this world.
    pub world_id: WorldId,
    /// Save-game identifier.
    pub game_id: String,
    /// Title of the game.
    pub display_name: String,
    /// Name of the keeper.
    pub keeper_name: String,
    /// The player faction.
    pub player: FactionId,
    /// The top-level area.
    pub top_level: AreaId,
    /// Attempts it took, counting the successful one.
    pub attempts: u32,
}

/// A secondary area waiting to be built below its parent settlement.
#[derive(Debug)]
struct PendingExtra {
    extra: ExtraArea,
    key: LinkKey,
    spec: FactionSpec,
}

/// Builds worlds from a catalog with an area builder.
#[derive(Debug)]
pub struct WorldGenerator {
    config: GenConfig,
    catalog: Catalog,
    builder: Box<dyn AreaBuilder>,
}

impl Default for WorldGenerator {
    fn default() -> Self {
        Self::new(GenConfig::default())
    }
}

impl WorldGenerator {
    /// A generator using the standard catalog and a rectangle-packing builder.
    pub fn new(config: GenConfig) -> Self {
        let builder = RectPackingBuilder::new().with_tries(config.placement_tries);
        Self {
            config,
            catalog: Catalog::standard(),
            builder: Box::new(builder),
        }
    }

    /// Use another area builder.
    pub fn with_builder(mut self, builder: impl AreaBuilder + 'static) -> Self {
        self.builder = Box::new(builder);
        self
    }

    /// Use another catalog.
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Generator configuration.
    pub fn config(&self) -> &GenConfig {
        &self.config
    }

    /// The catalog rolled for each world.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Generate a world from `seed`.
    ///
    /// A single generator seeded with `seed` feeds every attempt, so the
    /// result, including how many attempts it took, depends only on the seed,
    /// the options and the configuration. Retryable failures discard the
    /// partial world and start over; anything else is returned at once.
    pub fn generate(&mut self, seed: u64, options: &WorldOptions) -> GenResult<GeneratedWorld> {
        self.config.validate()?;
        let mut rng = StdRng::seed_from_u64(seed);
        let mut last = None;

        for attempt in 1..=self.config.max_attempts {
            match self.attempt(&mut rng, options) {
                Ok(mut world) => {
                    world.attempts = attempt;
                    info!(
                        seed,
                        attempt,
                        world = %world.world_id,
                        factions = world.model.roster().len(),
                        actors = world.model.actors().count(),
                        "world generated"
                    );
                    return Ok(world);
                }
                Err(err) if err.is_retryable() => {
                    warn!(seed, attempt, error = %err, "world generation attempt failed, retrying");
                    last = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        Err(GenError::RetriesExhausted {
            attempts: self.config.max_attempts,
            last: Box::new(last.unwrap_or_else(|| GenError::Config("no attempt was made".into()))),
        })
    }

    fn attempt(&mut self, rng: &mut StdRng, options: &WorldOptions) -> GenResult<GeneratedWorld> {
        let mut sim = Orchestrator::new(self.config.sim.clone());
        let mut keys = LinkKeyAllocator::new();
        let mut towns = TownNames::new(rng);

        // Enemy ids come first, the player's right after.
        let mut specs = self
            .catalog
            .roll(rng, &mut keys, &mut towns, || sim.allocate_faction_id())?;
        let player = sim.allocate_faction_id();

        let mut extras = Vec::new();
        for spec in &specs {
            let (Some(extra), Some(settlement)) = (spec.extra_area, spec.settlement.as_ref()) else {
                continue;
            };
            let Some(&key) = settlement.down_links.first() else {
                return Err(GenError::Constraint(format!(
                    "{} requests {} without a passage key",
                    spec.name(),
                    extra.label()
                )));
            };
            let mut below = extra_area_archetype(extra).roll(sim.allocate_faction_id(), rng, &mut keys, &mut towns);
            if let Some(s) = below.settlement.as_mut() {
                s.up_links.push(key);
            }
            extras.push(PendingExtra {
                extra,
                key,
                spec: below,
            });
        }

        for spec in specs.iter_mut().chain(extras.iter_mut().map(|p| &mut p.spec)) {
            spec.bind_player(player);
        }

        let top_level = self.build_top_level(&mut sim, &specs, rng)?;
        let mut placed: Vec<(FactionSpec, AreaId)> = specs.into_iter().map(|s| (s, top_level)).collect();
        for pending in extras {
            let area = self.build_extra(&mut sim, &pending, rng)?;
            sim.connect(LinkDirection::Down, pending.key, top_level, area)?;
            placed.push((pending.spec, area));
        }

        // Player faction.
        let keeper_name = names::keeper_name(options.keeper_name.as_deref(), rng);
        sim.add_faction(keeper_faction(player, options), None)?;
        let keeper = Actor::new(sim.allocate_actor_id(), CreatureKind::Keeper, player)
            .with_name(keeper_name.clone());
        let keeper = sim.land_actor(keeper, top_level, LinkKey::SPAWN)?;
        sim.set_player(player, keeper)?;
        for _ in 0..self.config.support_actors {
            let imp = Actor::new(sim.allocate_actor_id(), CreatureKind::Imp, player);
            sim.land_actor(imp, top_level, LinkKey::SPAWN)?;
        }
        let world_id = WorldId::from_random_bytes(rng.random());
        let game_id = names::game_id(&keeper_name, &options.world_name, rng);
        let display_name = names::display_name(&keeper_name, &options.world_name);

        for (spec, area) in placed {
            settle(&mut sim, spec, area, rng)?;
        }

        if self.config.wildlife {
            scatter_wildlife(&mut sim, top_level, self.config.wildlife_count, rng)?;
        }

        Ok(GeneratedWorld {
            model: sim,
            world_id,
            game_id,
            display_name,
            keeper_name,
            player,
            top_level,
            attempts: 0,
        })
    }

    fn build_top_level(
        &mut self,
        sim: &mut Orchestrator,
        specs: &[FactionSpec],
        rng: &mut StdRng,
    ) -> GenResult<AreaId> {
        let mut request = AreaRequest::new(
            sim.next_area_id(),
            TOP_LEVEL_LABEL,
            self.config.top_width,
            self.config.top_height,
        )
        .with_spawn_point(LinkKey::SPAWN);
        request.territories = specs.iter().filter_map(TerritoryRequest::for_faction).collect();

        let area = self.builder.build(&request, rng)?;
        Ok(sim.add_area(area)?)
    }

    fn build_extra(
        &mut self,
        sim: &mut Orchestrator,
        pending: &PendingExtra,
        rng: &mut StdRng,
    ) -> GenResult<AreaId> {
        let (width, height) = match pending.extra {
            ExtraArea::Crypt => (self.config.crypt_width, self.config.crypt_height),
            ExtraArea::GnomishMines => (self.config.mines_width, self.config.mines_height),
        };
        let mut request = AreaRequest::new(sim.next_area_id(), pending.extra.label(), width, height);
        request.territories = TerritoryRequest::for_faction(&pending.spec).into_iter().collect();

        let area = self.builder.build(&request, rng)?;
        let id = sim.add_area(area)?;
        debug!(area = %id, label = pending.extra.label(), key = %pending.key, "extra area built");
        Ok(id)
    }
}

/// Generate a world with the default configuration.
pub fn generate_world(seed: u64, options: &WorldOptions) -> GenResult<GeneratedWorld> {
    WorldGenerator::default().generate(seed, options)
}

/// Register `spec` and spawn its inhabitants into its territory. Factions
/// without inhabitants are skipped.
fn settle(sim: &mut Orchestrator, spec: FactionSpec, area_id: AreaId, rng: &mut StdRng) -> GenResult<()> {
    let Some(settlement) = spec.settlement.as_ref() else {
        return Ok(());
    };
    if settlement.has_no_inhabitants() {
        debug!(faction = %spec.id, name = spec.name(), "faction has no inhabitants, skipped");
        return Ok(());
    }

    let area = sim.area(area_id).ok_or(SimError::AreaNotFound(area_id))?;
    let territory = area.territory_of(spec.id).ok_or_else(|| {
        GenError::Constraint(format!("{} received no territory in {}", spec.name(), area.label()))
    })?;
    let count = settlement.count as usize;
    let free = area.free_cells_in(territory.bounds);
    if free.len() < count {
        return Err(GenError::Constraint(format!(
            "{} needs {count} cells but its territory has {}",
            spec.name(),
            free.len()
        )));
    }
    let cells: Vec<Position> = free.choose_multiple(rng, count).copied().collect();
    let kinds = draw_creatures(&settlement.creatures, count, rng)?;

    let faction = spec.id;
    let name = spec.name().to_string();
    let control = spec
        .hostility
        .clone()
        .map(|profile| Box::new(TriggerControl::new(faction, profile)) as Box<dyn FactionControl>);
    sim.add_faction(spec, control)?;

    let mut members: Vec<ActorId> = Vec::with_capacity(count);
    for (kind, position) in kinds.into_iter().zip(cells) {
        members.push(sim.spawn_actor(kind, faction, Location { area: area_id, position })?);
    }
    if let Some(&leader) = members.first() {
        sim.set_faction_leader(faction, leader)?;
    }
    debug!(faction = %faction, %name, area = %area_id, members = members.len(), "faction settled");
    Ok(())
}

/// `count` creature kinds: the mix's leader first, then weighted draws.
fn draw_creatures(mix: &CreatureMix, count: usize, rng: &mut StdRng) -> GenResult<Vec<CreatureKind>> {
    let mut kinds = Vec::with_capacity(count);
    kinds.extend(mix.leader);
    while kinds.len() < count {
        let kind = match mix.entries.choose_weighted(rng, |e| e.weight) {
            Ok(entry) => entry.kind,
            Err(err) => match mix.leader {
                Some(leader) => leader,
                None => return Err(GenError::Config(format!("creature mix cannot be drawn from: {err}"))),
            },
        };
        kinds.push(kind);
    }
    kinds.truncate(count);
    Ok(kinds)
}

fn scatter_wildlife(sim: &mut Orchestrator, area_id: AreaId, count: u32, rng: &mut StdRng) -> GenResult<()> {
    let faction = sim.allocate_faction_id();
    sim.add_faction(FactionSpec::new(faction, "wildlife", Tribe::Wildlife), None)?;

    let area = sim.area(area_id).ok_or(SimError::AreaNotFound(area_id))?;
    let wilderness: Vec<Position> = area
        .bounds()
        .cells()
        .filter(|&p| area.is_free(p) && !area.territories().iter().any(|t| t.bounds.contains(p)))
        .collect();
    let cells: Vec<Position> = wilderness.choose_multiple(rng, count as usize).copied().collect();
    let kinds = draw_creatures(&CreatureMix::forest(), cells.len(), rng)?;

    for (kind, position) in kinds.into_iter().zip(cells) {
        sim.spawn_actor(kind, faction, Location { area: area_id, position })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dk_core::faction::{BuildingStyle, CountRange, SettlementKind};
    use dk_core::{Behaviour, HostilityProfile, SettlementSpec, Trigger};
    use dk_simulation::ControlState;

    use crate::catalog::{Archetype, CatalogEntry};

    fn small_config() -> GenConfig {
        GenConfig::default().with_top_size(80, 80).with_wildlife(false)
    }

    fn tiny_catalog() -> Catalog {
        let village = Archetype::new(
            "village",
            Tribe::Human,
            SettlementSpec::new(
                SettlementKind::Village,
                CreatureMix::human_village().led_by(CreatureKind::Knight),
                0,
                BuildingStyle::Wood,
            ),
            CountRange::new(4, 6),
        )
        .named()
        .with_hostility(HostilityProfile::against_player(
            vec![Trigger::stolen_items()],
            Behaviour::KillLeader,
        ));
        Catalog::new(vec![CatalogEntry::once(village)])
    }

    #[test]
    fn draw_creatures_puts_leader_first() {
        let mut rng = StdRng::seed_from_u64(0);
        let kinds = draw_creatures(&CreatureMix::dwarf_town(), 5, &mut rng).unwrap();
        assert_eq!(kinds.len(), 5);
        assert_eq!(kinds[0], CreatureKind::DwarfBaron);
        assert!(kinds[1..].iter().all(|&k| k == CreatureKind::Dwarf));
    }

    #[test]
    fn draw_creatures_falls_back_to_leader() {
        let mut rng = StdRng::seed_from_u64(0);
        let mix = CreatureMix::weighted(&[]).led_by(CreatureKind::Witch);
        assert_eq!(draw_creatures(&mix, 2, &mut rng).unwrap(), vec![CreatureKind::Witch; 2]);
        assert!(draw_creatures(&CreatureMix::weighted(&[]), 1, &mut rng).is_err());
    }

    #[test]
    fn player_is_bound_and_landed() {
        let mut generator = WorldGenerator::new(small_config()).with_catalog(tiny_catalog());
        let world = generator.generate(5, &WorldOptions::named("Gloomhold")).unwrap();
        let sim = &world.model;

        // One enemy faction, so the player is the second id.
        assert_eq!(world.player, FactionId(1));
        let player = sim.roster().player().unwrap();
        assert_eq!(player.faction, world.player);
        assert_eq!(sim.actor(player.leader).unwrap().kind, CreatureKind::Keeper);
        assert_eq!(sim.actor(player.leader).unwrap().name, world.keeper_name);
        assert_eq!(sim.population(world.player), 5);

        let village = sim.roster().spec(FactionId(0)).unwrap();
        assert_eq!(
            village.hostility.as_ref().unwrap().target_faction(),
            Some(world.player)
        );
        let control = sim.control::<TriggerControl>(FactionId(0)).unwrap();
        assert_eq!(control.state(), &ControlState::Dormant);
        assert!(world.display_name.ends_with(" of Gloomhold"));
    }

    #[test]
    fn settlement_members_stay_in_their_territory() {
        let mut generator = WorldGenerator::new(small_config()).with_catalog(tiny_catalog());
        let world = generator.generate(9, &WorldOptions::default()).unwrap();
        let sim = &world.model;
        let top = sim.area(world.top_level).unwrap();
        let bounds = top.territory_of(FactionId(0)).unwrap().bounds;

        let members: Vec<&Actor> = sim.actors().filter(|a| a.faction == FactionId(0)).collect();
        assert!((4..=6).contains(&members.len()));
        for member in &members {
            assert!(bounds.contains(member.location.unwrap().position));
        }
        let leader = sim.roster().leader(FactionId(0)).unwrap();
        assert_eq!(sim.actor(leader).unwrap().kind, CreatureKind::Knight);
    }

    #[test]
    fn wildlife_roams_outside_territories() {
        let config = small_config().with_wildlife(true);
        let mut generator = WorldGenerator::new(config).with_catalog(tiny_catalog());
        let world = generator.generate(2, &WorldOptions::default()).unwrap();
        let sim = &world.model;
        let wildlife = sim
            .roster()
            .specs()
            .find(|s| s.tribe == Tribe::Wildlife)
            .unwrap()
            .id;
        let top = sim.area(world.top_level).unwrap();
        let animals: Vec<&Actor> = sim.actors().filter(|a| a.faction == wildlife).collect();
        assert_eq!(animals.len(), 24);
        for animal in animals {
            let pos = animal.location.unwrap().position;
            assert!(top.territories().iter().all(|t| !t.bounds.contains(pos)));
        }
    }
}
