pub mod catalog;
pub mod generate;
pub mod simulate;

use std::fs;
use std::path::Path;

use dk_core::{AreaId, Behaviour, FactionSpec};
use dk_simulation::Orchestrator;
use dk_worldgen::{GenConfig, GeneratedWorld, WorldGenerator, WorldOptions};
use tracing::{debug, info};

/// Assemble player options from command-line flags.
pub fn world_options(
    world: String,
    keeper: Option<String>,
    fast_immigration: bool,
    starting_resources: bool,
) -> WorldOptions {
    let mut options = WorldOptions::named(world)
        .with_fast_immigration(fast_immigration)
        .with_starting_resources(starting_resources);
    if let Some(keeper) = keeper {
        options = options.with_keeper(keeper);
    }
    options
}

/// Load a generator config, or the default one when no file is given.
fn load_config(path: Option<&Path>) -> Result<GenConfig, String> {
    let Some(path) = path else {
        return Ok(GenConfig::default());
    };
    let text = fs::read_to_string(path)
        .map_err(|e| format!("cannot read config '{}': {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("invalid config '{}': {e}", path.display()))
}

/// Generate a world, reporting failures as strings.
fn build_world(seed: u64, options: &WorldOptions, config: Option<&Path>) -> Result<GeneratedWorld, String> {
    let config = load_config(config)?;
    debug!(seed, world = %options.world_name, max_attempts = config.max_attempts, "building world");
    let world = WorldGenerator::new(config)
        .generate(seed, options)
        .map_err(|e| e.to_string())?;
    info!(game = %world.game_id, attempts = world.attempts, "world ready");
    Ok(world)
}

/// Area holding the faction's territory, or its leader's area.
fn home_area(model: &Orchestrator, spec: &FactionSpec) -> Option<AreaId> {
    model
        .areas()
        .iter()
        .find(|a| a.territory_of(spec.id).is_some())
        .map(|a| a.id())
        .or_else(|| {
            model
                .roster()
                .leader(spec.id)
                .and_then(|id| model.actor(id))
                .and_then(|a| a.area())
        })
}

fn area_label(model: &Orchestrator, area: Option<AreaId>) -> String {
    area.and_then(|id| model.area(id))
        .map(|a| a.label().to_string())
        .unwrap_or_else(|| "—".to_string())
}

fn behaviour_label(behaviour: &Behaviour) -> String {
    match behaviour {
        Behaviour::KillMembers { count } => format!("kill {count} members"),
        Behaviour::KillLeader => "kill leader".to_string(),
        Behaviour::StealGold => "steal gold".to_string(),
        Behaviour::CampAndSpawn { .. } => "camp and spawn".to_string(),
    }
}

fn hostility_label(spec: &FactionSpec) -> String {
    spec.hostility
        .as_ref()
        .map(|h| behaviour_label(&h.behaviour))
        .unwrap_or_else(|| "—".to_string())
}
