use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use serde_json::json;

use dk_worldgen::{GeneratedWorld, WorldOptions};

pub fn run(seed: u64, options: &WorldOptions, config: Option<&Path>, json: bool) -> Result<(), String> {
    let world = super::build_world(seed, options, config)?;

    if json {
        let output = to_json(&world);
        let text = serde_json::to_string_pretty(&output)
            .map_err(|e| format!("JSON serialization failed: {e}"))?;
        println!("{text}");
        return Ok(());
    }

    let model = &world.model;
    println!(
        "  {} '{}' {}",
        "World".bold(),
        world.display_name,
        format!("(seed={seed}, id={}, game={})", world.world_id, world.game_id).dimmed()
    );
    println!(
        "  {} areas, {} factions, {} actors, built in {} attempt(s)",
        model.areas().len(),
        model.roster().len(),
        model.actors().count(),
        world.attempts
    );
    println!();

    let player = model.roster().player().map(|p| p.faction);
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Faction",
        "Archetype",
        "Tribe",
        "Area",
        "Population",
        "Hostility",
    ]);

    for spec in model.roster().specs() {
        let mut name = spec.name().to_string();
        if Some(spec.id) == player {
            name = format!("{} (you)", world.keeper_name).green().bold().to_string();
        } else if spec.main_villain {
            name = name.red().bold().to_string();
        }
        table.add_row(vec![
            name,
            spec.archetype.clone(),
            format!("{:?}", spec.tribe),
            super::area_label(model, super::home_area(model, spec)),
            model.population(spec.id).to_string(),
            super::hostility_label(spec),
        ]);
    }

    println!("{table}");
    println!();
    println!(
        "  {} main villains to defeat",
        model.roster().main_villains().count()
    );

    Ok(())
}

fn to_json(world: &GeneratedWorld) -> serde_json::Value {
    let model = &world.model;
    let areas: Vec<_> = model
        .areas()
        .iter()
        .map(|a| {
            json!({
                "id": a.id(),
                "label": a.label(),
                "width": a.width(),
                "height": a.height(),
                "population": a.population(),
            })
        })
        .collect();
    let factions: Vec<_> = model
        .roster()
        .specs()
        .map(|spec| {
            json!({
                "spec": spec,
                "population": model.population(spec.id),
                "leader": model.roster().leader(spec.id),
            })
        })
        .collect();

    json!({
        "world_id": world.world_id,
        "game_id": world.game_id,
        "display_name": world.display_name,
        "keeper": world.keeper_name,
        "player": world.player,
        "attempts": world.attempts,
        "areas": areas,
        "links": model.links(),
        "factions": factions,
    })
}
