use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use dk_simulation::{SessionEvent, SessionStatus, SimEventKind, Wanderer};
use dk_worldgen::WorldOptions;

pub fn run(
    seed: u64,
    steps: u64,
    travel_chance: f64,
    config: Option<&Path>,
    verbose: bool,
) -> Result<(), String> {
    let mut world = super::build_world(seed, &WorldOptions::default(), config)?;
    let model = &mut world.model;

    let mut wanderer = Wanderer::new(seed).with_travel_chance(travel_chance);
    let taken = model
        .run(&mut wanderer, steps)
        .map_err(|e| format!("simulation error: {e}"))?;
    let session = model.take_session_events();
    tracing::info!(taken, now = %model.now(), events = model.events().len(), "simulation finished");

    // Header
    println!(
        "  {} '{}' {}",
        "Simulation".bold(),
        world.display_name,
        format!("({steps} steps, seed={seed})").dimmed()
    );
    println!(
        "  {taken} steps taken, reached t={}, {} events logged",
        model.now().0,
        model.events().len()
    );
    let status = match model.session_status() {
        SessionStatus::Ongoing => "ongoing".normal(),
        SessionStatus::Defeat => "defeat".red().bold(),
        SessionStatus::Victory => "victory".green().bold(),
    };
    println!("  Session: {status}");
    println!();

    if verbose {
        println!("  {}", "Event Log".bold().underline());
        println!();
        for event in model.events().events() {
            let time_label = format!("[t {:>5}]", event.time.0).dimmed();
            let desc = colorize_event(&event.kind, &event.description);
            println!("  {time_label} {desc}");
        }
        if model.events().is_empty() {
            println!("  {}", "(no events)".dimmed());
        }
        println!();
    } else {
        // Notable events only
        let notable: Vec<_> = model
            .events()
            .events()
            .iter()
            .filter(|e| {
                matches!(
                    e.kind,
                    SimEventKind::FactionProvoked { .. }
                        | SimEventKind::FactionAttacking { .. }
                        | SimEventKind::FactionEliminated { .. }
                        | SimEventKind::LeaderDied { .. }
                )
            })
            .collect();
        if !notable.is_empty() || !session.is_empty() {
            println!("  {}", "Notable Events".bold().underline());
            for event in &notable {
                println!("  {}", colorize_event(&event.kind, &event.description));
            }
            for event in &session {
                match event {
                    SessionEvent::LeaderDied { faction, actor } => {
                        println!("  {} leader {actor} of {faction}", "DEATH".red().bold());
                    }
                    SessionEvent::FactionEliminated { faction } => {
                        println!("  {} {faction}", "ELIMINATED".red().bold());
                    }
                }
            }
            println!();
        }
    }

    println!("  {}", "Faction Status".bold().underline());
    println!();
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Faction", "Population", "Cap", "Control", "Area"]);
    for spec in model.roster().specs() {
        let control = model
            .control::<dk_simulation::TriggerControl>(spec.id)
            .map(|c| format!("{:?}", c.state()).to_lowercase())
            .unwrap_or_else(|| "—".to_string());
        let cap = model
            .population_cap(spec.id)
            .filter(|_| spec.immigration.is_open())
            .map(|c| c.to_string())
            .unwrap_or_else(|| "—".to_string());
        table.add_row(vec![
            spec.name().to_string(),
            model.population(spec.id).to_string(),
            cap,
            control,
            super::area_label(model, super::home_area(model, spec)),
        ]);
    }
    println!("{table}");
    println!();

    // Residents per area
    for area in model.areas() {
        println!(
            "  {} {}",
            format!("{:<16}", area.label()).bold(),
            format!("{} residents", area.population()).dimmed()
        );
    }

    Ok(())
}

fn colorize_event(kind: &SimEventKind, description: &str) -> colored::ColoredString {
    match kind {
        SimEventKind::ActorRetired { .. } | SimEventKind::LeaderDied { .. } => description.red().bold(),
        SimEventKind::FactionEliminated { .. } => description.red(),
        SimEventKind::FactionProvoked { .. } => description.yellow(),
        SimEventKind::FactionAttacking { .. } => description.yellow().bold(),
        SimEventKind::Transferred { .. } => description.blue(),
        SimEventKind::Moved { .. } => description.dimmed(),
        SimEventKind::ActorAdded { .. } => description.green(),
        SimEventKind::Custom { .. } => description.normal(),
    }
}
