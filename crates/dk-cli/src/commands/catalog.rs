use comfy_table::{ContentArrangement, Table};

use dk_worldgen::Catalog;

pub fn run() -> Result<(), String> {
    let catalog = Catalog::standard();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Entry",
        "Count",
        "Archetype",
        "Tribe",
        "Population",
        "Hostility",
        "Extra area",
    ]);

    let mut archetypes = 0;
    for entry in catalog.entries() {
        for archetype in entry.archetypes() {
            archetypes += 1;
            let hostility = archetype
                .hostility
                .as_ref()
                .map(|h| super::behaviour_label(&h.behaviour))
                .unwrap_or_else(|| "—".to_string());
            let extra = archetype
                .extra_area
                .map(|e| e.label().to_string())
                .unwrap_or_else(|| "—".to_string());
            table.add_row(vec![
                entry.name().to_string(),
                entry.count().to_string(),
                archetype.name.clone(),
                format!("{:?}", archetype.tribe),
                archetype.population.to_string(),
                hostility,
                extra,
            ]);
        }
    }

    println!("{table}");
    println!();
    println!(
        "  {} entries, {archetypes} archetypes",
        catalog.entries().len()
    );

    Ok(())
}
