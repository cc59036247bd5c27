//! World generation for Deepkeep.
//!
//! A [`WorldGenerator`] rolls the archetype [`Catalog`] into faction specs,
//! asks an [`AreaBuilder`] to lay out the top-level area and any secondary
//! areas, lands the keeper at the spawn point and populates every settlement.
//! Layout exhaustion and constraint violations restart the whole world, up
//! to [`GenConfig::max_attempts`] times.
//!
//! ```no_run
//! use dk_worldgen::{WorldOptions, generate_world};
//!
//! let world = generate_world(42, &WorldOptions::named("Gloomhold")).unwrap();
//! println!("{} ({} areas)", world.display_name, world.model.areas().len());
//! ```

/// The archetype catalog.
pub mod catalog;
/// Generator configuration and player options.
pub mod config;
/// Error types for world generation.
pub mod error;
/// The player's faction.
pub mod keeper;
/// Area builders.
pub mod layout;
/// Keeper and town names.
pub mod names;
/// The generation pipeline.
pub mod pipeline;

/// Re-exports of the catalog types.
pub use catalog::{Archetype, Catalog, CatalogEntry, WeightedArchetype};
/// Re-exports of the configuration types.
pub use config::{GenConfig, WorldOptions};
/// Re-exports of the error types.
pub use error::{GenError, GenResult, LayoutError};
/// Re-exports of the layout types.
pub use layout::{AreaBuilder, AreaRequest, RectPackingBuilder, TerritoryRequest};
/// Re-exports of the pipeline types.
pub use pipeline::{GeneratedWorld, WorldGenerator, generate_world};
