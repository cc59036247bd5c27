//! Core types for Deepkeep: areas, actors, the link graph, and faction specs.
//!
//! This crate is the data model shared by the simulation and the world
//! generator. It owns no scheduling or generation logic; every type here can
//! be built by hand or deserialized as an opaque record.

/// Actors and creature kinds.
pub mod actor;
/// Area grids, link points and territories.
pub mod area;
/// Error types used throughout the crate.
pub mod error;
/// Faction specs and settlement requests.
pub mod faction;
/// Hostility triggers and behaviour modes.
pub mod hostility;
/// Stable identifiers.
pub mod id;
/// Immigration policies and population bonuses.
pub mod immigration;
/// Passage keys and the link graph.
pub mod link;
/// Simulated time.
pub mod time;

/// Re-export actor types.
pub use actor::{Actor, ActorStatus, CreatureKind, Location};
/// Re-export area types.
pub use area::{Area, Position, Rect, Terrain, Territory};
/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export faction types.
pub use faction::{CreatureMix, FactionSpec, SettlementSpec, Tribe};
/// Re-export hostility types.
pub use hostility::{Behaviour, HostilityProfile, HostilityTarget, Trigger, TriggerKind};
/// Re-export identifiers.
pub use id::{ActorId, AreaId, FactionId, IdAllocator, WorldId};
/// Re-export immigration types.
pub use immigration::{ImmigrationPolicy, Structure};
/// Re-export link types.
pub use link::{LinkDirection, LinkGraph, LinkKey};
/// Re-export time.
pub use time::SimTime;
