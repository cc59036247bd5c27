use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identity of an actor for its whole lifetime, including retirement.
///
/// Actors are referenced by identity everywhere (areas, queue, counters),
/// never by a container-local handle, so moving an actor between areas
/// cannot leave a dangling reference behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(pub u64);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

/// Index of an area inside the orchestrator's area registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AreaId(pub u32);

impl AreaId {
    /// The registry slot this id refers to.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for AreaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "area#{}", self.0)
    }
}

/// Identity of a faction in the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FactionId(pub u32);

impl fmt::Display for FactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "faction#{}", self.0)
    }
}

/// Identifier of one generated world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldId(pub Uuid);

impl WorldId {
    /// Build a world id from externally drawn random bytes.
    ///
    /// Callers pass bytes from their seeded generator so that the same seed
    /// always yields the same id.
    pub fn from_random_bytes(bytes: [u8; 16]) -> Self {
        Self(uuid::Builder::from_random_bytes(bytes).into_uuid())
    }
}

impl fmt::Display for WorldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Hands out sequential ids. One allocator lives per world build, so ids
/// are dense and reproducible.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdAllocator {
    next_actor: u64,
    next_faction: u32,
}

impl IdAllocator {
    /// Create an allocator starting at zero for every id kind.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next actor id.
    pub fn actor(&mut self) -> ActorId {
        let id = ActorId(self.next_actor);
        self.next_actor += 1;
        id
    }

    /// Allocate the next faction id.
    pub fn faction(&mut self) -> FactionId {
        let id = FactionId(self.next_faction);
        self.next_faction += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_id_display_shows_short_form() {
        let id = WorldId(Uuid::parse_str("a3f2b1c8-1234-5678-9abc-def012345678").unwrap());
        assert_eq!(id.to_string(), "a3f2b1c8");
    }

    #[test]
    fn world_id_is_stable_for_same_bytes() {
        let a = WorldId::from_random_bytes([7; 16]);
        let b = WorldId::from_random_bytes([7; 16]);
        assert_eq!(a, b);
        assert_eq!(a.0.get_version_num(), 4);
    }

    #[test]
    fn allocator_is_sequential() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.actor(), ActorId(0));
        assert_eq!(ids.actor(), ActorId(1));
        assert_eq!(ids.faction(), FactionId(0));
        assert_eq!(ids.faction(), FactionId(1));
    }
}
