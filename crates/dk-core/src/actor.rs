use std::fmt;

use serde::{Deserialize, Serialize};

use crate::area::Position;
use crate::id::{ActorId, AreaId, FactionId};
use crate::time::SimTime;

/// Species or role of a creature. Only identifies what to spawn; stats and
/// abilities belong to the combat layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum CreatureKind {
    // Player faction
    Keeper,
    Imp,
    Goblin,
    Orc,
    OrcShaman,
    Ogre,
    Harpy,
    SpecialHumanoid,
    Zombie,
    Vampire,
    LostSoul,
    Succubus,
    Doppelganger,
    Raven,
    Bat,
    Wolf,
    CaveBear,
    Werewolf,
    SpecialMonsterKeeper,

    // Settlements
    Villager,
    Child,
    Gnome,
    GnomeChief,
    Dwarf,
    DwarfBaron,
    Elf,
    ElfArcher,
    ElfLord,
    Lizardman,
    LizardLord,
    Warrior,
    Shaman,
    Knight,
    Archer,
    CastleGuard,
    Avatar,
    Elementalist,
    AirElemental,
    FireElemental,
    EarthElemental,
    WaterElemental,
    Witch,
    Bandit,

    // Lairs and vaults
    GreenDragon,
    RedDragon,
    Cyclops,
    Rat,
    Spider,
    Scorpion,

    // Wildlife
    Deer,
    Boar,
    Fox,
}

impl fmt::Display for CreatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Reuse the serde spelling so logs and JSON agree.
        let name = format!("{self:?}");
        let mut out = String::with_capacity(name.len() + 4);
        for (i, c) in name.chars().enumerate() {
            if c.is_uppercase() {
                if i > 0 {
                    out.push('_');
                }
                out.extend(c.to_lowercase());
            } else {
                out.push(c);
            }
        }
        write!(f, "{out}")
    }
}

/// Where an actor currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Area the actor is resident in.
    pub area: AreaId,
    /// Cell inside that area.
    pub position: Position,
}

/// Lifecycle state of an actor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorStatus {
    /// Resident in an area and eligible for scheduling.
    #[default]
    Alive,
    /// Moved to the terminal pool. Irreversible.
    Retired,
}

/// A live entity of the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    /// Stable identity.
    pub id: ActorId,
    /// Display name.
    pub name: String,
    /// What kind of creature this is.
    pub kind: CreatureKind,
    /// Faction affiliation.
    pub faction: FactionId,
    /// Current area and cell; `None` before placement and after retirement.
    pub location: Option<Location>,
    /// Absolute time of the next action.
    pub next_action: SimTime,
    /// Turns one ordinary action takes.
    pub action_delay: u64,
    /// Lifecycle state.
    pub status: ActorStatus,
}

impl Actor {
    /// Create an unplaced, alive actor that acts at time zero.
    pub fn new(id: ActorId, kind: CreatureKind, faction: FactionId) -> Self {
        Self {
            id,
            name: kind.to_string(),
            kind,
            faction,
            location: None,
            next_action: SimTime::ZERO,
            action_delay: 1,
            status: ActorStatus::Alive,
        }
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the duration of an ordinary action.
    pub fn with_action_delay(mut self, turns: u64) -> Self {
        self.action_delay = turns.max(1);
        self
    }

    /// Set the time of the first action.
    pub fn with_next_action(mut self, time: SimTime) -> Self {
        self.next_action = time;
        self
    }

    /// Area the actor lives in, if any.
    pub fn area(&self) -> Option<AreaId> {
        self.location.map(|l| l.area)
    }

    /// Returns `true` unless the actor has been retired.
    pub fn is_alive(&self) -> bool {
        self.status == ActorStatus::Alive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creature_kind_display_is_snake_case() {
        assert_eq!(CreatureKind::GreenDragon.to_string(), "green_dragon");
        assert_eq!(CreatureKind::Imp.to_string(), "imp");
        assert_eq!(CreatureKind::SpecialMonsterKeeper.to_string(), "special_monster_keeper");
    }

    #[test]
    fn display_matches_serde_spelling() {
        let json = serde_json::to_string(&CreatureKind::OrcShaman).unwrap();
        assert_eq!(json, format!("\"{}\"", CreatureKind::OrcShaman));
    }

    #[test]
    fn new_actor_defaults() {
        let actor = Actor::new(ActorId(3), CreatureKind::Orc, FactionId(1)).with_action_delay(0);
        assert_eq!(actor.name, "orc");
        assert!(actor.is_alive());
        assert!(actor.area().is_none());
        assert_eq!(actor.action_delay, 1);
    }
}
