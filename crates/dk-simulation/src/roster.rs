use std::collections::{BTreeMap, BTreeSet};

use dk_core::{ActorId, FactionId, FactionSpec};
use serde::{Deserialize, Serialize};

/// The player-controlled faction and its leader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerFaction {
    /// Faction id.
    pub faction: FactionId,
    /// Leader; losing it loses the game.
    pub leader: ActorId,
}

/// Reported when the game reaches a point that may end the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEvent {
    /// A faction's leader was retired.
    LeaderDied {
        /// Faction that lost its leader.
        faction: FactionId,
        /// The leader.
        actor: ActorId,
    },
    /// The last member of a faction was retired.
    FactionEliminated {
        /// The eliminated faction.
        faction: FactionId,
    },
}

/// Where the session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Nothing decided yet.
    Ongoing,
    /// The player's leader is gone.
    Defeat,
    /// Every main villain has been eliminated.
    Victory,
}

/// Faction specs plus who leads whom.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    specs: BTreeMap<FactionId, FactionSpec>,
    player: Option<PlayerFaction>,
    leaders: BTreeMap<FactionId, ActorId>,
    eliminated: BTreeSet<FactionId>,
}

impl Roster {
    /// Create an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, spec: FactionSpec) -> Option<FactionSpec> {
        self.specs.insert(spec.id, spec)
    }

    /// Spec of `faction`.
    pub fn spec(&self, faction: FactionId) -> Option<&FactionSpec> {
        self.specs.get(&faction)
    }

    /// Every spec in id order.
    pub fn specs(&self) -> impl Iterator<Item = &FactionSpec> {
        self.specs.values()
    }

    /// Number of registered factions.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Returns `true` if no faction is registered.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// The player faction, once set.
    pub fn player(&self) -> Option<PlayerFaction> {
        self.player
    }

    pub(crate) fn set_player(&mut self, player: PlayerFaction) {
        self.player = Some(player);
        self.leaders.insert(player.faction, player.leader);
    }

    /// Leader of `faction`.
    pub fn leader(&self, faction: FactionId) -> Option<ActorId> {
        self.leaders.get(&faction).copied()
    }

    pub(crate) fn leaders(&self) -> &BTreeMap<FactionId, ActorId> {
        &self.leaders
    }

    pub(crate) fn set_leader(&mut self, faction: FactionId, actor: ActorId) {
        self.leaders.insert(faction, actor);
    }

    /// Whether `actor` leads `faction`.
    pub fn is_leader(&self, faction: FactionId, actor: ActorId) -> bool {
        self.leader(faction) == Some(actor)
    }

    pub(crate) fn mark_eliminated(&mut self, faction: FactionId) -> bool {
        self.eliminated.insert(faction)
    }

    /// Whether `faction` has lost every member.
    pub fn is_eliminated(&self, faction: FactionId) -> bool {
        self.eliminated.contains(&faction)
    }

    /// Factions whose elimination counts toward victory.
    pub fn main_villains(&self) -> impl Iterator<Item = &FactionSpec> {
        self.specs.values().filter(|s| s.main_villain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dk_core::Tribe;

    #[test]
    fn player_becomes_its_own_leader_entry() {
        let mut roster = Roster::new();
        roster.insert(FactionSpec::new(FactionId(0), "keeper", Tribe::Keeper));
        roster.set_player(PlayerFaction {
            faction: FactionId(0),
            leader: ActorId(1),
        });
        assert!(roster.is_leader(FactionId(0), ActorId(1)));
        assert_eq!(roster.player().map(|p| p.leader), Some(ActorId(1)));
    }

    #[test]
    fn main_villains_are_filtered() {
        let mut roster = Roster::new();
        let mut castle = FactionSpec::new(FactionId(1), "human_castle", Tribe::Human);
        castle.main_villain = true;
        roster.insert(castle);
        roster.insert(FactionSpec::new(FactionId(2), "cottage", Tribe::Human));

        let villains: Vec<_> = roster.main_villains().map(|s| s.id).collect();
        assert_eq!(villains, vec![FactionId(1)]);
        assert!(roster.mark_eliminated(FactionId(1)));
        assert!(!roster.mark_eliminated(FactionId(1)));
        assert!(roster.is_eliminated(FactionId(1)));
    }
}
