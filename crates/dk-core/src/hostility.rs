//! Hostility records: when a faction turns on its target and what it does
//! about it. These are plain data; evaluation belongs to faction controls.

use serde::{Deserialize, Serialize};

use crate::faction::CreatureMix;
use crate::id::FactionId;
use crate::immigration::Structure;

/// Condition watched by a faction control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    /// Target's population exceeds the threshold.
    EnemyPopulation,
    /// Value stolen from this faction exceeds the threshold.
    StolenItems,
    /// Target completed a structure of this kind.
    RoomBuilt(Structure),
    /// Members of this faction were killed by the target.
    SelfVictims,
    /// Target's strength (population of fighters) exceeds the threshold.
    Power,
    /// Target hoards at least the threshold in gold.
    Gold,
}

/// A `(kind, threshold)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    /// Condition watched.
    pub kind: TriggerKind,
    /// Numeric limit; zero means "any occurrence".
    pub threshold: u32,
}

impl Trigger {
    /// Fires when the target's population exceeds `threshold`.
    pub fn enemy_population(threshold: u32) -> Self {
        Self {
            kind: TriggerKind::EnemyPopulation,
            threshold,
        }
    }

    /// Fires on any theft from this faction.
    pub fn stolen_items() -> Self {
        Self {
            kind: TriggerKind::StolenItems,
            threshold: 0,
        }
    }

    /// Fires once the target builds `structure`.
    pub fn room_built(structure: Structure) -> Self {
        Self {
            kind: TriggerKind::RoomBuilt(structure),
            threshold: 0,
        }
    }

    /// Fires once the target has killed any member.
    pub fn self_victims() -> Self {
        Self {
            kind: TriggerKind::SelfVictims,
            threshold: 0,
        }
    }

    /// Fires when the target grows strong.
    pub fn power() -> Self {
        Self {
            kind: TriggerKind::Power,
            threshold: 0,
        }
    }

    /// Fires when the target holds at least `threshold` gold.
    pub fn gold(threshold: u32) -> Self {
        Self {
            kind: TriggerKind::Gold,
            threshold,
        }
    }
}

/// What a provoked faction does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Behaviour {
    /// Attack, killing up to `count` members per raid.
    KillMembers {
        /// Members to kill before withdrawing.
        count: u32,
    },
    /// Attack straight for the target's leader.
    KillLeader,
    /// Steal gold and flee.
    StealGold,
    /// Camp near the target and periodically spawn reinforcements.
    CampAndSpawn {
        /// Creatures spawned as reinforcements.
        reinforcements: CreatureMix,
    },
}

/// Who a hostility profile is aimed at.
///
/// Profiles are declared before the player faction exists, so they start as
/// a forward reference and are bound once the player's identity is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostilityTarget {
    /// The player faction, not yet bound.
    PlayerFaction,
    /// A concrete faction.
    Faction(FactionId),
}

/// Flavour of the announcement made when the faction attacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackMessage {
    /// "The <creature> is attacking!"
    CreatureTitle,
    /// "The <tribe> of <name> are attacking!"
    TribeAndName,
}

/// Flavour of the message shown when the target first meets the faction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WelcomeMessage {
    /// A dragon warns intruders away from its hoard.
    DragonWelcome,
}

/// A faction's aggression profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostilityProfile {
    /// Own population needed before attacking.
    pub min_population: u32,
    /// Smallest team sent on an attack.
    pub min_team_size: u32,
    /// Whether the leader joins attacks.
    pub leader_attacks: bool,
    /// Conditions that provoke the faction.
    pub triggers: Vec<Trigger>,
    /// What the faction does once provoked.
    pub behaviour: Behaviour,
    /// Who the hostility is aimed at.
    pub target: HostilityTarget,
    /// Message on first contact.
    pub welcome_message: Option<WelcomeMessage>,
    /// Message on attack.
    pub attack_message: AttackMessage,
}

impl HostilityProfile {
    /// A profile aimed at the (still unbound) player faction.
    pub fn against_player(triggers: Vec<Trigger>, behaviour: Behaviour) -> Self {
        Self {
            min_population: 0,
            min_team_size: 1,
            leader_attacks: false,
            triggers,
            behaviour,
            target: HostilityTarget::PlayerFaction,
            welcome_message: None,
            attack_message: AttackMessage::TribeAndName,
        }
    }

    /// Set the population and team-size requirements.
    pub fn with_team(mut self, min_population: u32, min_team_size: u32) -> Self {
        self.min_population = min_population;
        self.min_team_size = min_team_size;
        self
    }

    /// Let the leader join attacks.
    pub fn leader_attacks(mut self) -> Self {
        self.leader_attacks = true;
        self
    }

    /// Set the attack announcement.
    pub fn with_attack_message(mut self, message: AttackMessage) -> Self {
        self.attack_message = message;
        self
    }

    /// Set the first-contact message.
    pub fn with_welcome(mut self, message: WelcomeMessage) -> Self {
        self.welcome_message = Some(message);
        self
    }

    /// Resolve the forward reference to the player faction.
    pub fn bind_player(&mut self, player: FactionId) {
        if self.target == HostilityTarget::PlayerFaction {
            self.target = HostilityTarget::Faction(player);
        }
    }

    /// Concrete target, if bound.
    pub fn target_faction(&self) -> Option<FactionId> {
        match self.target {
            HostilityTarget::Faction(id) => Some(id),
            HostilityTarget::PlayerFaction => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_resolves_forward_reference_once() {
        let mut profile = HostilityProfile::against_player(
            vec![Trigger::stolen_items()],
            Behaviour::KillLeader,
        );
        assert_eq!(profile.target_faction(), None);

        profile.bind_player(FactionId(4));
        assert_eq!(profile.target_faction(), Some(FactionId(4)));

        // A concrete target is never rebound.
        profile.bind_player(FactionId(9));
        assert_eq!(profile.target_faction(), Some(FactionId(4)));
    }

    #[test]
    fn trigger_constructors() {
        assert_eq!(Trigger::enemy_population(22).threshold, 22);
        assert_eq!(
            Trigger::room_built(Structure::Throne).kind,
            TriggerKind::RoomBuilt(Structure::Throne)
        );
        assert_eq!(Trigger::gold(500).kind, TriggerKind::Gold);
    }
}
