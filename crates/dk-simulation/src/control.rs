use dk_core::hostility::Trigger;
use dk_core::{ActorId, Behaviour, FactionId, HostilityProfile, SimTime, TriggerKind};

use crate::counters::{CounterView, FactionCounters};
use crate::decision::TransferRequest;

/// What a faction control asks the orchestrator to do. Every request must
/// concern the control's own faction.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlRequest {
    /// Give a member its next turn at `time`.
    Schedule {
        /// Member to schedule.
        actor: ActorId,
        /// Absolute time of its turn.
        time: SimTime,
    },
    /// Move a member.
    Transfer {
        /// Member to move.
        actor: ActorId,
        /// Where to.
        request: TransferRequest,
    },
    /// Record a change of mood in the event log.
    Announce(Announcement),
}

/// Mood changes worth logging.
#[derive(Debug, Clone, PartialEq)]
pub enum Announcement {
    /// A trigger fired.
    Provoked,
    /// A team set out.
    Attacking {
        /// What the team is out to do.
        behaviour: Behaviour,
        /// Members sent.
        team: Vec<ActorId>,
    },
}

/// Behaviour of one non-player faction.
///
/// Controls only read counters and answer with requests; the orchestrator
/// owns them and runs them at a fixed interval.
pub trait FactionControl: std::fmt::Debug {
    /// Human-readable name for this control.
    fn name(&self) -> &str;

    /// The faction this control speaks for.
    fn faction(&self) -> FactionId;

    /// React to the current counters.
    fn update(&mut self, view: &CounterView<'_>, now: SimTime) -> Vec<ControlRequest>;

    /// Support downcasting to concrete types.
    fn as_any(&self) -> &dyn std::any::Any;
}

/// Where a [`TriggerControl`] stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ControlState {
    /// No trigger has fired.
    #[default]
    Dormant,
    /// Waiting to gather a team.
    Provoked,
    /// A team is out.
    Attacking {
        /// Members sent.
        team: Vec<ActorId>,
    },
}

/// Reference control driven by a faction's hostility profile.
#[derive(Debug, Clone)]
pub struct TriggerControl {
    faction: FactionId,
    profile: HostilityProfile,
    state: ControlState,
}

impl TriggerControl {
    /// A dormant control for `faction`.
    pub fn new(faction: FactionId, profile: HostilityProfile) -> Self {
        Self {
            faction,
            profile,
            state: ControlState::Dormant,
        }
    }

    /// Current state.
    pub fn state(&self) -> &ControlState {
        &self.state
    }

    /// The profile being followed.
    pub fn profile(&self) -> &HostilityProfile {
        &self.profile
    }

    fn fires(&self, trigger: &Trigger, own: &FactionCounters, target: &FactionCounters) -> bool {
        let threshold = u64::from(trigger.threshold);
        match trigger.kind {
            TriggerKind::EnemyPopulation => u64::from(target.population()) > threshold,
            TriggerKind::StolenItems => own.stolen_value > threshold,
            TriggerKind::RoomBuilt(structure) => {
                target.structures_of(structure) >= trigger.threshold.max(1)
            }
            TriggerKind::SelfVictims => u64::from(own.victims) > threshold,
            TriggerKind::Power if threshold > 0 => u64::from(target.population()) > threshold,
            TriggerKind::Power => target.population() > 0 && target.population() >= own.population(),
            TriggerKind::Gold => target.gold >= threshold,
        }
    }

    fn gather_team(&self, own: &FactionCounters, leader: Option<ActorId>) -> Option<Vec<ActorId>> {
        if own.population() < self.profile.min_population {
            return None;
        }
        let size = self.profile.min_team_size.max(1) as usize;
        let team: Vec<ActorId> = own
            .members()
            .filter(|&m| self.profile.leader_attacks || Some(m) != leader)
            .take(size)
            .collect();
        (team.len() == size).then_some(team)
    }
}

impl FactionControl for TriggerControl {
    fn name(&self) -> &str {
        "trigger"
    }

    fn faction(&self) -> FactionId {
        self.faction
    }

    fn update(&mut self, view: &CounterView<'_>, now: SimTime) -> Vec<ControlRequest> {
        let Some(target) = self.profile.target_faction() else {
            return Vec::new();
        };
        let empty = FactionCounters::default();
        let own = view.faction(self.faction).unwrap_or(&empty);
        let target = view.faction(target).unwrap_or(&empty);
        let mut requests = Vec::new();

        if let ControlState::Attacking { team } = &self.state {
            if team.iter().all(|&m| !own.is_member(m)) {
                self.state = ControlState::Provoked;
            }
        }

        if self.state == ControlState::Dormant
            && self.profile.triggers.iter().any(|t| self.fires(t, own, target))
        {
            self.state = ControlState::Provoked;
            requests.push(ControlRequest::Announce(Announcement::Provoked));
        }

        if self.state == ControlState::Provoked {
            if let Some(team) = self.gather_team(own, view.leader(self.faction)) {
                requests.extend(
                    team.iter()
                        .map(|&actor| ControlRequest::Schedule { actor, time: now }),
                );
                requests.push(ControlRequest::Announce(Announcement::Attacking {
                    behaviour: self.profile.behaviour.clone(),
                    team: team.clone(),
                }));
                self.state = ControlState::Attacking { team };
            }
        }

        requests
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
