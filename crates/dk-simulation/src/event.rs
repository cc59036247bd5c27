use dk_core::{ActorId, AreaId, FactionId, SimTime};
use dk_core::hostility::Behaviour;
use serde::{Deserialize, Serialize};

/// What kind of simulation event occurred.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimEventKind {
    /// An actor was placed in an area and registered for turns.
    ActorAdded {
        /// The new actor.
        actor: ActorId,
        /// Where it was placed.
        area: AreaId,
    },
    /// An actor moved from one area to another.
    Transferred {
        /// The travelling actor.
        actor: ActorId,
        /// Area it left.
        from: AreaId,
        /// Area it reached.
        to: AreaId,
    },
    /// An actor changed cells without leaving its area.
    Moved {
        /// The moving actor.
        actor: ActorId,
        /// Area it stays in.
        area: AreaId,
    },
    /// An actor left the simulation for good.
    ActorRetired {
        /// The retired actor.
        actor: ActorId,
        /// Why it was retired.
        cause: String,
    },
    /// A faction's trigger fired.
    FactionProvoked {
        /// The provoked faction.
        faction: FactionId,
    },
    /// A faction sent a team to attack.
    FactionAttacking {
        /// The attacking faction.
        faction: FactionId,
        /// What the team is out to do.
        behaviour: Behaviour,
        /// Members sent.
        team: Vec<ActorId>,
    },
    /// The last member of a faction was retired.
    FactionEliminated {
        /// The eliminated faction.
        faction: FactionId,
    },
    /// A faction's leader was retired.
    LeaderDied {
        /// The leaderless faction.
        faction: FactionId,
        /// The dead leader.
        actor: ActorId,
    },
    /// A user-defined event.
    Custom {
        /// A label identifying the custom event type.
        label: String,
        /// The actors involved in this custom event.
        actors: Vec<ActorId>,
    },
}

impl SimEventKind {
    /// Check whether a given actor is involved in this event.
    pub fn involves(&self, id: ActorId) -> bool {
        match self {
            Self::ActorAdded { actor, .. }
            | Self::Transferred { actor, .. }
            | Self::Moved { actor, .. }
            | Self::ActorRetired { actor, .. }
            | Self::LeaderDied { actor, .. } => *actor == id,
            Self::FactionAttacking { team, .. } => team.contains(&id),
            Self::Custom { actors, .. } => actors.contains(&id),
            Self::FactionProvoked { .. } | Self::FactionEliminated { .. } => false,
        }
    }
}

/// A record of something that happened during simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimEvent {
    /// Simulated time of the event.
    pub time: SimTime,
    /// The specific kind of event that occurred.
    pub kind: SimEventKind,
    /// A human-readable description of the event.
    pub description: String,
}

impl SimEvent {
    /// Create a new simulation event with the given time, kind, and description.
    pub fn new(time: SimTime, kind: SimEventKind, description: impl Into<String>) -> Self {
        Self {
            time,
            kind,
            description: description.into(),
        }
    }
}

/// Accumulates events during a simulation run.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    events: Vec<SimEvent>,
    max_events: usize,
}

impl EventLog {
    /// Create a new event log with the given maximum capacity (0 = unlimited).
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Vec::new(),
            max_events,
        }
    }

    /// Append an event, dropping the oldest events if the log exceeds its capacity.
    pub fn push(&mut self, event: SimEvent) {
        self.events.push(event);
        if self.max_events > 0 && self.events.len() > self.max_events {
            let drain_count = self.events.len() - self.max_events;
            self.events.drain(..drain_count);
        }
    }

    /// Return a slice of all recorded events.
    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    /// Return all events that occurred at the given time.
    pub fn events_at(&self, time: SimTime) -> Vec<&SimEvent> {
        self.events.iter().filter(|e| e.time == time).collect()
    }

    /// Return all events involving the given actor.
    pub fn events_for_actor(&self, id: ActorId) -> Vec<&SimEvent> {
        self.events.iter().filter(|e| e.kind.involves(id)).collect()
    }

    /// Return the number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Return `true` if no events have been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Remove all recorded events.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn retired(actor: u64) -> SimEventKind {
        SimEventKind::ActorRetired {
            actor: ActorId(actor),
            cause: "test".into(),
        }
    }

    #[test]
    fn event_log_push_and_query() {
        let mut log = EventLog::new(0);
        log.push(SimEvent::new(SimTime(1), retired(7), "test"));
        assert_eq!(log.len(), 1);
        assert_eq!(log.events_at(SimTime(1)).len(), 1);
        assert_eq!(log.events_for_actor(ActorId(7)).len(), 1);
        assert!(log.events_for_actor(ActorId(8)).is_empty());
    }

    #[test]
    fn event_log_max_events_trims() {
        let mut log = EventLog::new(2);
        for i in 0..5 {
            log.push(SimEvent::new(SimTime(i), retired(1), "test"));
        }
        assert_eq!(log.len(), 2);
        // Oldest events were dropped, newest remain
        assert_eq!(log.events()[0].time, SimTime(3));
        assert_eq!(log.events()[1].time, SimTime(4));
    }

    #[test]
    fn event_kind_involves_actor() {
        let kind = SimEventKind::Transferred {
            actor: ActorId(1),
            from: AreaId(0),
            to: AreaId(1),
        };
        assert!(kind.involves(ActorId(1)));
        assert!(!kind.involves(ActorId(2)));

        let kind = SimEventKind::FactionAttacking {
            faction: FactionId(3),
            behaviour: Behaviour::KillLeader,
            team: vec![ActorId(4), ActorId(5)],
        };
        assert!(kind.involves(ActorId(5)));
        assert!(!kind.involves(ActorId(3)));

        assert!(!SimEventKind::FactionEliminated { faction: FactionId(1) }.involves(ActorId(1)));
        let moved = SimEventKind::Moved {
            actor: ActorId(6),
            area: AreaId(0),
        };
        assert!(moved.involves(ActorId(6)));
        assert!(!moved.involves(ActorId(0)));

        let kind = SimEventKind::Custom {
            label: "test".into(),
            actors: vec![ActorId(1), ActorId(2)],
        };
        assert!(kind.involves(ActorId(2)));
        assert!(!kind.involves(ActorId(9)));
    }

    #[test]
    fn event_log_clear() {
        let mut log = EventLog::new(0);
        log.push(SimEvent::new(SimTime(1), retired(1), "test"));
        assert!(!log.is_empty());
        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn event_log_unlimited_capacity() {
        let mut log = EventLog::new(0);
        for i in 0..1000 {
            log.push(SimEvent::new(SimTime(i), retired(1), "test"));
        }
        assert_eq!(log.len(), 1000);
    }
}
