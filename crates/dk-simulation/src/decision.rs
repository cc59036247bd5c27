//! The boundary between the orchestrator and whatever decides what actors do.
//!
//! A decision process sees one actor at a time and answers with a
//! [`Decision`]: at most one transfer, at most one reschedule, or death. The
//! orchestrator applies the answer; the process never touches areas or the
//! queue itself.

use dk_core::link::LinkEntry;
use dk_core::{Actor, Area, AreaId, LinkDirection, LinkKey, Position, SimTime};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

/// Where an actor asks to go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferRequest {
    /// Travel through a passage of the current area.
    Passage {
        /// Direction of travel.
        direction: LinkDirection,
        /// Passage key.
        key: LinkKey,
    },
    /// Be placed at an exact cell, for scripted moves.
    Direct {
        /// Destination area.
        area: AreaId,
        /// Destination cell.
        position: Position,
    },
}

/// Answer of a decision process for one turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Decision {
    /// Requested transfer, applied before the reschedule.
    pub transfer: Option<TransferRequest>,
    /// Absolute time of the actor's next turn.
    pub reschedule: Option<SimTime>,
    /// The actor died during its turn.
    pub dies: bool,
}

impl Decision {
    /// Do nothing and never act again.
    pub fn idle() -> Self {
        Self::default()
    }

    /// Act again at `time`.
    pub fn wait_until(time: SimTime) -> Self {
        Self {
            reschedule: Some(time),
            ..Self::default()
        }
    }

    /// Die this turn.
    pub fn die() -> Self {
        Self {
            dies: true,
            ..Self::default()
        }
    }

    /// Also request a transfer.
    pub fn with_transfer(mut self, transfer: TransferRequest) -> Self {
        self.transfer = Some(transfer);
        self
    }
}

/// What a decision process may look at.
#[derive(Debug, Clone)]
pub struct ActorView<'a> {
    /// The acting actor.
    pub actor: &'a Actor,
    /// Area it stands in.
    pub area: &'a Area,
    /// Linked passages leaving that area.
    pub exits: Vec<LinkEntry>,
    /// Current simulated time.
    pub now: SimTime,
}

/// Decides what one actor does on its turn.
pub trait DecisionProcess {
    /// Produce this turn's decision.
    fn decide(&mut self, view: &ActorView<'_>) -> Decision;
}

impl<F> DecisionProcess for F
where
    F: FnMut(&ActorView<'_>) -> Decision,
{
    fn decide(&mut self, view: &ActorView<'_>) -> Decision {
        self(view)
    }
}

/// Seeded process that keeps every actor busy and sometimes sends it
/// through a random passage.
#[derive(Debug, Clone)]
pub struct Wanderer {
    rng: StdRng,
    travel_chance: f64,
}

impl Wanderer {
    /// Travel chance used by [`Wanderer::new`].
    pub const DEFAULT_TRAVEL_CHANCE: f64 = 0.05;

    /// A wanderer drawing from a generator seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            travel_chance: Self::DEFAULT_TRAVEL_CHANCE,
        }
    }

    /// Set the chance per turn of travelling, clamped to `0.0..=1.0`.
    pub fn with_travel_chance(mut self, chance: f64) -> Self {
        self.travel_chance = if chance.is_nan() { 0.0 } else { chance.clamp(0.0, 1.0) };
        self
    }
}

impl DecisionProcess for Wanderer {
    fn decide(&mut self, view: &ActorView<'_>) -> Decision {
        let mut decision = Decision::wait_until(view.now + view.actor.action_delay);
        if !view.exits.is_empty() && self.rng.random_bool(self.travel_chance) {
            if let Some(exit) = view.exits.choose(&mut self.rng) {
                decision = decision.with_transfer(TransferRequest::Passage {
                    direction: exit.direction,
                    key: exit.key,
                });
            }
        }
        decision
    }
}
