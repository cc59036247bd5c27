//! Turn-ordered multi-area simulation for Deepkeep.
//!
//! The [`Orchestrator`] owns the areas of a world, the link graph between
//! them and a global [`TurnQueue`]. Each [`Orchestrator::step`] pops the
//! next-due actor, asks a [`DecisionProcess`] what it does, and applies at
//! most one transfer and one reschedule. Non-player factions are driven by
//! [`FactionControl`]s that read faction counters and issue ordinary
//! requests.

/// Simulation clock.
pub mod clock;
/// Configuration types for simulation runs.
pub mod config;
/// Faction control interface and the trigger-driven reference control.
pub mod control;
/// Per-faction counters observed by controls.
pub mod counters;
/// The actor decision interface.
pub mod decision;
/// Error types for the simulation crate.
pub mod error;
/// Simulation event types and the event log.
pub mod event;
/// The simulation model.
pub mod orchestrator;
/// Global turn ordering.
pub mod queue;
/// Faction roster and session reporting.
pub mod roster;

/// Re-export of [`clock::SimClock`].
pub use clock::SimClock;
/// Re-export of [`config::SimConfig`].
pub use config::SimConfig;
/// Re-exports of the control types.
pub use control::{Announcement, ControlRequest, ControlState, FactionControl, TriggerControl};
/// Re-exports of the counter types.
pub use counters::{CounterBook, CounterView, FactionCounters};
/// Re-exports of the decision types.
pub use decision::{ActorView, Decision, DecisionProcess, TransferRequest, Wanderer};
/// Re-exports of [`error::SimError`] and [`error::SimResult`].
pub use error::{SimError, SimResult};
/// Re-exports of [`event::EventLog`], [`event::SimEvent`], and [`event::SimEventKind`].
pub use event::{EventLog, SimEvent, SimEventKind};
/// Re-exports of the orchestrator types.
pub use orchestrator::{Orchestrator, StepOutcome};
/// Re-exports of the queue types.
pub use queue::{QueueError, TurnQueue};
/// Re-exports of the roster types.
pub use roster::{PlayerFaction, Roster, SessionEvent, SessionStatus};
