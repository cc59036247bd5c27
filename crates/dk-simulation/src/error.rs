use dk_core::{ActorId, AreaId, CoreError, FactionId, SimTime};

use crate::queue::QueueError;

/// Result alias for orchestrator operations.
pub type SimResult<T> = Result<T, SimError>;

/// Errors raised by the orchestrator.
///
/// Apart from an empty queue, which `step` reports as an outcome, every
/// variant signals a defect in the caller or in the generated world.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimError {
    /// An area or link operation failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A queue operation failed.
    #[error(transparent)]
    Queue(#[from] QueueError),

    /// No live or retired actor has this id.
    #[error("actor not found in simulation: {0}")]
    ActorNotFound(ActorId),

    /// The actor has already been retired.
    #[error("{0} has been retired")]
    ActorRetired(ActorId),

    /// An actor with this id was already added.
    #[error("{0} is already registered")]
    DuplicateActor(ActorId),

    /// The actor has no location to be placed at.
    #[error("{0} has no location")]
    Unplaced(ActorId),

    /// A faction with this id was already added.
    #[error("{0} is already registered")]
    DuplicateFaction(FactionId),

    /// No area has this id.
    #[error("area not found in simulation: {0}")]
    AreaNotFound(AreaId),

    /// Areas must be registered in id order.
    #[error("expected area {expected}, got {got}")]
    AreaIdMismatch {
        /// Id the registry would assign next.
        expected: AreaId,
        /// Id carried by the area.
        got: AreaId,
    },

    /// An action was requested before the current time.
    #[error("{actor} cannot be scheduled at {requested}, the clock reads {now}")]
    ScheduleInPast {
        /// Actor being scheduled.
        actor: ActorId,
        /// Requested time.
        requested: SimTime,
        /// Current time.
        now: SimTime,
    },

    /// A faction control issued a request for someone else's actor.
    #[error("control of {faction} cannot command {actor}")]
    ForeignActor {
        /// Faction owning the control.
        faction: FactionId,
        /// Actor it tried to command.
        actor: ActorId,
    },
}
