use crate::area::Position;
use crate::id::{ActorId, AreaId};
use crate::link::{LinkDirection, LinkKey};

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised by the area and link-graph model.
///
/// None of these are expected in a correctly generated world; they signal
/// generation bugs or misuse of the model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// Traversal was attempted through a passage with no link-graph entry.
    #[error("no passage {direction} through {key} from {area}")]
    UnlinkedPassage {
        /// Direction of travel.
        direction: LinkDirection,
        /// Passage key.
        key: LinkKey,
        /// Area the traveller tried to leave.
        area: AreaId,
    },

    /// The same `(direction, key, area)` end was registered twice.
    #[error("passage {direction} through {key} from {area} is already linked")]
    DuplicateLink {
        /// Direction of travel.
        direction: LinkDirection,
        /// Passage key.
        key: LinkKey,
        /// Area owning the duplicated end.
        area: AreaId,
    },

    /// An area has no link point for a passage the graph says it has.
    #[error("{area} has no {direction} link point for {key}")]
    MissingLinkPoint {
        /// Area that was searched.
        area: AreaId,
        /// Direction of the missing point.
        direction: LinkDirection,
        /// Key of the missing point.
        key: LinkKey,
    },

    /// An area has no spawn point with the given key.
    #[error("{area} has no spawn point {key}")]
    MissingSpawnPoint {
        /// Area that was searched.
        area: AreaId,
        /// Requested key.
        key: LinkKey,
    },

    /// A position lies outside the area's grid.
    #[error("position {position} is outside {area}")]
    OutOfBounds {
        /// Area whose bounds were exceeded.
        area: AreaId,
        /// Offending position.
        position: Position,
    },

    /// A cell already holds another actor.
    #[error("cell {position} in {area} is occupied by {occupant}")]
    CellOccupied {
        /// Area of the cell.
        area: AreaId,
        /// Position of the cell.
        position: Position,
        /// Actor already standing there.
        occupant: ActorId,
    },

    /// A cell cannot be stood on.
    #[error("cell {position} in {area} is blocked")]
    CellBlocked {
        /// Area of the cell.
        area: AreaId,
        /// Position of the cell.
        position: Position,
    },

    /// The actor is not a resident of the area it was looked up in.
    #[error("{actor} is not resident in {area}")]
    NotResident {
        /// Actor looked up.
        actor: ActorId,
        /// Area searched.
        area: AreaId,
    },

    /// The actor is already resident in the area.
    #[error("{actor} is already resident in {area}")]
    AlreadyResident {
        /// Actor being inserted.
        actor: ActorId,
        /// Area it already lives in.
        area: AreaId,
    },

    /// No free cell exists near a landing point.
    #[error("no free cell near {position} in {area}")]
    NoLandingSpot {
        /// Area that was searched.
        area: AreaId,
        /// Centre of the search.
        position: Position,
    },
}
