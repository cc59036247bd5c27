use dk_core::{CoreError, FactionId};
use dk_simulation::SimError;

/// Result alias for world generation.
pub type GenResult<T> = Result<T, GenError>;

/// Errors raised by an [`AreaBuilder`](crate::layout::AreaBuilder).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    /// No room was found for a territory footprint within the try budget.
    #[error("no room left in {label} for {faction}")]
    Exhausted {
        /// Area being laid out.
        label: String,
        /// Faction whose footprint did not fit.
        faction: FactionId,
    },

    /// No free wilderness cell was left for the spawn point.
    #[error("no free cell in {label} for the spawn point")]
    NoSpawnRoom {
        /// Area being laid out.
        label: String,
    },

    /// Writing to the area failed.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Errors raised while generating a world.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenError {
    /// The area builder could not satisfy a layout request.
    #[error("layout exhausted: {0}")]
    LayoutExhausted(#[from] LayoutError),

    /// A generated world broke a constraint (e.g. a territory too small for
    /// its population).
    #[error("constraint violated: {0}")]
    Constraint(String),

    /// The orchestrator rejected an operation. Always a generation bug.
    #[error(transparent)]
    Sim(#[from] SimError),

    /// Every attempt failed.
    #[error("world generation failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        /// Attempts made.
        attempts: u32,
        /// Failure of the final attempt.
        last: Box<GenError>,
    },

    /// Invalid generator configuration.
    #[error("invalid generator config: {0}")]
    Config(String),
}

impl GenError {
    /// Whether a fresh attempt could succeed where this one failed.
    ///
    /// Only layout exhaustion and constraint violations are; model errors
    /// such as duplicate or unlinked passages are defects and stop the
    /// pipeline at once.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::LayoutExhausted(LayoutError::Core(_)) => false,
            Self::LayoutExhausted(_) | Self::Constraint(_) => true,
            Self::Sim(_) | Self::RetriesExhausted { .. } | Self::Config(_) => false,
        }
    }
}

impl From<CoreError> for GenError {
    fn from(err: CoreError) -> Self {
        Self::Sim(SimError::Core(err))
    }
}
