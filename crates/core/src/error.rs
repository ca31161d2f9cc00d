//! Error types reported by the composition engine.

use thiserror::Error;

/// Broad classification of a rejected engine call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A station could not be created.
    InvalidConstruction,
    /// A platform index was outside the station.
    InvalidIndex,
    /// A weight, power, position or count was not acceptable.
    InvalidArgument,
    /// The platform did not have (or already had) a train.
    PreconditionNotMet,
    /// The call was valid but there was nothing to change.
    NothingToDo,
}

/// Failure raised by a station operation. A failed call never mutates state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StationError {
    /// Stations need at least one platform.
    #[error("a station needs at least one platform")]
    InvalidConstruction,

    /// Platform index outside `0..platforms`.
    #[error("platform {index} does not exist (station has {platforms})")]
    InvalidIndex {
        /// Requested platform.
        index: usize,
        /// Number of platforms in the station.
        platforms: usize,
    },

    /// Argument rejected before touching the station.
    #[error("invalid {name}: {reason}")]
    InvalidArgument {
        /// Name of the offending argument.
        name: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// The operation needs a train on the platform.
    #[error("no train is stationed at platform {platform}")]
    TrainAbsent {
        /// Empty platform.
        platform: usize,
    },

    /// Arrival on a platform that already holds a train.
    #[error("platform {platform} is already occupied")]
    PlatformOccupied {
        /// Occupied platform.
        platform: usize,
    },

    /// A position or run length that does not fit the train.
    #[error("{what} {requested} is out of range for platform {platform} ({cars} cars)")]
    RangeOutOfBounds {
        /// Which bound was violated.
        what: &'static str,
        /// Platform of the train.
        platform: usize,
        /// Offending 1-based position.
        requested: usize,
        /// Cars currently in the train.
        cars: usize,
    },

    /// Same-platform move whose destination lies inside the moved run.
    #[error("cannot move cars {first}..={last} of platform {platform} after car {destination}")]
    OverlappingMove {
        /// Platform of the train.
        platform: usize,
        /// First car of the run.
        first: usize,
        /// Last car of the run.
        last: usize,
        /// Car the run was to follow.
        destination: usize,
    },

    /// Valid call that leaves the station unchanged.
    #[error("nothing to do: {0}")]
    NothingToDo(String),

    /// An engine command was issued before a station was opened.
    #[error("no station is open")]
    NoStation,
}

impl StationError {
    pub(crate) fn invalid_argument(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }

    /// Map the concrete failure onto its broad kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidConstruction => ErrorKind::InvalidConstruction,
            Self::InvalidIndex { .. } => ErrorKind::InvalidIndex,
            Self::InvalidArgument { .. }
            | Self::RangeOutOfBounds { .. }
            | Self::OverlappingMove { .. } => ErrorKind::InvalidArgument,
            Self::TrainAbsent { .. } | Self::PlatformOccupied { .. } | Self::NoStation => {
                ErrorKind::PreconditionNotMet
            }
            Self::NothingToDo(_) => ErrorKind::NothingToDo,
        }
    }
}

/// Result alias used throughout the engine.
pub type Result<T, E = StationError> = std::result::Result<T, E>;
