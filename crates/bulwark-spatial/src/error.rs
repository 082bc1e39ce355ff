//! Spatial error types.

use thiserror::Error;

use crate::WorldId;

/// Errors raised while building coordinates and regions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpatialError {
    /// A region's corners must lie in the same world.
    #[error("region corners are in different worlds: {0} and {1}")]
    WorldMismatch(WorldId, WorldId),

    /// A coordinate key could not be decoded.
    #[error("invalid coordinate key: {0:?}")]
    InvalidCoord(String),
}

/// Result type for spatial operations.
pub type SpatialResult<T> = Result<T, SpatialError>;
