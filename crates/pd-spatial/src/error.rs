//! Spatial-subsystem error type.

use thiserror::Error;

/// Errors produced by `pd-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("segment {index} has zero length")]
    DegenerateSegment { index: usize },

    #[error("segment {index} has a non-finite coordinate")]
    NonFiniteSegment { index: usize },

    #[error("polygon needs at least 2 vertices, got {0}")]
    TooFewVertices(usize),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
