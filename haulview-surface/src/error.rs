//! Errors raised by surface reconstruction.

use haulview_core::ProfileError;
use thiserror::Error;

/// Errors raised by [`crate::SurfaceReconstructor`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ReconstructError {
    /// The reconstruction profile is out of range.
    #[error(transparent)]
    Profile(#[from] ProfileError),
    /// No contour was supplied, or every contour vertex was unusable.
    #[error("no valid surface data to reconstruct")]
    NoSurfaceData,
    /// The cleaned points are coincident or collinear in the projection
    /// plane, so no triangle could be formed.
    #[error("triangulating {points} points produced no triangles")]
    DegenerateSurface {
        /// Points left after cleaning.
        points: usize,
    },
}
