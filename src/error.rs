//! Errors surfaced by [`crate::Workspace`].

use camino::Utf8PathBuf;
use haulview_core::PresentationError;
use haulview_data::{ReadError, StoreError, TonnageError};
use haulview_surface::ReconstructError;
use thiserror::Error;

/// Any failure raised while driving a [`crate::Workspace`].
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// A survey file could not be read or parsed.
    #[error(transparent)]
    Read(#[from] ReadError),
    /// The persisted store could not be accessed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Tonnage import, build or period application failed.
    #[error(transparent)]
    Tonnage(#[from] TonnageError),
    /// Surface reconstruction failed.
    #[error(transparent)]
    Reconstruct(#[from] ReconstructError),
    /// Presentation settings were out of range.
    #[error(transparent)]
    Presentation(#[from] PresentationError),
    /// The file extension does not name a known survey format.
    #[error("cannot infer the survey format of {path}; name the format explicitly")]
    UnrecognisedFormat {
        /// File whose format was requested.
        path: Utf8PathBuf,
    },
    /// A tonnage operation ran before a store was attached.
    #[error("no tonnage store is attached")]
    NoTonnageStore,
}
