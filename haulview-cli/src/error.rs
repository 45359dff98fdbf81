//! Error types emitted by the Haulview CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use haulview::{ProfileError, WorkspaceError};
use thiserror::Error;

/// Errors emitted by the Haulview CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Flag name.
        field: &'static str,
        /// Environment variable that can supply it.
        env: &'static str,
    },
    /// An option value could not be interpreted.
    #[error("invalid {field} `{value}`: {reason}")]
    InvalidArgument {
        /// Flag name.
        field: &'static str,
        /// Supplied value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
    /// A referenced input path does not exist on disk or is not a file.
    #[error("{field} path {path:?} does not exist or is not a file")]
    MissingSourceFile {
        /// Flag naming the path.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Flag naming the path.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },
    /// The reconstruction parameters are out of range.
    #[error(transparent)]
    Profile(#[from] ProfileError),
    /// The imported files held no entities.
    #[error("no entities were found in the imported files")]
    NothingImported,
    /// A workspace operation failed.
    #[error(transparent)]
    Workspace(#[from] Box<WorkspaceError>),
    /// Serialising the mesh export failed.
    #[error("failed to serialise mesh export: {0}")]
    SerialiseMesh(#[source] serde_json::Error),
    /// Creating the mesh export file failed.
    #[error("failed to create mesh export {path:?}: {source}")]
    CreateOutput {
        /// Export path.
        path: Utf8PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },
    /// Writing command output failed.
    #[error("failed to write command output: {0}")]
    WriteOutput(#[source] std::io::Error),
}

impl From<WorkspaceError> for CliError {
    fn from(error: WorkspaceError) -> Self {
        Self::Workspace(Box::new(error))
    }
}
