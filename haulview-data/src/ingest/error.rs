use std::io;

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors raised while reading a survey file.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The source file could not be opened.
    #[error("failed to open survey file {path}")]
    Open {
        /// Path that was requested.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Reading a line failed part way through the file.
    #[error("failed to read line {line} of {path}")]
    Read {
        /// Source path.
        path: Utf8PathBuf,
        /// 1-based line number.
        line: usize,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// A required token was missing or not a finite number.
    #[error("{path}:{line}: {reason} in `{token}`")]
    FormatParse {
        /// Source path.
        path: Utf8PathBuf,
        /// 1-based line number.
        line: usize,
        /// Offending token, or the whole line for arity errors.
        token: String,
        /// Short description of the failure.
        reason: &'static str,
    },
}

/// A parse failure before the source path is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LineError {
    pub(crate) line: usize,
    pub(crate) token: String,
    pub(crate) reason: &'static str,
}

impl LineError {
    pub(crate) fn new(line: usize, token: &str, reason: &'static str) -> Self {
        Self {
            line,
            token: token.to_owned(),
            reason,
        }
    }

    pub(crate) fn with_path(self, path: Utf8PathBuf) -> ReadError {
        ReadError::FormatParse {
            path,
            line: self.line,
            token: self.token,
            reason: self.reason,
        }
    }
}
