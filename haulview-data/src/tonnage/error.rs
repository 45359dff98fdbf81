use std::io;

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::store::{StoreError, Table};

/// Errors raised while importing or applying tonnage.
#[derive(Debug, Error)]
pub enum TonnageError {
    /// Accessing the survey store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// A route or tonnage source file could not be opened.
    #[error("failed to open tonnage source {path}")]
    Open {
        /// Source path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Reading a source line failed.
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
    /// A table the operation depends on has not been imported or built.
    #[error("table {table} is missing; import routes and tonnes, then build")]
    MissingSource {
        /// Missing table.
        table: Table,
    },
    /// A period outside `1..=max` was requested.
    #[error("period {period} is outside 1..={max}")]
    PeriodOutOfRange {
        /// Requested period.
        period: u32,
        /// Highest available period.
        max: u32,
    },
}
