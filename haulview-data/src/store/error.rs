use std::io;

use camino::Utf8PathBuf;
use haulview_core::EntityKind;
use rusqlite::Error as SqliteError;
use thiserror::Error;

/// Errors raised by [`super::PersistenceGateway`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The directory that should hold the store could not be created.
    #[error("failed to create parent directory for {path}")]
    CreateDirectory {
        /// Store path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The store could not be opened.
    #[error("failed to open survey store at {path}")]
    Open {
        /// Store path.
        path: Utf8PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Creating, clearing or dropping a table failed.
    #[error("failed to {step} for table {table}")]
    Schema {
        /// Table being prepared.
        table: &'static str,
        /// Step that failed.
        step: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// A query or transaction step failed.
    #[error("failed to {operation}")]
    Query {
        /// Operation that failed.
        operation: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// A save was requested for a kind with no entities.
    #[error("no {kind} entities to save")]
    EmptyDataset {
        /// Kind that was requested.
        kind: EntityKind,
    },
    /// An identifier or vertex index does not fit an SQLite integer.
    #[error("identifier {id} exceeds the SQLite integer range in table {table}")]
    IdOutOfRange {
        /// Table being written.
        table: &'static str,
        /// Identifier that failed the conversion.
        id: u64,
    },
    /// A persisted identifier is not a positive integer.
    #[error("table {table} holds invalid identifier {value}")]
    InvalidId {
        /// Table being read.
        table: &'static str,
        /// Raw persisted value.
        value: i64,
    },
}
