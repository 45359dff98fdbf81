//! Survey file readers and SQLite persistence for Haulview.
//!
//! Responsibilities:
//! - Parse the text survey formats into [`haulview_core::ParsedBatch`]es.
//! - Persist and restore entity tables with a fixed schema.
//! - Import per-route tonnage sources and apply a period to polylines.
//!
//! Boundaries:
//! - Identifier assignment belongs to [`haulview_core::EntityStore`].
//! - Every SQLite sequence that issues more than one statement runs inside a
//!   single transaction.
//!
//! Invariants:
//! - Probing a missing database never creates it.
//! - No global mutable state.
#![forbid(unsafe_code)]

pub mod ingest;
pub mod store;
pub mod tonnage;

pub use ingest::{ReadError, SourceFormat, read_file, read_source};
pub use store::{PersistenceGateway, StoreError, StoreSnapshot, Table};
pub use tonnage::{
    PeriodCursor, PeriodReport, RouteMatch, TableStatus, TonnageAggregator, TonnageError,
};
