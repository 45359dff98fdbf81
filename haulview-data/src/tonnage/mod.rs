//! Time-indexed tonnage aggregation.
//!
//! Route definitions and per-period tonnage are imported into the survey
//! store as two source tables, joined into `routes_tonnes`, and then applied
//! to polylines one period at a time. Applying a period rewrites the tonnage
//! on the first vertex of every polyline, in memory and, when a `polylines`
//! table exists, in the store.

use camino::{Utf8Path, Utf8PathBuf};
use haulview_core::EntityStore;
use log::info;
use rusqlite::{Transaction, params};

mod error;
mod period;
mod sources;

pub use error::TonnageError;
pub use period::{PeriodCursor, RouteMatch};

use crate::store::{PersistenceGateway, StoreError, Table, begin, table_present};
use sources::{RouteRow, TonneRow, read_routes, read_tonnes};

/// Which tonnage tables are present in a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableStatus {
    /// `routes` has been imported.
    pub routes: bool,
    /// `tonnes` has been imported.
    pub tonnes: bool,
    /// `routes_tonnes` has been built.
    pub routes_tonnes: bool,
}

impl TableStatus {
    /// Report whether both source tables are present.
    #[must_use]
    pub const fn sources_ready(&self) -> bool {
        self.routes && self.tonnes
    }
}

/// Outcome of applying a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PeriodReport {
    /// Period applied.
    pub period: u32,
    /// Joined rows recorded for the period.
    pub rows: usize,
    /// Polylines whose route matched at least one row.
    pub matched: usize,
    /// Persisted polylines whose tonnage was rewritten.
    pub persisted: usize,
}

/// Imports tonnage sources and applies periods to polylines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TonnageAggregator {
    gateway: PersistenceGateway,
}

impl TonnageAggregator {
    /// Create an aggregator backed by the store at `path`.
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            gateway: PersistenceGateway::new(path),
        }
    }

    /// Store path.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        self.gateway.path()
    }

    /// Replace the `routes` table with the rows of the route file at `file`.
    ///
    /// # Errors
    /// Returns file or store errors. Malformed rows are skipped.
    pub fn import_routes(&self, file: &Utf8Path) -> Result<usize, TonnageError> {
        let rows = read_routes(file)?;
        let written = self.replace_table(Table::Routes, |transaction| {
            insert_routes(transaction, &rows)
        })?;
        info!("imported {written} routes from {file}");
        Ok(written)
    }

    /// Replace the `tonnes` table with the rows of the CSV file at `file`.
    ///
    /// # Errors
    /// Returns file or store errors. Rows failing conversion are skipped.
    pub fn import_tonnes(&self, file: &Utf8Path) -> Result<usize, TonnageError> {
        let rows = read_tonnes(file)?;
        let written = self.replace_table(Table::Tonnes, |transaction| {
            insert_tonnes(transaction, &rows)
        })?;
        info!("imported {written} tonnage rows from {file}");
        Ok(written)
    }

    /// Rebuild `routes_tonnes` by joining `tonnes` with `routes` on
    /// `route_id`, returning the number of joined rows.
    ///
    /// # Errors
    /// Returns [`TonnageError::MissingSource`] unless both source tables
    /// exist.
    pub fn build(&self) -> Result<usize, TonnageError> {
        for table in [Table::Routes, Table::Tonnes] {
            if !self.gateway.table_exists(table.name()) {
                return Err(TonnageError::MissingSource { table });
            }
        }
        let mut connection = self.gateway.open()?;
        let transaction = begin(&mut connection, "begin tonnage build transaction")?;
        Table::RoutesTonnes.rebuild(&transaction)?;
        let rows: i64 = transaction
            .query_row("SELECT COUNT(*) FROM routes_tonnes", [], |row| row.get(0))
            .map_err(|source| StoreError::Query {
                operation: "count joined tonnage rows",
                source,
            })?;
        transaction.commit().map_err(|source| StoreError::Query {
            operation: "commit tonnage build transaction",
            source,
        })?;
        let rows = usize::try_from(rows).unwrap_or_default();
        info!("built {rows} joined tonnage rows in {}", self.path());
        Ok(rows)
    }

    /// Which tonnage tables are present. Never fails.
    #[must_use]
    pub fn status(&self) -> TableStatus {
        TableStatus {
            routes: self.gateway.table_exists(Table::Routes.name()),
            tonnes: self.gateway.table_exists(Table::Tonnes.name()),
            routes_tonnes: self.gateway.table_exists(Table::RoutesTonnes.name()),
        }
    }

    /// Report whether the joined table holds any rows.
    ///
    /// # Errors
    /// Returns store errors for an existing but unreadable store.
    pub fn has_periods(&self) -> Result<bool, TonnageError> {
        Ok(self.gateway.row_count(Table::RoutesTonnes.name())? > 0)
    }

    /// Highest period in the joined table, or `0` when there is none.
    ///
    /// # Errors
    /// Returns store errors for an existing but unreadable store.
    pub fn max_period(&self) -> Result<u32, TonnageError> {
        if !self.gateway.table_exists(Table::RoutesTonnes.name()) {
            return Ok(0);
        }
        let connection = self.gateway.open_read_only()?;
        let max: i64 = connection
            .query_row(
                "SELECT COALESCE(MAX(period), 0) FROM routes_tonnes",
                [],
                |row| row.get(0),
            )
            .map_err(|source| StoreError::Query {
                operation: "read maximum period",
                source,
            })?;
        Ok(u32::try_from(max).unwrap_or_default())
    }

    /// Set the tonnage of every polyline in `store` for `period`.
    ///
    /// Each polyline receives the sum of the tonnage of every joined row at
    /// `period` whose segment list matches its route key, or `0` when
    /// nothing matches or it has no route. The first-vertex `tonne` of each
    /// persisted polyline is rewritten from that row's own stored route
    /// inside one transaction, so the store is updated correctly even when
    /// `store` holds different polylines.
    ///
    /// # Errors
    /// Returns [`TonnageError::MissingSource`] when `routes_tonnes` has not
    /// been built, and store errors otherwise.
    pub fn apply_period(
        &self,
        period: u32,
        store: &mut EntityStore,
        matching: RouteMatch,
    ) -> Result<PeriodReport, TonnageError> {
        if !self.gateway.table_exists(Table::RoutesTonnes.name()) {
            return Err(TonnageError::MissingSource {
                table: Table::RoutesTonnes,
            });
        }
        let mut connection = self.gateway.open()?;
        let rows = period_rows(&connection, period)?;

        let mut report = PeriodReport {
            period,
            rows: rows.len(),
            ..PeriodReport::default()
        };
        for polyline in store.polylines_mut() {
            let total = polyline
                .route()
                .and_then(|route| route_total(&rows, route, matching));
            if total.is_some() {
                report.matched = report.matched.saturating_add(1);
            }
            polyline.set_tonne(total.unwrap_or_default());
        }

        if table_present(&connection, Table::Polylines)? {
            let transaction = begin(&mut connection, "begin period update transaction")?;
            report.persisted = persist_totals(&transaction, &rows, matching)?;
            transaction.commit().map_err(|source| StoreError::Query {
                operation: "commit period update transaction",
                source,
            })?;
        }

        info!(
            "applied period {period}: {} joined rows, {} matched polylines, {} persisted",
            report.rows, report.matched, report.persisted
        );
        Ok(report)
    }

    fn replace_table<F>(&self, table: Table, insert: F) -> Result<usize, TonnageError>
    where
        F: FnOnce(&Transaction<'_>) -> Result<usize, StoreError>,
    {
        haulview_fs::ensure_parent_dir(self.path()).map_err(|source| {
            StoreError::CreateDirectory {
                path: self.path().to_path_buf(),
                source,
            }
        })?;
        let mut connection = self.gateway.open()?;
        let transaction = begin(&mut connection, "begin tonnage import transaction")?;
        table.recreate_empty(&transaction)?;
        let written = insert(&transaction)?;
        transaction.commit().map_err(|source| StoreError::Query {
            operation: "commit tonnage import transaction",
            source,
        })?;
        Ok(written)
    }
}

fn insert_routes(transaction: &Transaction<'_>, rows: &[RouteRow]) -> Result<usize, StoreError> {
    let mut statement = transaction
        .prepare("INSERT INTO routes (route_id, segments) VALUES (?1, ?2)")
        .map_err(|source| StoreError::Query {
            operation: "prepare route insert",
            source,
        })?;
    for row in rows {
        statement
            .execute(params![row.route_id, row.segments])
            .map_err(|source| StoreError::Query {
                operation: "insert route",
                source,
            })?;
    }
    Ok(rows.len())
}

fn insert_tonnes(transaction: &Transaction<'_>, rows: &[TonneRow]) -> Result<usize, StoreError> {
    let mut statement = transaction
        .prepare("INSERT INTO tonnes (period, route_id, tonne) VALUES (?1, ?2, ?3)")
        .map_err(|source| StoreError::Query {
            operation: "prepare tonnage insert",
            source,
        })?;
    for row in rows {
        statement
            .execute(params![row.period, row.route_id, row.tonne])
            .map_err(|source| StoreError::Query {
                operation: "insert tonnage row",
                source,
            })?;
    }
    Ok(rows.len())
}

fn period_rows(
    connection: &rusqlite::Connection,
    period: u32,
) -> Result<Vec<(String, f64)>, StoreError> {
    let operation = "read joined tonnage for period";
    let mut statement = connection
        .prepare("SELECT segments, tonne FROM routes_tonnes WHERE period = ?1")
        .map_err(|source| StoreError::Query { operation, source })?;
    let rows = statement
        .query_map([period], |row| Ok((row.get(0)?, row.get(1)?)))
        .map_err(|source| StoreError::Query { operation, source })?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|source| StoreError::Query { operation, source })
}

/// Sum the tonnage of every row whose segments match `route`, or `None`
/// when no row matches.
fn route_total(rows: &[(String, f64)], route: &str, matching: RouteMatch) -> Option<f64> {
    let hits: Vec<f64> = rows
        .iter()
        .filter(|(segments, _)| matching.matches(segments, route))
        .map(|(_, tonne)| *tonne)
        .collect();
    (!hits.is_empty()).then(|| hits.iter().sum())
}

fn persisted_routes(
    transaction: &Transaction<'_>,
) -> Result<Vec<(i64, Option<String>)>, StoreError> {
    let operation = "read persisted polyline routes";
    let mut statement = transaction
        .prepare("SELECT polyline_id, route FROM polylines WHERE point_id = 1")
        .map_err(|source| StoreError::Query { operation, source })?;
    let rows = statement
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .map_err(|source| StoreError::Query { operation, source })?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|source| StoreError::Query { operation, source })
}

fn persist_totals(
    transaction: &Transaction<'_>,
    rows: &[(String, f64)],
    matching: RouteMatch,
) -> Result<usize, StoreError> {
    let routes = persisted_routes(transaction)?;
    let mut statement = transaction
        .prepare("UPDATE polylines SET tonne = ?1 WHERE polyline_id = ?2 AND point_id = 1")
        .map_err(|source| StoreError::Query {
            operation: "prepare tonnage update",
            source,
        })?;
    let mut updated = 0_usize;
    for (polyline_id, route) in routes {
        let total = route
            .as_deref()
            .and_then(|key| route_total(rows, key, matching))
            .unwrap_or_default();
        updated = updated.saturating_add(
            statement
                .execute(params![total, polyline_id])
                .map_err(|source| StoreError::Query {
                    operation: "update polyline tonnage",
                    source,
                })?,
        );
    }
    Ok(updated)
}
