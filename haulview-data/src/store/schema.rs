//! Fixed table layout of a survey store.

use std::fmt;

use haulview_core::EntityKind;
use rusqlite::Transaction;

use super::StoreError;

/// Every table a survey store may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    /// One row per polyline vertex.
    Polylines,
    /// One row per waypoint.
    Points,
    /// One row per contour vertex.
    Surfaces,
    /// Route definitions: `route_id` and its comma-joined segments.
    Routes,
    /// Per-period tonnage by route.
    Tonnes,
    /// Join of [`Table::Tonnes`] and [`Table::Routes`].
    RoutesTonnes,
}

impl Table {
    /// Every table, entity tables first.
    pub const ALL: [Self; 6] = [
        Self::Polylines,
        Self::Points,
        Self::Surfaces,
        Self::Routes,
        Self::Tonnes,
        Self::RoutesTonnes,
    ];

    /// SQL table name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Polylines => "polylines",
            Self::Points => "points",
            Self::Surfaces => "surfaces",
            Self::Routes => "routes",
            Self::Tonnes => "tonnes",
            Self::RoutesTonnes => "routes_tonnes",
        }
    }

    /// Table backing an entity kind.
    #[must_use]
    pub const fn for_kind(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Polyline => Self::Polylines,
            EntityKind::Point => Self::Points,
            EntityKind::Surface => Self::Surfaces,
        }
    }

    const fn create_sql(self) -> &'static str {
        match self {
            Self::Polylines => {
                "CREATE TABLE IF NOT EXISTS polylines (
                    polyline_id INTEGER NOT NULL,
                    point_id INTEGER NOT NULL,
                    X REAL NOT NULL,
                    Y REAL NOT NULL,
                    Z REAL NOT NULL,
                    gradient REAL NOT NULL,
                    route TEXT,
                    tonne REAL,
                    attr_1 REAL,
                    attr_2 REAL,
                    attr_3 REAL,
                    attr_4 REAL,
                    attr_5 REAL,
                    attr_6 REAL,
                    PRIMARY KEY (polyline_id, point_id)
                )"
            }
            Self::Points => {
                "CREATE TABLE IF NOT EXISTS points (
                    point_id INTEGER PRIMARY KEY,
                    X REAL NOT NULL,
                    Y REAL NOT NULL,
                    Z REAL NOT NULL,
                    Name TEXT NOT NULL
                )"
            }
            Self::Surfaces => {
                "CREATE TABLE IF NOT EXISTS surfaces (
                    surface_id INTEGER NOT NULL,
                    point_id INTEGER NOT NULL,
                    X REAL NOT NULL,
                    Y REAL NOT NULL,
                    Z REAL NOT NULL,
                    PRIMARY KEY (surface_id, point_id)
                )"
            }
            Self::Routes => {
                "CREATE TABLE IF NOT EXISTS routes (
                    route_id TEXT NOT NULL,
                    segments TEXT NOT NULL
                )"
            }
            Self::Tonnes => {
                "CREATE TABLE IF NOT EXISTS tonnes (
                    period INTEGER NOT NULL,
                    route_id TEXT NOT NULL,
                    tonne REAL NOT NULL
                )"
            }
            Self::RoutesTonnes => {
                "CREATE TABLE IF NOT EXISTS routes_tonnes AS
                    SELECT t.period AS period, t.route_id AS route_id, t.tonne AS tonne, r.segments AS segments
                    FROM tonnes AS t
                    JOIN routes AS r ON t.route_id = r.route_id"
            }
        }
    }

    /// Create the table if absent, then delete every row.
    ///
    /// Saving always rewrites a table in full.
    pub(crate) fn recreate_empty(self, transaction: &Transaction<'_>) -> Result<(), StoreError> {
        run_step(transaction, self, "create table", self.create_sql())?;
        run_step(
            transaction,
            self,
            "delete rows",
            &format!("DELETE FROM {}", self.name()),
        )
    }

    /// Drop the table if present and rebuild it from its definition.
    pub(crate) fn rebuild(self, transaction: &Transaction<'_>) -> Result<(), StoreError> {
        run_step(
            transaction,
            self,
            "drop table",
            &format!("DROP TABLE IF EXISTS {}", self.name()),
        )?;
        run_step(transaction, self, "create table", self.create_sql())
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn run_step(
    transaction: &Transaction<'_>,
    table: Table,
    step: &'static str,
    sql: &str,
) -> Result<(), StoreError> {
    transaction
        .execute(sql, [])
        .map(|_| ())
        .map_err(|source| StoreError::Schema {
            table: table.name(),
            step,
            source,
        })
}
