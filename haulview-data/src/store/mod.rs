//! SQLite persistence for survey entities.
//!
//! Each entity kind maps to one table. Saving a kind rewrites its whole table
//! inside a single transaction; loading reads every present table back in
//! ascending `(entity_id, point_id)` order.

use camino::{Utf8Path, Utf8PathBuf};
use haulview_core::{EntityBatch, EntityKind, EntityStore, Polyline, Surface, Waypoint};
use log::{debug, info};
use rusqlite::{Connection, OpenFlags, OptionalExtension, Transaction, params};

mod error;
mod rows;
mod schema;

pub use error::StoreError;
pub use schema::Table;

pub(crate) use rows::to_sql_id;

use rows::{from_sql_id, group_by_entity, polyline_vertex, position, vertex_index};

/// Entities read back from a store.
///
/// `None` means the table is absent; `Some` with an empty list means the
/// table exists but holds no rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreSnapshot {
    /// Contents of the `polylines` table.
    pub polylines: Option<Vec<Polyline>>,
    /// Contents of the `points` table.
    pub points: Option<Vec<Waypoint>>,
    /// Contents of the `surfaces` table.
    pub surfaces: Option<Vec<Surface>>,
}

impl StoreSnapshot {
    /// Replace the contents of `store` with the snapshot.
    ///
    /// The store is cleared first. Persisted identifiers are kept and every
    /// counter resumes after the highest identifier loaded. One batch is
    /// returned per table present in the snapshot.
    pub fn into_store(self, store: &mut EntityStore) -> Vec<EntityBatch> {
        store.clear();
        let mut batches = Vec::new();

        if let Some(polylines) = self.polylines {
            let mut batch = EntityBatch::empty(EntityKind::Polyline);
            for polyline in polylines {
                batch.record(polyline.id, polyline.positions().copied());
                store.insert_polyline(polyline);
            }
            batches.push(batch);
        }
        if let Some(points) = self.points {
            let mut batch = EntityBatch::empty(EntityKind::Point);
            for point in points {
                batch.record(point.id, [point.position]);
                store.insert_point(point);
            }
            batches.push(batch);
        }
        if let Some(surfaces) = self.surfaces {
            let mut batch = EntityBatch::empty(EntityKind::Surface);
            for surface in surfaces {
                batch.record(surface.id, surface.vertices.iter().copied());
                store.insert_surface(surface);
            }
            batches.push(batch);
        }
        batches
    }

    /// Report whether no entity table was present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.polylines.is_none() && self.points.is_none() && self.surfaces.is_none()
    }
}

/// Reads and writes survey entities in an SQLite file.
///
/// # Examples
/// ```no_run
/// use haulview_core::{EntityKind, test_support::sample_store};
/// use haulview_data::PersistenceGateway;
///
/// # fn main() -> Result<(), haulview_data::StoreError> {
/// let gateway = PersistenceGateway::new("survey.db");
/// let rows = gateway.save(&sample_store(), EntityKind::Polyline)?;
/// assert_eq!(rows, 5);
/// assert!(gateway.table_exists("polylines"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistenceGateway {
    path: Utf8PathBuf,
}

impl PersistenceGateway {
    /// Create a gateway for the store at `path`. Nothing is opened yet.
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store path.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Replace the table for `kind` with every entity of that kind in
    /// `store`, returning the number of rows written.
    ///
    /// The store file and its parent directories are created when missing.
    ///
    /// # Errors
    /// Returns [`StoreError::EmptyDataset`] when `store` holds no entity of
    /// `kind`, and open, schema or query errors otherwise. A failure leaves
    /// the previous table contents untouched.
    pub fn save(&self, store: &EntityStore, kind: EntityKind) -> Result<usize, StoreError> {
        if !store.has_any(kind) {
            return Err(StoreError::EmptyDataset { kind });
        }
        haulview_fs::ensure_parent_dir(&self.path).map_err(|source| {
            StoreError::CreateDirectory {
                path: self.path.clone(),
                source,
            }
        })?;

        let mut connection = self.open()?;
        let transaction = begin(&mut connection, "begin save transaction")?;
        let table = Table::for_kind(kind);
        table.recreate_empty(&transaction)?;
        let rows = match kind {
            EntityKind::Polyline => write_polylines(&transaction, store)?,
            EntityKind::Point => write_points(&transaction, store)?,
            EntityKind::Surface => write_surfaces(&transaction, store)?,
        };
        transaction
            .commit()
            .map_err(|source| StoreError::Query {
                operation: "commit save transaction",
                source,
            })?;
        info!("saved {rows} rows to table {table} in {}", self.path);
        Ok(rows)
    }

    /// Read every entity table present in the store.
    ///
    /// # Errors
    /// Returns [`StoreError::Open`] when the file is missing or unreadable
    /// and [`StoreError::Query`] or [`StoreError::InvalidId`] for unreadable
    /// rows.
    pub fn load(&self) -> Result<StoreSnapshot, StoreError> {
        let connection = self.open_read_only()?;
        let snapshot = StoreSnapshot {
            polylines: table_present(&connection, Table::Polylines)?
                .then(|| read_polylines(&connection))
                .transpose()?,
            points: table_present(&connection, Table::Points)?
                .then(|| read_points(&connection))
                .transpose()?,
            surfaces: table_present(&connection, Table::Surfaces)?
                .then(|| read_surfaces(&connection))
                .transpose()?,
        };
        info!("loaded survey store {}", self.path);
        Ok(snapshot)
    }

    /// Report whether the store holds a table called `name`.
    ///
    /// Never fails: a missing or unreadable store reports `false`, and the
    /// probe never creates the file.
    #[must_use]
    pub fn table_exists(&self, name: &str) -> bool {
        match self.probe(name) {
            Ok(found) => found,
            Err(err) => {
                debug!("table probe for {name} in {} failed: {err}", self.path);
                false
            }
        }
    }

    /// Number of rows in table `name`, or `0` when the table is absent.
    ///
    /// # Errors
    /// Returns open or query errors for a store that exists but cannot be
    /// read.
    pub fn row_count(&self, name: &str) -> Result<u64, StoreError> {
        if !self.table_exists(name) {
            return Ok(0);
        }
        let connection = self.open_read_only()?;
        let sql = format!("SELECT COUNT(*) FROM \"{}\"", name.replace('"', "\"\""));
        let count: i64 = connection
            .query_row(&sql, [], |row| row.get(0))
            .map_err(|source| StoreError::Query {
                operation: "count table rows",
                source,
            })?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    pub(crate) fn open(&self) -> Result<Connection, StoreError> {
        Connection::open(self.path.as_std_path()).map_err(|source| StoreError::Open {
            path: self.path.clone(),
            source,
        })
    }

    pub(crate) fn open_read_only(&self) -> Result<Connection, StoreError> {
        Connection::open_with_flags(
            self.path.as_std_path(),
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| StoreError::Open {
            path: self.path.clone(),
            source,
        })
    }

    fn probe(&self, name: &str) -> Result<bool, StoreError> {
        let Ok(true) = haulview_fs::file_is_file(&self.path) else {
            return Ok(false);
        };
        let connection = self.open_read_only()?;
        table_named(&connection, name)
    }
}

pub(crate) fn begin<'conn>(
    connection: &'conn mut Connection,
    operation: &'static str,
) -> Result<Transaction<'conn>, StoreError> {
    connection
        .transaction()
        .map_err(|source| StoreError::Query { operation, source })
}

pub(crate) fn table_present(connection: &Connection, table: Table) -> Result<bool, StoreError> {
    table_named(connection, table.name())
}

fn table_named(connection: &Connection, name: &str) -> Result<bool, StoreError> {
    connection
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
            |row| row.get::<_, i64>(0),
        )
        .optional()
        .map(|found| found.is_some())
        .map_err(|source| StoreError::Query {
            operation: "look up table in catalog",
            source,
        })
}

fn write_polylines(transaction: &Transaction<'_>, store: &EntityStore) -> Result<usize, StoreError> {
    let table = Table::Polylines;
    let mut statement = transaction
        .prepare(
            "INSERT INTO polylines (
                polyline_id, point_id, X, Y, Z, gradient, route, tonne,
                attr_1, attr_2, attr_3, attr_4, attr_5, attr_6
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        )
        .map_err(|source| StoreError::Query {
            operation: "prepare polyline insert",
            source,
        })?;

    let mut rows = 0_usize;
    for polyline in store.polylines() {
        let polyline_id = to_sql_id(table, polyline.id)?;
        for (index, vertex) in polyline.vertices.iter().enumerate() {
            let [a1, a2, a3, a4, a5, a6] = vertex.attributes.to_columns();
            statement
                .execute(params![
                    polyline_id,
                    vertex_index(table, index)?,
                    vertex.position.x,
                    vertex.position.y,
                    vertex.position.z,
                    vertex.gradient,
                    vertex.route,
                    vertex.tonne,
                    a1,
                    a2,
                    a3,
                    a4,
                    a5,
                    a6,
                ])
                .map_err(|source| StoreError::Query {
                    operation: "insert polyline vertex",
                    source,
                })?;
            rows = rows.saturating_add(1);
        }
    }
    Ok(rows)
}

fn write_points(transaction: &Transaction<'_>, store: &EntityStore) -> Result<usize, StoreError> {
    let mut statement = transaction
        .prepare("INSERT INTO points (point_id, X, Y, Z, Name) VALUES (?1, ?2, ?3, ?4, ?5)")
        .map_err(|source| StoreError::Query {
            operation: "prepare point insert",
            source,
        })?;

    let mut rows = 0_usize;
    for point in store.points() {
        statement
            .execute(params![
                to_sql_id(Table::Points, point.id)?,
                point.position.x,
                point.position.y,
                point.position.z,
                point.name,
            ])
            .map_err(|source| StoreError::Query {
                operation: "insert point",
                source,
            })?;
        rows = rows.saturating_add(1);
    }
    Ok(rows)
}

fn write_surfaces(transaction: &Transaction<'_>, store: &EntityStore) -> Result<usize, StoreError> {
    let table = Table::Surfaces;
    let mut statement = transaction
        .prepare("INSERT INTO surfaces (surface_id, point_id, X, Y, Z) VALUES (?1, ?2, ?3, ?4, ?5)")
        .map_err(|source| StoreError::Query {
            operation: "prepare surface insert",
            source,
        })?;

    let mut rows = 0_usize;
    for surface in store.surfaces() {
        let surface_id = to_sql_id(table, surface.id)?;
        for (index, vertex) in surface.vertices.iter().enumerate() {
            statement
                .execute(params![
                    surface_id,
                    vertex_index(table, index)?,
                    vertex.x,
                    vertex.y,
                    vertex.z,
                ])
                .map_err(|source| StoreError::Query {
                    operation: "insert surface vertex",
                    source,
                })?;
            rows = rows.saturating_add(1);
        }
    }
    Ok(rows)
}

fn read_polylines(connection: &Connection) -> Result<Vec<Polyline>, StoreError> {
    let rows = collect_rows(
        connection,
        "SELECT polyline_id, point_id, X, Y, Z, gradient, route, tonne,
                attr_1, attr_2, attr_3, attr_4, attr_5, attr_6
         FROM polylines ORDER BY polyline_id, point_id",
        "read polylines",
        polyline_vertex,
    )?;
    Ok(group_by_entity(Table::Polylines, rows)?
        .into_iter()
        .map(|(id, vertices)| Polyline { id, vertices })
        .collect())
}

fn read_points(connection: &Connection) -> Result<Vec<Waypoint>, StoreError> {
    let rows = collect_rows(
        connection,
        "SELECT point_id, X, Y, Z, Name FROM points ORDER BY point_id",
        "read points",
        |row| Ok((row.get::<_, i64>(0)?, (position(row, 1)?, row.get::<_, String>(4)?))),
    )?;
    rows.into_iter()
        .map(|(raw_id, (location, name))| {
            let id = from_sql_id(Table::Points, raw_id)?;
            Ok(Waypoint::new(id, location, name))
        })
        .collect()
}

fn read_surfaces(connection: &Connection) -> Result<Vec<Surface>, StoreError> {
    let rows = collect_rows(
        connection,
        "SELECT surface_id, point_id, X, Y, Z FROM surfaces ORDER BY surface_id, point_id",
        "read surfaces",
        |row| Ok((row.get::<_, i64>(0)?, position(row, 2)?)),
    )?;
    Ok(group_by_entity(Table::Surfaces, rows)?
        .into_iter()
        .map(|(id, vertices)| Surface { id, vertices })
        .collect())
}

fn collect_rows<T, F>(
    connection: &Connection,
    sql: &str,
    operation: &'static str,
    map: F,
) -> Result<Vec<T>, StoreError>
where
    F: FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
{
    let mut statement = connection
        .prepare(sql)
        .map_err(|source| StoreError::Query { operation, source })?;
    let mapped = statement
        .query_map([], map)
        .map_err(|source| StoreError::Query { operation, source })?;
    mapped
        .collect::<rusqlite::Result<Vec<T>>>()
        .map_err(|source| StoreError::Query { operation, source })
}

#[cfg(test)]
mod tests;
