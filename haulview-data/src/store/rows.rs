//! Row conversions between entities and table rows.

use haulview_core::{PolylineVertex, Position, VertexAttributes};
use rusqlite::Row;

use super::{StoreError, Table};

/// Convert an entity id or vertex index for binding.
pub(crate) fn to_sql_id(table: Table, id: u64) -> Result<i64, StoreError> {
    i64::try_from(id).map_err(|_| StoreError::IdOutOfRange {
        table: table.name(),
        id,
    })
}

/// 1-based vertex index for binding.
pub(crate) fn vertex_index(table: Table, index: usize) -> Result<i64, StoreError> {
    let id = u64::try_from(index)
        .ok()
        .and_then(|value| value.checked_add(1))
        .unwrap_or(u64::MAX);
    to_sql_id(table, id)
}

/// Convert a persisted identifier back to an entity id.
pub(crate) fn from_sql_id(table: Table, value: i64) -> Result<u64, StoreError> {
    u64::try_from(value)
        .ok()
        .filter(|id| *id > 0)
        .ok_or(StoreError::InvalidId {
            table: table.name(),
            value,
        })
}

pub(crate) fn position(row: &Row<'_>, first: usize) -> rusqlite::Result<Position> {
    Ok(Position::new(
        row.get(first)?,
        row.get(first.saturating_add(1))?,
        row.get(first.saturating_add(2))?,
    ))
}

/// Decode a `polylines` row selected in schema column order.
pub(crate) fn polyline_vertex(row: &Row<'_>) -> rusqlite::Result<(i64, PolylineVertex)> {
    let id: i64 = row.get(0)?;
    let mut columns: [Option<f64>; VertexAttributes::COLUMNS] = [None; VertexAttributes::COLUMNS];
    for (offset, slot) in columns.iter_mut().enumerate() {
        *slot = row.get(offset.saturating_add(8))?;
    }
    let vertex = PolylineVertex {
        position: position(row, 2)?,
        gradient: row.get(5)?,
        route: row.get(6)?,
        tonne: row.get(7)?,
        attributes: VertexAttributes::from_columns(columns),
    };
    Ok((id, vertex))
}

/// Group rows already ordered by entity id into one vertex list per entity.
pub(crate) fn group_by_entity<V>(
    table: Table,
    rows: impl IntoIterator<Item = (i64, V)>,
) -> Result<Vec<(u64, Vec<V>)>, StoreError> {
    let mut groups: Vec<(u64, Vec<V>)> = Vec::new();
    for (raw_id, vertex) in rows {
        let id = from_sql_id(table, raw_id)?;
        match groups.last_mut() {
            Some((current, vertices)) if *current == id => vertices.push(vertex),
            _ => groups.push((id, vec![vertex])),
        }
    }
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn consecutive_rows_share_an_entity() {
        let groups = group_by_entity(Table::Surfaces, vec![(1, 'a'), (1, 'b'), (3, 'c')])
            .expect("group rows");
        assert_eq!(groups, vec![(1, vec!['a', 'b']), (3, vec!['c'])]);
    }

    #[rstest]
    #[case(0)]
    #[case(-4)]
    fn non_positive_ids_are_rejected(#[case] raw: i64) {
        let error = from_sql_id(Table::Points, raw).expect_err("invalid id");
        assert!(matches!(error, StoreError::InvalidId { value, .. } if value == raw));
    }

    #[rstest]
    fn ids_beyond_i64_are_rejected() {
        assert!(matches!(
            to_sql_id(Table::Polylines, u64::MAX),
            Err(StoreError::IdOutOfRange { .. })
        ));
        assert_eq!(vertex_index(Table::Polylines, 0).expect("index"), 1);
    }
}
