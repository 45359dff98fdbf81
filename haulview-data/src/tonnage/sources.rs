//! Parsers for the route and tonnage source files.
//!
//! Routes are CSV rows holding a route id followed by its segments, for
//! example `HAUL-01, R1, R2, R7`, stored as `("HAUL-01", "R1,R2,R7")`.
//! Tonnage is CSV with
//! `period,route_id,tonne` rows. Periods are numbered from 1, so a period of
//! 0 is treated like any other row that fails conversion: it is skipped with
//! a warning, as is an optional header row.

use std::io::BufRead;

use camino::Utf8Path;
use log::warn;

use super::TonnageError;

/// One route definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RouteRow {
    pub(crate) route_id: String,
    pub(crate) segments: String,
}

/// Tonnage hauled over a route in one period.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TonneRow {
    pub(crate) period: u32,
    pub(crate) route_id: String,
    pub(crate) tonne: f64,
}

pub(crate) fn read_routes(path: &Utf8Path) -> Result<Vec<RouteRow>, TonnageError> {
    read_rows(path, "route", route_row)
}

pub(crate) fn read_tonnes(path: &Utf8Path) -> Result<Vec<TonneRow>, TonnageError> {
    read_rows(path, "tonnage", tonne_row)
}

fn read_rows<T>(
    path: &Utf8Path,
    label: &str,
    parse: fn(&str) -> Option<T>,
) -> Result<Vec<T>, TonnageError> {
    let reader = haulview_fs::open_buffered(path).map_err(|source| TonnageError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut rows = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let number = index.saturating_add(1);
        let text = line.map_err(|source| TonnageError::Read {
            path: path.to_path_buf(),
            line: number,
            source,
        })?;
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match parse(trimmed) {
            Some(row) => rows.push(row),
            None => warn!("skipping {label} row {number} of {path}: `{trimmed}`"),
        }
    }
    Ok(rows)
}

pub(crate) fn route_row(text: &str) -> Option<RouteRow> {
    let mut fields = text.split(',').map(str::trim);
    let route_id = fields.next().filter(|id| !id.is_empty())?;
    let segments = fields
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(",");
    if segments.is_empty() {
        return None;
    }
    Some(RouteRow {
        route_id: route_id.to_owned(),
        segments,
    })
}

pub(crate) fn tonne_row(text: &str) -> Option<TonneRow> {
    let fields: Vec<&str> = text.split(',').map(str::trim).collect();
    let [period, route_id, tonne] = fields.as_slice() else {
        return None;
    };
    let period: u32 = period.parse().ok().filter(|value| *value > 0)?;
    let tonne: f64 = tonne.parse().ok().filter(|value: &f64| value.is_finite())?;
    if route_id.is_empty() {
        return None;
    }
    Some(TonneRow {
        period,
        route_id: (*route_id).to_owned(),
        tonne,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn route_rows_split_id_from_segments() {
        let row = route_row("HAUL-01 ,  R1, R2,R7").expect("route row");
        assert_eq!(row.route_id, "HAUL-01");
        assert_eq!(row.segments, "R1,R2,R7");
    }

    #[rstest]
    #[case("HAUL-01")]
    #[case("HAUL-01, ,")]
    #[case(", R1, R2")]
    fn routes_without_segments_are_skipped(#[case] raw: &str) {
        assert!(route_row(raw.trim()).is_none());
    }

    #[rstest]
    fn tonne_rows_parse() {
        let row = tonne_row("3, HAUL-01, 1250.5").expect("tonne row");
        assert_eq!(row.period, 3);
        assert_eq!(row.route_id, "HAUL-01");
        assert_eq!(row.tonne, 1250.5);
    }

    #[rstest]
    #[case("period,route_id,tonne")]
    #[case("0,HAUL-01,10")]
    #[case("1,,10")]
    #[case("1,HAUL-01,lots")]
    #[case("1,HAUL-01")]
    fn tonne_rows_failing_conversion_are_skipped(#[case] raw: &str) {
        assert!(tonne_row(raw).is_none());
    }
}
