//! Tolerant point-list rows.

use haulview_core::{Position, WaypointRecord};
use log::warn;

/// Parse a point-list row: columns 0 to 2 are `x, y, z` and column 5 is the
/// waypoint name. Further columns are ignored.
///
/// Returns `None` for short rows and rows with non-numeric coordinates; the
/// caller skips them.
pub(crate) fn point_row(text: &str) -> Option<WaypointRecord> {
    let fields: Vec<&str> = text.split(',').map(str::trim).collect();
    let [x, y, z, _, _, name, ..] = fields.as_slice() else {
        return None;
    };
    let parse = |token: &str| {
        token
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
    };
    let position = Position::new(parse(x)?, parse(y)?, parse(z)?).rounded();
    Some(WaypointRecord::new(position, *name))
}

/// Parse `text`, logging and discarding it when malformed.
pub(crate) fn point_row_or_skip(text: &str, line: usize) -> Option<WaypointRecord> {
    let record = point_row(text);
    if record.is_none() {
        warn!("skipping malformed point-list row {line}: `{text}`");
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn rows_take_name_from_sixth_column() {
        let record = point_row("10.5,20.25,300,a,b, Crusher ,extra").expect("valid row");
        assert_eq!(record.position, Position::new(10.5, 20.25, 300.0));
        assert_eq!(record.name, "Crusher");
    }

    #[rstest]
    fn coordinates_are_rounded_to_millimetres() {
        let record = point_row("1.23456,2.0004,3.9996,a,b,Pit").expect("valid row");
        assert_eq!(record.position, Position::new(1.235, 2.0, 4.0));
    }

    #[rstest]
    #[case("1,2,3,4,5")]
    #[case("x,y,z,a,b,name")]
    #[case("1,2,,4,5,name")]
    fn malformed_rows_are_rejected(#[case] raw: &str) {
        assert!(point_row(raw).is_none());
    }
}
