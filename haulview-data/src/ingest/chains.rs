//! `$`-delimited vertex chains shared by the polyline and contour formats.

use std::mem;

use haulview_core::{PolylineVertex, Position, round3};

use super::error::LineError;

/// Accumulates vertices into chains, starting a new chain at each delimiter.
#[derive(Debug)]
pub(crate) struct ChainCollector<V> {
    chains: Vec<Vec<V>>,
    current: Vec<V>,
}

impl<V> ChainCollector<V> {
    pub(crate) const fn new() -> Self {
        Self {
            chains: Vec::new(),
            current: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, vertex: V) {
        self.current.push(vertex);
    }

    /// Close the chain in progress. Empty chains are dropped.
    pub(crate) fn split(&mut self) {
        if !self.current.is_empty() {
            self.chains.push(mem::take(&mut self.current));
        }
    }

    pub(crate) fn finish(mut self) -> Vec<Vec<V>> {
        self.split();
        self.chains
    }
}

/// Report whether `line` separates two chains.
///
/// Accepts a bare `$` as well as a `$` followed only by empty CSV fields.
pub(crate) fn is_delimiter(line: &str) -> bool {
    line.strip_prefix('$')
        .is_some_and(|rest| rest.chars().all(|ch| ch == ',' || ch.is_whitespace()))
}

/// Parse one coordinate, rounded to millimetre precision.
pub(crate) fn coordinate(token: &str, line: usize) -> Result<f64, LineError> {
    let value: f64 = token
        .trim()
        .parse()
        .map_err(|_| LineError::new(line, token, "expected a number"))?;
    if !value.is_finite() {
        return Err(LineError::new(line, token, "expected a finite number"));
    }
    Ok(round3(value))
}

/// Parse a whitespace-separated `x y z` triple.
pub(crate) fn xyz_line(text: &str, line: usize) -> Result<Position, LineError> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let [x, y, z] = tokens.as_slice() else {
        return Err(LineError::new(line, text, "expected three coordinates"));
    };
    Ok(Position::new(
        coordinate(x, line)?,
        coordinate(y, line)?,
        coordinate(z, line)?,
    ))
}

/// Parse a `name,x,y,z` polyline CSV row.
pub(crate) fn named_csv_line(text: &str, line: usize) -> Result<PolylineVertex, LineError> {
    let fields: Vec<&str> = text.split(',').map(str::trim).collect();
    let [name, x, y, z] = fields.as_slice() else {
        return Err(LineError::new(line, text, "expected name,x,y,z"));
    };
    let position = Position::new(
        coordinate(x, line)?,
        coordinate(y, line)?,
        coordinate(z, line)?,
    );
    let vertex = PolylineVertex::new(position);
    Ok(if name.is_empty() {
        vertex
    } else {
        vertex.with_route(*name)
    })
}
