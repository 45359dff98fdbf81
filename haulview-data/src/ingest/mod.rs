//! Readers for the line-oriented survey formats.
//!
//! Polyline text, polyline CSV and contour text are strict: the first
//! malformed line aborts the read with [`ReadError::FormatParse`]. The point
//! list is tolerant and skips malformed rows with a warning.
//!
//! Coordinates are rounded to three decimals on read and empty chains are
//! dropped, so every returned chain has at least one vertex.

use std::fmt;
use std::io::BufRead;
use std::str::FromStr;

use camino::Utf8Path;
use haulview_core::{EntityKind, ParsedBatch, PolylineVertex, polyline::assign_gradients};
use log::info;

mod chains;
mod error;
mod points;

pub use error::ReadError;

use chains::{ChainCollector, is_delimiter, named_csv_line, xyz_line};
use error::LineError;
use points::point_row_or_skip;

/// The file formats a survey can be read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    /// `x y z` lines with `$` between polylines.
    PolylineText,
    /// `name,x,y,z` rows with `$` between polylines; `name` becomes the
    /// polyline's route key.
    PolylineCsv,
    /// Comma-separated waypoint rows with at least six columns.
    PointList,
    /// `x y z` lines with `$` between contours.
    SurfaceText,
}

impl SourceFormat {
    /// Every readable format.
    pub const ALL: [Self; 4] = [
        Self::PolylineText,
        Self::PolylineCsv,
        Self::PointList,
        Self::SurfaceText,
    ];

    /// Infer the format from the file extension.
    ///
    /// `.xyz` is polyline text, `.srg` is contour text and `.csv` is a point
    /// list. Polyline CSV shares the `.csv` extension and must be requested
    /// explicitly.
    ///
    /// # Examples
    /// ```
    /// use camino::Utf8Path;
    /// use haulview_data::SourceFormat;
    ///
    /// assert_eq!(
    ///     SourceFormat::from_path(Utf8Path::new("pit/roads.XYZ")),
    ///     Some(SourceFormat::PolylineText)
    /// );
    /// assert_eq!(SourceFormat::from_path(Utf8Path::new("survey.db")), None);
    /// ```
    #[must_use]
    pub fn from_path(path: &Utf8Path) -> Option<Self> {
        match haulview_fs::lowercase_extension(path)?.as_str() {
            "xyz" => Some(Self::PolylineText),
            "srg" => Some(Self::SurfaceText),
            "csv" => Some(Self::PointList),
            _ => None,
        }
    }

    /// Report whether `path` names a persisted store rather than a text
    /// source.
    #[must_use]
    pub fn is_store_path(path: &Utf8Path) -> bool {
        haulview_fs::lowercase_extension(path).is_some_and(|ext| ext == "db")
    }

    /// Kind of entity the format produces.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::PolylineText | Self::PolylineCsv => EntityKind::Polyline,
            Self::PointList => EntityKind::Point,
            Self::SurfaceText => EntityKind::Surface,
        }
    }

    /// Name accepted by [`FromStr`].
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PolylineText => "polyline-text",
            Self::PolylineCsv => "polyline-csv",
            Self::PointList => "point-list",
            Self::SurfaceText => "surface-text",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "polyline-text" | "xyz" => Ok(Self::PolylineText),
            "polyline-csv" => Ok(Self::PolylineCsv),
            "point-list" | "points" => Ok(Self::PointList),
            "surface-text" | "srg" => Ok(Self::SurfaceText),
            other => Err(format!(
                "unknown source format `{other}`; expected one of polyline-text, polyline-csv, point-list, surface-text"
            )),
        }
    }
}

/// Read the survey file at `path`.
///
/// # Errors
/// Returns [`ReadError::Open`] when the file cannot be opened and any error
/// from [`read_source`].
///
/// # Examples
/// ```no_run
/// use camino::Utf8Path;
/// use haulview_data::{SourceFormat, read_file};
///
/// # fn main() -> Result<(), haulview_data::ReadError> {
/// let parsed = read_file(Utf8Path::new("roads.xyz"), SourceFormat::PolylineText)?;
/// assert!(!parsed.is_empty());
/// # Ok(())
/// # }
/// ```
pub fn read_file(path: &Utf8Path, format: SourceFormat) -> Result<ParsedBatch, ReadError> {
    let reader = haulview_fs::open_buffered(path).map_err(|source| ReadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed = read_source(reader, format, path)?;
    info!(
        "read {} {} entities from {path}",
        parsed.len(),
        format.kind()
    );
    Ok(parsed)
}

/// Read survey lines from `reader`. `origin` names the source in errors.
///
/// Blank lines are ignored in every format.
///
/// # Errors
/// Returns [`ReadError::Read`] on I/O failure and
/// [`ReadError::FormatParse`] for the first malformed line of a strict
/// format.
pub fn read_source<R: BufRead>(
    reader: R,
    format: SourceFormat,
    origin: &Utf8Path,
) -> Result<ParsedBatch, ReadError> {
    let lines = reader.lines().enumerate().map(|(index, line)| {
        let number = index.saturating_add(1);
        line.map(|text| (number, text))
            .map_err(|source| ReadError::Read {
                path: origin.to_path_buf(),
                line: number,
                source,
            })
    });

    let parsed = match format {
        SourceFormat::PolylineText => {
            ParsedBatch::Polylines(read_chains(lines, origin, |text, line| {
                xyz_line(text, line).map(PolylineVertex::new)
            })?)
        }
        SourceFormat::PolylineCsv => {
            ParsedBatch::Polylines(read_chains(lines, origin, named_csv_line)?)
        }
        SourceFormat::SurfaceText => ParsedBatch::Surfaces(read_chains(lines, origin, xyz_line)?),
        SourceFormat::PointList => {
            let mut records = Vec::new();
            for entry in lines {
                let (line, text) = entry?;
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    continue;
                }
                records.extend(point_row_or_skip(trimmed, line));
            }
            ParsedBatch::Points(records)
        }
    };

    Ok(match parsed {
        ParsedBatch::Polylines(mut chains) => {
            for chain in &mut chains {
                assign_gradients(chain);
            }
            ParsedBatch::Polylines(chains)
        }
        other => other,
    })
}

fn read_chains<V, I, F>(lines: I, origin: &Utf8Path, parse: F) -> Result<Vec<Vec<V>>, ReadError>
where
    I: Iterator<Item = Result<(usize, String), ReadError>>,
    F: Fn(&str, usize) -> Result<V, LineError>,
{
    let mut collector = ChainCollector::new();
    for entry in lines {
        let (line, text) = entry?;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            continue;
        }
        if is_delimiter(trimmed) {
            collector.split();
            continue;
        }
        let vertex = parse(trimmed, line).map_err(|err| err.with_path(origin.to_path_buf()))?;
        collector.push(vertex);
    }
    Ok(collector.finish())
}
