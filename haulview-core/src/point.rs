//! Named survey waypoints.

use serde::{Deserialize, Serialize};

use crate::Position;

/// A single named survey location.
///
/// # Examples
/// ```
/// use haulview_core::{Position, Waypoint};
///
/// let waypoint = Waypoint::new(3, Position::new(1.0, 2.0, 3.0), "Crusher");
/// assert_eq!(waypoint.id, 3);
/// assert_eq!(waypoint.name, "Crusher");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Session-unique identifier.
    pub id: u64,
    /// Survey position.
    pub position: Position,
    /// Free-text label.
    pub name: String,
}

impl Waypoint {
    /// Construct a waypoint.
    pub fn new(id: u64, position: Position, name: impl Into<String>) -> Self {
        Self {
            id,
            position,
            name: name.into(),
        }
    }
}

/// A waypoint read from a source file before an identifier is assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaypointRecord {
    /// Survey position.
    pub position: Position,
    /// Free-text label.
    pub name: String,
}

impl WaypointRecord {
    /// Construct a record.
    pub fn new(position: Position, name: impl Into<String>) -> Self {
        Self {
            position,
            name: name.into(),
        }
    }

    /// Attach an identifier, producing a [`Waypoint`].
    #[must_use]
    pub fn into_waypoint(self, id: u64) -> Waypoint {
        Waypoint {
            id,
            position: self.position,
            name: self.name,
        }
    }
}
