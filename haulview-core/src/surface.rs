//! Terrain contour lines used as reconstruction input.

use serde::{Deserialize, Serialize};

use crate::{EntityError, Position};

/// One contour line among the set that describes a terrain surface.
///
/// # Examples
/// ```
/// use haulview_core::{Position, Surface};
///
/// let contour = Surface::new(
///     1,
///     vec![Position::new(0.0, 0.0, 10.0), Position::new(5.0, 0.0, 10.0)],
/// )
/// .expect("non-empty contour");
/// assert_eq!(contour.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    /// Session-unique identifier.
    pub id: u64,
    /// Contour vertices in survey order.
    pub vertices: Vec<Position>,
}

impl Surface {
    /// Validate and construct a contour.
    pub fn new(id: u64, vertices: Vec<Position>) -> Result<Self, EntityError> {
        if vertices.is_empty() {
            return Err(EntityError::EmptySurface { id });
        }
        Ok(Self { id, vertices })
    }

    /// Number of vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Always `false` for a validated contour.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}
