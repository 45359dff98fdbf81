//! Surface reconstruction parameters.
//!
//! A [`ReconstructionProfile`] is a plain value: it is validated on demand
//! rather than on every field write so presentation layers can bind sliders
//! directly to its public fields.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Plane onto which contour points are projected before triangulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionPlane {
    /// Least-squares plane fitted through the cleaned point cloud.
    BestFit,
    /// Horizontal plane; elevation is discarded.
    #[default]
    Xy,
    /// Vertical plane spanned by northing and elevation.
    Yz,
    /// Vertical plane spanned by easting and elevation.
    Xz,
}

impl ProjectionPlane {
    /// Every plane, in presentation order.
    pub const ALL: [Self; 4] = [Self::BestFit, Self::Xy, Self::Yz, Self::Xz];

    /// Return the lowercase name used in configuration files.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BestFit => "bestfit",
            Self::Xy => "xy",
            Self::Yz => "yz",
            Self::Xz => "xz",
        }
    }
}

impl fmt::Display for ProjectionPlane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown projection plane name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown projection plane `{0}`; expected bestfit, xy, yz or xz")]
pub struct UnknownProjectionPlane(pub String);

impl FromStr for ProjectionPlane {
    type Err = UnknownProjectionPlane;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalised = value.trim().to_ascii_lowercase().replace(['-', '_', ' '], "");
        Self::ALL
            .into_iter()
            .find(|plane| plane.as_str() == normalised)
            .ok_or_else(|| UnknownProjectionPlane(value.to_owned()))
    }
}

/// Errors raised by [`ReconstructionProfile::validate`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProfileError {
    /// A parameter lies outside its permitted range.
    #[error("{parameter} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// Supplied value.
        value: f64,
        /// Inclusive lower bound.
        min: f64,
        /// Inclusive upper bound.
        max: f64,
    },
}

/// Parameters controlling the reconstruction pipeline.
///
/// Tolerances are fractions of the point cloud's bounding-box diagonal.
///
/// # Examples
/// ```
/// use haulview_core::{ProjectionPlane, ReconstructionProfile};
///
/// let mut profile = ReconstructionProfile::default();
/// assert!(profile.validate().is_ok());
///
/// profile.projection_plane = ProjectionPlane::BestFit;
/// profile.offset = 25.0;
/// assert!(profile.validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconstructionProfile {
    /// Merge distance for near-duplicate points.
    pub cleaner_tolerance: f64,
    /// Maximum circumradius of kept triangles. `0` keeps the convex hull.
    pub alpha: f64,
    /// Distance under which an inserted point is treated as coincident.
    pub triangulation_tolerance: f64,
    /// Super-triangle margin as a multiple of the bounding-box diagonal.
    pub offset: f64,
    /// Dihedral angle in degrees above which an edge is kept sharp.
    pub feature_angle: f64,
    /// Projection used before triangulation.
    pub projection_plane: ProjectionPlane,
}

impl ReconstructionProfile {
    /// Permitted range for both tolerances.
    pub const TOLERANCE_RANGE: RangeInclusive<f64> = 0.0001..=0.1;
    /// Permitted range for [`Self::alpha`].
    pub const ALPHA_RANGE: RangeInclusive<f64> = 0.0..=100.0;
    /// Permitted range for [`Self::offset`].
    pub const OFFSET_RANGE: RangeInclusive<f64> = 1.0..=20.0;
    /// Permitted range for [`Self::feature_angle`].
    pub const FEATURE_ANGLE_RANGE: RangeInclusive<f64> = 0.0..=180.0;

    /// Build a validated profile.
    ///
    /// # Errors
    /// Returns [`ProfileError::OutOfRange`] for the first parameter outside
    /// its range.
    pub fn new(
        cleaner_tolerance: f64,
        alpha: f64,
        triangulation_tolerance: f64,
        offset: f64,
        feature_angle: f64,
        projection_plane: ProjectionPlane,
    ) -> Result<Self, ProfileError> {
        let profile = Self {
            cleaner_tolerance,
            alpha,
            triangulation_tolerance,
            offset,
            feature_angle,
            projection_plane,
        };
        profile.validate()?;
        Ok(profile)
    }

    /// Check every parameter against its range.
    ///
    /// # Errors
    /// Returns [`ProfileError::OutOfRange`] for the first parameter outside
    /// its range. `NaN` is always out of range.
    pub fn validate(&self) -> Result<(), ProfileError> {
        check("cleaner_tolerance", self.cleaner_tolerance, &Self::TOLERANCE_RANGE)?;
        check("alpha", self.alpha, &Self::ALPHA_RANGE)?;
        check(
            "triangulation_tolerance",
            self.triangulation_tolerance,
            &Self::TOLERANCE_RANGE,
        )?;
        check("offset", self.offset, &Self::OFFSET_RANGE)?;
        check("feature_angle", self.feature_angle, &Self::FEATURE_ANGLE_RANGE)
    }
}

impl Default for ReconstructionProfile {
    fn default() -> Self {
        Self {
            cleaner_tolerance: 0.001,
            alpha: 0.0,
            triangulation_tolerance: 0.001,
            offset: 1.0,
            feature_angle: 30.0,
            projection_plane: ProjectionPlane::Xy,
        }
    }
}

fn check(
    parameter: &'static str,
    value: f64,
    range: &RangeInclusive<f64>,
) -> Result<(), ProfileError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ProfileError::OutOfRange {
            parameter,
            value,
            min: *range.start(),
            max: *range.end(),
        })
    }
}
