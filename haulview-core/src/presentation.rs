//! Rendering attributes for reconstructed surfaces.
//!
//! [`PresentationCfg`] is independent of [`crate::ReconstructionProfile`]:
//! changing colours or opacity never requires re-triangulating.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors raised when building presentation values.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PresentationError {
    /// A colour channel lies outside `[0, 1]`.
    #[error("colour channel {channel} must be within [0, 1], got {value}")]
    ChannelOutOfRange {
        /// Channel name.
        channel: &'static str,
        /// Supplied value.
        value: f64,
    },
    /// A hex colour string could not be parsed.
    #[error("invalid hex colour `{0}`; expected #RRGGBB")]
    InvalidHex(String),
    /// Opacity lies outside `[0, 1]`.
    #[error("opacity must be within [0, 1], got {0}")]
    Opacity(f64),
    /// Edge width lies outside its permitted range.
    #[error("edge width must be within [1, 10], got {0}")]
    EdgeWidth(f64),
}

/// An RGB colour with channels in `[0, 1]`.
///
/// Serialised as a `#RRGGBB` string.
///
/// # Examples
/// ```
/// use haulview_core::Rgb;
///
/// let orange: Rgb = "#FF8000".parse().expect("valid colour");
/// assert_eq!(orange.to_hex(), "#FF8000");
/// assert_eq!(Rgb::WHITE.to_hex(), "#FFFFFF");
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    r: f64,
    g: f64,
    b: f64,
}

impl Rgb {
    /// Pure white.
    pub const WHITE: Self = Self {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    /// Validate and construct a colour.
    ///
    /// # Errors
    /// Returns [`PresentationError::ChannelOutOfRange`] when any channel is
    /// outside `[0, 1]` or not a number.
    pub fn new(r: f64, g: f64, b: f64) -> Result<Self, PresentationError> {
        for (channel, value) in [("red", r), ("green", g), ("blue", b)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(PresentationError::ChannelOutOfRange { channel, value });
            }
        }
        Ok(Self { r, g, b })
    }

    /// Channels as an `[r, g, b]` array.
    #[must_use]
    pub const fn channels(&self) -> [f64; 3] {
        [self.r, self.g, self.b]
    }

    /// Format the colour as `#RRGGBB`.
    #[must_use]
    pub fn to_hex(&self) -> String {
        let [r, g, b] = self.channels().map(to_byte);
        format!("#{r:02X}{g:02X}{b:02X}")
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::WHITE
    }
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "channels are validated into [0, 1] so the scaled value fits a byte"
)]
fn to_byte(channel: f64) -> u8 {
    (channel * 255.0).round().clamp(0.0, 255.0) as u8
}

#[expect(clippy::float_arithmetic, reason = "byte to unit channel conversion")]
fn from_byte(byte: u8) -> f64 {
    f64::from(byte) / 255.0
}

impl FromStr for Rgb {
    type Err = PresentationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || PresentationError::InvalidHex(value.to_owned());
        let digits = value.trim().strip_prefix('#').ok_or_else(invalid)?;
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(invalid());
        }
        let channel = |range: std::ops::Range<usize>| {
            digits
                .get(range)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .map(from_byte)
                .ok_or_else(invalid)
        };
        Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Rendering attributes applied to a reconstructed mesh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationCfg {
    /// Surface fill colour.
    pub fill_color: Rgb,
    /// Wireframe overlay colour.
    pub wireframe_color: Rgb,
    /// Surface opacity in `[0, 1]`.
    pub opacity: f64,
    /// Wireframe line width in pixels.
    pub edge_width: f64,
}

impl PresentationCfg {
    /// Permitted range for [`Self::opacity`].
    pub const OPACITY_RANGE: RangeInclusive<f64> = 0.0..=1.0;
    /// Permitted range for [`Self::edge_width`].
    pub const EDGE_WIDTH_RANGE: RangeInclusive<f64> = 1.0..=10.0;

    /// Build a validated configuration.
    ///
    /// # Errors
    /// Returns [`PresentationError::Opacity`] or
    /// [`PresentationError::EdgeWidth`] for out-of-range values.
    pub fn new(
        fill_color: Rgb,
        wireframe_color: Rgb,
        opacity: f64,
        edge_width: f64,
    ) -> Result<Self, PresentationError> {
        let cfg = Self {
            fill_color,
            wireframe_color,
            opacity,
            edge_width,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check opacity and edge width against their ranges.
    ///
    /// # Errors
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), PresentationError> {
        if !Self::OPACITY_RANGE.contains(&self.opacity) {
            return Err(PresentationError::Opacity(self.opacity));
        }
        if !Self::EDGE_WIDTH_RANGE.contains(&self.edge_width) {
            return Err(PresentationError::EdgeWidth(self.edge_width));
        }
        Ok(())
    }
}

impl Default for PresentationCfg {
    fn default() -> Self {
        Self {
            fill_color: Rgb::WHITE,
            wireframe_color: Rgb::WHITE,
            opacity: 1.0,
            edge_width: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("#000000", [0.0, 0.0, 0.0])]
    #[case("#ffffff", [1.0, 1.0, 1.0])]
    #[case("  #FF0000", [1.0, 0.0, 0.0])]
    fn hex_colours_parse(#[case] raw: &str, #[case] expected: [f64; 3]) {
        let colour: Rgb = raw.parse().expect("valid colour");
        assert_eq!(colour.channels(), expected);
    }

    #[rstest]
    #[case("FFFFFF")]
    #[case("#FFF")]
    #[case("#GG0000")]
    #[case("#FF00001")]
    fn malformed_hex_is_rejected(#[case] raw: &str) {
        assert!(matches!(
            raw.parse::<Rgb>(),
            Err(PresentationError::InvalidHex(_))
        ));
    }

    #[rstest]
    fn channels_outside_unit_range_are_rejected() {
        let error = Rgb::new(0.5, 1.5, 0.0).expect_err("green out of range");
        assert_eq!(
            error,
            PresentationError::ChannelOutOfRange {
                channel: "green",
                value: 1.5
            }
        );
    }

    #[rstest]
    fn defaults_are_opaque_white_with_thin_edges() {
        let cfg = PresentationCfg::default();
        assert_eq!(cfg.fill_color, Rgb::WHITE);
        assert_eq!(cfg.wireframe_color.to_hex(), "#FFFFFF");
        assert!(cfg.validate().is_ok());
    }

    #[rstest]
    #[case(PresentationCfg { opacity: 1.2, ..PresentationCfg::default() })]
    #[case(PresentationCfg { edge_width: 0.0, ..PresentationCfg::default() })]
    fn invalid_presentation_is_rejected(#[case] cfg: PresentationCfg) {
        assert!(cfg.validate().is_err());
    }

    #[rstest]
    fn constructor_rejects_transparent_overflow() {
        let error = PresentationCfg::new(Rgb::WHITE, Rgb::WHITE, -0.1, 2.0).expect_err("opacity");
        assert_eq!(error, PresentationError::Opacity(-0.1));
        assert!(PresentationCfg::new(Rgb::WHITE, Rgb::WHITE, 0.5, 2.0).is_ok());
    }

    #[rstest]
    fn presentation_serialises_colours_as_hex() {
        let json = serde_json::to_value(PresentationCfg::default()).expect("serialise");
        assert_eq!(json["fill_color"], "#FFFFFF");
    }
}
