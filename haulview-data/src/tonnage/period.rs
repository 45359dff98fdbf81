//! Period navigation and route matching.

use std::fmt;
use std::str::FromStr;

use super::TonnageError;

/// How a polyline's route key is matched against a route's segment list.
///
/// Segment lists are comma-joined tokens such as `"R1, R12, R3"`.
///
/// # Examples
/// ```
/// use haulview_data::RouteMatch;
///
/// assert!(RouteMatch::Token.matches("R12,R3", "R3"));
/// assert!(!RouteMatch::Token.matches("R12,R3", "R1"));
/// // Legacy behaviour: R1 is a substring of R12.
/// assert!(RouteMatch::Substring.matches("R12,R3", "R1"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RouteMatch {
    /// The route key equals one of the trimmed segment tokens.
    #[default]
    Token,
    /// The route key appears anywhere in the segment text.
    ///
    /// Kept for compatibility with stores produced by earlier tooling. A key
    /// that is a textual substring of another segment double-counts.
    Substring,
}

impl RouteMatch {
    /// Report whether `route` matches `segments`.
    #[must_use]
    pub fn matches(&self, segments: &str, route: &str) -> bool {
        match self {
            Self::Token => {
                let key = route.trim();
                segments.split(',').map(str::trim).any(|token| token == key)
            }
            Self::Substring => segments.contains(route),
        }
    }

    /// Name accepted by [`FromStr`].
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::Substring => "substring",
        }
    }
}

impl fmt::Display for RouteMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RouteMatch {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "token" => Ok(Self::Token),
            "substring" => Ok(Self::Substring),
            other => Err(format!(
                "unknown route match `{other}`; expected token or substring"
            )),
        }
    }
}

/// Cyclic cursor over the periods `1..=max`.
///
/// With no periods available the cursor stays at `0`.
///
/// # Examples
/// ```
/// use haulview_data::PeriodCursor;
///
/// let mut cursor = PeriodCursor::new(3);
/// assert_eq!(cursor.previous(), 3);
/// assert_eq!(cursor.next(), 1);
/// assert_eq!(cursor.next(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PeriodCursor {
    current: u32,
    max: u32,
}

impl PeriodCursor {
    /// Start at period 1, or 0 when `max` is 0.
    #[must_use]
    pub const fn new(max: u32) -> Self {
        Self {
            current: if max == 0 { 0 } else { 1 },
            max,
        }
    }

    /// Period the cursor points at.
    #[must_use]
    pub const fn current(&self) -> u32 {
        self.current
    }

    /// Highest period.
    #[must_use]
    pub const fn max(&self) -> u32 {
        self.max
    }

    /// Advance, wrapping from `max` to 1.
    pub const fn next(&mut self) -> u32 {
        if self.max != 0 {
            self.current = if self.current >= self.max {
                1
            } else {
                self.current + 1
            };
        }
        self.current
    }

    /// Step back, wrapping from 1 to `max`.
    pub const fn previous(&mut self) -> u32 {
        if self.max != 0 {
            self.current = if self.current <= 1 || self.current > self.max {
                self.max
            } else {
                self.current - 1
            };
        }
        self.current
    }

    /// Jump to `period`.
    ///
    /// # Errors
    /// Returns [`TonnageError::PeriodOutOfRange`] unless `1 <= period <= max`.
    pub fn set(&mut self, period: u32) -> Result<u32, TonnageError> {
        if period == 0 || period > self.max {
            return Err(TonnageError::PeriodOutOfRange {
                period,
                max: self.max,
            });
        }
        self.current = period;
        Ok(period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("R1,R2", "R1", true)]
    #[case(" R1 , R2 ", "R2", true)]
    #[case("R12,R3", "R1", false)]
    #[case("", "R1", false)]
    fn token_matching_needs_an_exact_token(
        #[case] segments: &str,
        #[case] route: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(RouteMatch::Token.matches(segments, route), expected);
    }

    #[rstest]
    fn substring_matching_keeps_legacy_false_positives() {
        assert!(RouteMatch::Substring.matches("R12,R3", "R1"));
        assert!(!RouteMatch::Substring.matches("R2,R3", "R1"));
    }

    #[rstest]
    fn cursor_without_periods_stays_at_zero() {
        let mut cursor = PeriodCursor::new(0);
        assert_eq!(cursor.next(), 0);
        assert_eq!(cursor.previous(), 0);
        assert!(cursor.set(1).is_err());
    }

    #[rstest]
    #[case(0)]
    #[case(5)]
    fn out_of_range_periods_are_rejected(#[case] period: u32) {
        let mut cursor = PeriodCursor::new(4);
        assert!(matches!(
            cursor.set(period),
            Err(TonnageError::PeriodOutOfRange { max: 4, .. })
        ));
        assert_eq!(cursor.current(), 1);
    }

    #[rstest]
    fn route_match_names_parse() {
        assert_eq!("Substring".parse::<RouteMatch>(), Ok(RouteMatch::Substring));
        assert_eq!(RouteMatch::default().to_string(), "token");
        assert!("fuzzy".parse::<RouteMatch>().is_err());
    }

    proptest! {
        #[test]
        fn cursor_stays_within_bounds(max in 1u32..50, steps in proptest::collection::vec(any::<bool>(), 0..100)) {
            let mut cursor = PeriodCursor::new(max);
            for forward in steps {
                let period = if forward { cursor.next() } else { cursor.previous() };
                prop_assert!((1..=max).contains(&period));
            }
        }

        #[test]
        fn a_full_cycle_returns_to_the_start(max in 1u32..50, start in 1u32..50) {
            let mut cursor = PeriodCursor::new(max);
            let origin = cursor.set(start.min(max)).expect("in range");
            for _ in 0..max {
                cursor.next();
            }
            prop_assert_eq!(cursor.current(), origin);
        }
    }
}
