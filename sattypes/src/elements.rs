use crate::time::{EpochTime, MINUTES_PER_DAY};
use derive_more::Display;
use serde::Serialize;
use std::fmt;

/// Orbital period at and above which the deep-space (SDP4) branch applies
pub const DEEP_SPACE_PERIOD_MINUTES: f64 = 225.0;

/// Line 1, column 8
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize)]
pub enum Classification {
    Unclassified,
    Classified,
    Secret,
    Other(char),
}

impl From<char> for Classification {
    fn from(c: char) -> Self {
        match c {
            'U' | ' ' => Classification::Unclassified,
            'C' => Classification::Classified,
            'S' => Classification::Secret,
            _ => Classification::Other(c),
        }
    }
}

impl From<Classification> for char {
    fn from(c: Classification) -> Self {
        match c {
            Classification::Unclassified => 'U',
            Classification::Classified => 'C',
            Classification::Secret => 'S',
            Classification::Other(c) => c,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", char::from(*self))
    }
}

/// Decoded two-line mean element set.
///
/// Angles and rates are kept in the units printed in the element set, conversion
/// to the propagator's internal units happens at initialization.
#[derive(Clone, PartialEq, Debug, Display, Serialize)]
#[display(
    fmt = "{{catalog: {}, epoch: {}, n: {}, e: {}, i: {}, ...}}",
    "catalog_number",
    "epoch",
    "mean_motion",
    "eccentricity",
    "inclination_deg"
)]
pub struct TleElements {
    /// NORAD catalog number, Alpha-5 decoded
    pub catalog_number: u32,
    pub classification: Classification,
    /// Launch year, launch number and piece, e.g. "98067A"
    pub international_designator: String,

    /// Four digit epoch year
    pub epoch_year: i32,
    /// Fractional day of year, 1.0 is Jan 1st 00:00 UTC
    pub epoch_day: f64,
    pub epoch: EpochTime,

    /// First derivative of mean motion divided by two [rev/day^2]
    pub mean_motion_dot: f64,
    /// Second derivative of mean motion divided by six [rev/day^3]
    pub mean_motion_ddot: f64,
    /// Drag term [1/earth radii]
    pub bstar: f64,
    pub ephemeris_type: u8,
    pub element_set_number: u32,

    /// [deg]
    pub inclination_deg: f64,
    /// Right ascension of the ascending node [deg]
    pub raan_deg: f64,
    pub eccentricity: f64,
    /// [deg]
    pub argument_of_perigee_deg: f64,
    /// [deg]
    pub mean_anomaly_deg: f64,
    /// Kozai mean motion [rev/day]
    pub mean_motion: f64,
    pub revolution_number: u32,
}

impl TleElements {
    pub fn period_minutes(&self) -> f64 {
        MINUTES_PER_DAY / self.mean_motion
    }

    /// Coarse check on the published (Kozai) mean motion.
    ///
    /// The propagator makes the authoritative choice after recovering the
    /// Brouwer mean motion, which can differ for orbits right at the boundary.
    pub fn is_deep_space(&self) -> bool {
        self.period_minutes() >= DEEP_SPACE_PERIOD_MINUTES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_chars() {
        assert_eq!(Classification::from('U'), Classification::Unclassified);
        assert_eq!(Classification::from(' '), Classification::Unclassified);
        assert_eq!(Classification::from('S'), Classification::Secret);
        assert_eq!(Classification::from('X'), Classification::Other('X'));
        assert_eq!(char::from(Classification::Classified), 'C');
        assert_eq!(Classification::Other('X').to_string(), "X");
    }
}
