use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, ops};

pub type UtcTimestamp = DateTime<Utc>;

/// Julian date of 1970-01-01T00:00:00Z
pub const JD_UNIX_EPOCH: f64 = 2440587.5;
pub const SECONDS_PER_DAY: f64 = 86400.0;
pub const MINUTES_PER_DAY: f64 = 1440.0;

const NANOS_PER_MINUTE: f64 = 60.0e9;

/// An absolute instant on the UTC time scale.
///
/// Element set epochs and propagation targets are both expressed with this type,
/// the propagator only ever needs the signed distance between two of them and
/// the Julian date of the target for sidereal time.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EpochTime(UtcTimestamp);

impl EpochTime {
    pub fn from_utc(utc: UtcTimestamp) -> Self {
        EpochTime(utc)
    }

    pub fn now() -> Self {
        EpochTime(Utc::now())
    }

    pub fn as_utc(&self) -> UtcTimestamp {
        self.0
    }

    /// Builds the instant from a four-digit year and a fractional day of year,
    /// where 1.0 is January 1st 00:00 UTC (the TLE epoch convention).
    ///
    /// Returns `None` when the day is outside [1, 367) or the year is not representable.
    pub fn from_year_and_day(year: i32, day: f64) -> Option<Self> {
        if !day.is_finite() || !(1.0..367.0).contains(&day) {
            return None;
        }
        let jan1 = Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single()?;
        let nanos = ((day - 1.0) * SECONDS_PER_DAY * 1.0e9).round() as i64;
        jan1.checked_add_signed(Duration::nanoseconds(nanos))
            .map(EpochTime)
    }

    /// Returns `None` for non-finite dates or dates outside chrono's range
    pub fn from_julian_date(jd: f64) -> Option<Self> {
        if !jd.is_finite() {
            return None;
        }
        let seconds = (jd - JD_UNIX_EPOCH) * SECONDS_PER_DAY;
        let whole = seconds.floor();
        let mut secs = whole as i64;
        let mut nanos = ((seconds - whole) * 1.0e9).round() as u32;
        if nanos >= 1_000_000_000 {
            secs += 1;
            nanos -= 1_000_000_000;
        }
        Utc.timestamp_opt(secs, nanos).single().map(EpochTime)
    }

    /// Julian date, UTC time scale
    pub fn julian_date(&self) -> f64 {
        let seconds = self.0.timestamp() as f64 + f64::from(self.0.timestamp_subsec_nanos()) * 1.0e-9;
        JD_UNIX_EPOCH + seconds / SECONDS_PER_DAY
    }

    /// Signed minutes from `earlier` to `self`, negative when `self` precedes it
    pub fn minutes_since(&self, earlier: &EpochTime) -> f64 {
        let delta = self.0 - earlier.0;
        match delta.num_nanoseconds() {
            Some(nanos) => nanos as f64 / NANOS_PER_MINUTE,
            // Beyond ~292 years; millisecond resolution is plenty out there
            None => delta.num_milliseconds() as f64 / 60.0e3,
        }
    }

    pub fn days_since(&self, earlier: &EpochTime) -> f64 {
        self.minutes_since(earlier) / MINUTES_PER_DAY
    }

    /// Seconds since the Unix epoch, with sub-second fraction
    pub fn unix_seconds(&self) -> f64 {
        self.0.timestamp() as f64 + f64::from(self.0.timestamp_subsec_nanos()) * 1.0e-9
    }
}

impl From<UtcTimestamp> for EpochTime {
    fn from(utc: UtcTimestamp) -> Self {
        EpochTime(utc)
    }
}

impl ops::Add<Duration> for EpochTime {
    type Output = EpochTime;

    fn add(self, rhs: Duration) -> Self::Output {
        EpochTime(self.0 + rhs)
    }
}

impl ops::Sub<Duration> for EpochTime {
    type Output = EpochTime;

    fn sub(self, rhs: Duration) -> Self::Output {
        EpochTime(self.0 - rhs)
    }
}

impl ops::Sub for EpochTime {
    type Output = Duration;

    fn sub(self, rhs: EpochTime) -> Self::Output {
        self.0 - rhs.0
    }
}

impl fmt::Display for EpochTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M:%S%.6fZ"))
    }
}
