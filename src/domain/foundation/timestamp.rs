//! Timestamp value object for event times at second precision.

use chrono::{NaiveDate, NaiveDateTime, SubsecRound, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Wire pattern: `yyyy-MM-ddTHH:mm:ss`, no fraction, no offset.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Length of every string that matches [`TIMESTAMP_FORMAT`].
const TIMESTAMP_LEN: usize = 19;

/// Error returned when a string is not a wire timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampParseError {
    /// Wrong length, unpadded fields, or trailing text.
    #[error("expected yyyy-MM-ddTHH:mm:ss")]
    Malformed,

    /// Right shape but not a real date-time.
    #[error(transparent)]
    Invalid(#[from] chrono::ParseError),
}

/// Local date-time with whole-second precision.
///
/// Sub-second components are dropped on construction, so a timestamp
/// always survives a trip through its string form unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    /// Creates a timestamp for the current moment (UTC wall clock).
    pub fn now() -> Self {
        Self::from_datetime(Utc::now().naive_utc())
    }

    /// Creates a timestamp from a NaiveDateTime, truncating to seconds.
    pub fn from_datetime(dt: NaiveDateTime) -> Self {
        Self(dt.trunc_subsecs(0))
    }

    /// Creates a timestamp from calendar parts.
    ///
    /// Returns `None` if the parts do not name a valid date-time.
    pub fn from_ymd_hms(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        min: u32,
        sec: u32,
    ) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day)?
            .and_hms_opt(hour, min, sec)
            .map(Self)
    }

    /// Parses the wire representation.
    ///
    /// Every field must be zero-padded to its full width.
    pub fn parse(s: &str) -> Result<Self, TimestampParseError> {
        if s.len() != TIMESTAMP_LEN {
            return Err(TimestampParseError::Malformed);
        }
        let ts = Self(NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)?);
        if ts.to_string() != s {
            return Err(TimestampParseError::Malformed);
        }
        Ok(ts)
    }

    /// Returns the inner NaiveDateTime.
    pub fn as_datetime(&self) -> &NaiveDateTime {
        &self.0
    }

    /// Checks if this timestamp is before another.
    pub fn is_before(&self, other: &Timestamp) -> bool {
        self.0 < other.0
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIMESTAMP_FORMAT))
    }
}

impl FromStr for Timestamp {
    type Err = TimestampParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Timestamp::parse(&raw).map_err(|e| {
            de::Error::custom(format!(
                "timestamp '{}' does not match yyyy-MM-ddTHH:mm:ss: {}",
                raw, e
            ))
        })
    }
}
