//! Timestamp parsing and job duration rendering.
//!
//! The feed stores timestamps as text. Durations are rendered as zero-padded
//! `HH:MM:SS` where the hour field is unbounded, so a span of two days and one
//! hour renders as `49:00:00`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Naive layouts accepted after RFC 3339 fails. `%.f` also matches an absent fraction.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M",
];

const UNAVAILABLE: &str = "unavailable";

/// Error raised when a timestamp string cannot be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimestampError {
    #[error("unrecognized timestamp '{0}'")]
    Unrecognized(String),
}

impl TimestampError {
    /// The offending input.
    pub fn value(&self) -> &str {
        match self {
            Self::Unrecognized(value) => value,
        }
    }
}

/// A parsed feed timestamp, with its offset when the text carried one.
#[derive(Debug, Clone, Copy)]
enum Moment {
    Aware(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
}

impl Moment {
    fn parse(value: &str) -> Result<Self, TimestampError> {
        let trimmed = value.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(Self::Aware(dt));
        }

        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
            .map(Self::Naive)
            .ok_or_else(|| TimestampError::Unrecognized(value.to_string()))
    }

    fn wall_clock(&self) -> NaiveDateTime {
        match self {
            Self::Aware(dt) => dt.naive_local(),
            Self::Naive(dt) => *dt,
        }
    }
}

/// Parse a feed timestamp into a wall-clock date-time.
///
/// An RFC 3339 offset is dropped and the local reading kept, so
/// `2024-03-01T08:00:00+08:00` and `2024-03-01 08:00:00` are the same value.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, TimestampError> {
    Moment::parse(value).map(|moment| moment.wall_clock())
}

/// Elapsed time between two timestamps, clamped at zero.
///
/// When both sides carry an offset the span is exact across zones. Otherwise
/// both sides are compared as wall-clock readings.
pub fn compute_duration(start: &str, end: &str) -> Result<TimeDelta, TimestampError> {
    let start = Moment::parse(start)?;
    let end = Moment::parse(end)?;
    let delta = match (start, end) {
        (Moment::Aware(start), Moment::Aware(end)) => end - start,
        (start, end) => end.wall_clock() - start.wall_clock(),
    };

    if delta <= TimeDelta::zero() {
        Ok(TimeDelta::zero())
    } else {
        Ok(delta)
    }
}

/// Render a span as `HH:MM:SS`. Sub-second precision is truncated.
pub fn format_hms(delta: TimeDelta) -> String {
    let total = delta.num_seconds().max(0);
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

/// Computed duration attached to a job record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobDuration {
    /// Non-negative elapsed span.
    Elapsed(TimeDelta),
    /// At least one of the timestamps could not be parsed.
    Unavailable,
}

impl JobDuration {
    /// Duration between two feed timestamps.
    pub fn between(start: &str, end: &str) -> Result<Self, TimestampError> {
        compute_duration(start, end).map(Self::Elapsed)
    }

    /// Whole seconds, or `None` when unavailable.
    pub fn as_seconds(&self) -> Option<i64> {
        match self {
            Self::Elapsed(delta) => Some(delta.num_seconds()),
            Self::Unavailable => None,
        }
    }
}

impl fmt::Display for JobDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Elapsed(delta) => f.write_str(&format_hms(*delta)),
            Self::Unavailable => f.write_str(UNAVAILABLE),
        }
    }
}

impl FromStr for JobDuration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == UNAVAILABLE {
            return Ok(Self::Unavailable);
        }

        let parts: Vec<&str> = s.split(':').collect();
        let [hours, minutes, seconds] = parts.as_slice() else {
            return Err(format!("Invalid duration: {}", s));
        };

        let parse = |part: &str| {
            part.parse::<i64>()
                .map_err(|_| format!("Invalid duration: {}", s))
        };
        let (h, m, sec) = (parse(*hours)?, parse(*minutes)?, parse(*seconds)?);
        if h < 0 || !(0..60).contains(&m) || !(0..60).contains(&sec) {
            return Err(format!("Invalid duration: {}", s));
        }

        h.checked_mul(3600)
            .and_then(|total| total.checked_add(m * 60 + sec))
            .and_then(TimeDelta::try_seconds)
            .map(Self::Elapsed)
            .ok_or_else(|| format!("Invalid duration: {}", s))
    }
}

impl Serialize for JobDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for JobDuration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
