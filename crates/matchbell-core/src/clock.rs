//! Server-corrected clock and start-time handling.
//!
//! Upstream feeds report competition start times either as ISO-8601
//! strings or as Unix seconds. The local clock is never trusted directly:
//! a signed millisecond correction (server minus local) must be set before
//! any remaining-time computation.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ClockError;

/// Start instant of a competition as reported by the upstream feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StartTime {
    /// ISO-8601 timestamp, e.g. `"2026-08-06T18:35:00Z"`.
    Iso(String),
    /// Unix seconds, fractional part allowed.
    UnixSeconds(f64),
}

impl StartTime {
    /// Interpret a loosely typed JSON value as a start time.
    ///
    /// Anything other than a string or a number is rejected with
    /// [`ClockError::UnsupportedStartTime`]. `null` is rejected too:
    /// callers model "no longer relevant" as the absence of a start time,
    /// not as a start-time value.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, ClockError> {
        match value {
            serde_json::Value::String(s) => Ok(Self::Iso(s.clone())),
            serde_json::Value::Number(n) => n
                .as_f64()
                .map(Self::UnixSeconds)
                .ok_or(ClockError::UnsupportedStartTime("number")),
            other => Err(ClockError::UnsupportedStartTime(json_type_name(other))),
        }
    }

    /// Absolute instant in milliseconds since the Unix epoch.
    pub fn epoch_ms(&self) -> Result<i64, ClockError> {
        match self {
            StartTime::Iso(s) => parse_iso_ms(s),
            StartTime::UnixSeconds(secs) => Ok((secs * 1000.0).round() as i64),
        }
    }
}

fn parse_iso_ms(s: &str) -> Result<i64, ClockError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.timestamp_millis());
    }
    // Some feeds omit the offset; treat a bare timestamp as UTC.
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .map(|naive| naive.and_utc().timestamp_millis())
        .map_err(|_| ClockError::InvalidTimestamp(s.to_string()))
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Local wall clock plus a signed correction approximating the server clock.
#[derive(Debug, Clone)]
pub struct SyncedClock {
    correction_ms: Option<i64>,
    now_ms: fn() -> i64,
}

impl SyncedClock {
    pub fn new() -> Self {
        Self {
            correction_ms: None,
            now_ms: system_now_ms,
        }
    }

    /// Clock with an injected time source. Production code uses [`new`];
    /// tests pin the local clock to a fixed instant.
    ///
    /// [`new`]: SyncedClock::new
    pub fn with_time_source(now_ms: fn() -> i64) -> Self {
        Self {
            correction_ms: None,
            now_ms,
        }
    }

    /// Set the correction: server time minus local time, in milliseconds.
    pub fn set_correction(&mut self, offset_ms: i64) {
        self.correction_ms = Some(offset_ms);
    }

    pub fn correction(&self) -> Option<i64> {
        self.correction_ms
    }

    pub fn ensure_synced(&self) -> Result<(), ClockError> {
        if self.correction_ms.is_none() {
            return Err(ClockError::NotSynced);
        }
        Ok(())
    }

    /// Current server-corrected time in milliseconds since the epoch.
    pub fn now_corrected_ms(&self) -> Result<i64, ClockError> {
        let correction = self.correction_ms.ok_or(ClockError::NotSynced)?;
        Ok((self.now_ms)() + correction)
    }

    /// Whole seconds until `start`, rounded to the nearest second and
    /// clamped at zero once the instant has passed.
    pub fn remaining_secs(&self, start: &StartTime) -> Result<u64, ClockError> {
        let now = self.now_corrected_ms()?;
        let diff = start.epoch_ms()? - now;
        if diff > 0 {
            Ok((diff as f64 / 1000.0).round() as u64)
        } else {
            Ok(0)
        }
    }
}

impl Default for SyncedClock {
    fn default() -> Self {
        Self::new()
    }
}

fn system_now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
