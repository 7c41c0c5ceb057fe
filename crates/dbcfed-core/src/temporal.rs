//! # Temporal Types — UTC-Only Timestamps and Injected Clocks
//!
//! Defines `Timestamp`, a UTC-only timestamp truncated to seconds, and the
//! `Clock` trait through which "now" enters the system.
//!
//! ## Invariant
//!
//! Epoch boundaries are signed as Unix seconds. Sub-second components would
//! survive in JSON but vanish from the signed encoding, so they are discarded
//! at construction and rejected outright when deserializing.
//!
//! ## Injected Time
//!
//! Epoch selection ("which epoch is current", "is the last epoch still in the
//! future") depends on the present moment. Core operations take a `Timestamp`
//! argument; only the CLI reads [`SystemClock`]. Tests use [`FixedClock`].

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::TemporalError;

/// A UTC-only timestamp, truncated to seconds precision.
///
/// Serializes as RFC 3339 with `Z` suffix, e.g. `2026-01-15T12:00:00Z`, and
/// deserializes only that form (see [`Timestamp::parse_exact`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp from a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse a timestamp from an RFC 3339 string.
    ///
    /// **Rejects non-UTC inputs.** Only the `Z` suffix is accepted.
    pub fn parse(s: &str) -> Result<Self, TemporalError> {
        Ok(Self(truncate_to_seconds(parse_utc(s)?)))
    }

    /// Parse like [`Self::parse`], but reject sub-second components instead
    /// of truncating them. Stored artifacts go through this path.
    pub fn parse_exact(s: &str) -> Result<Self, TemporalError> {
        let dt = parse_utc(s)?;
        if dt.nanosecond() != 0 {
            return Err(TemporalError::Invalid {
                input: s.to_string(),
                reason: "sub-second precision is not allowed".to_string(),
            });
        }
        Ok(Self(dt))
    }

    /// Create a timestamp from Unix seconds.
    pub fn from_epoch_secs(secs: i64) -> Result<Self, TemporalError> {
        DateTime::from_timestamp(secs, 0)
            .map(Self)
            .ok_or_else(|| TemporalError::Invalid {
                input: secs.to_string(),
                reason: "out of range Unix timestamp".to_string(),
            })
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Unix seconds, the form used in canonical encodings.
    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// This timestamp shifted forward by `period`.
    pub fn checked_add(&self, period: Duration) -> Result<Self, TemporalError> {
        self.0
            .checked_add_signed(period)
            .map(Self::from_utc)
            .ok_or(TemporalError::Overflow)
    }

    /// Render as ISO8601 with Z suffix.
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse_exact(&s).map_err(serde::de::Error::custom)
    }
}

fn parse_utc(s: &str) -> Result<DateTime<Utc>, TemporalError> {
    if !s.ends_with('Z') {
        return Err(TemporalError::Invalid {
            input: s.to_string(),
            reason: "timestamp must use Z suffix (UTC only)".to_string(),
        });
    }
    let dt = DateTime::parse_from_rfc3339(s).map_err(|e| TemporalError::Invalid {
        input: s.to_string(),
        reason: e.to_string(),
    })?;
    Ok(dt.with_timezone(&Utc))
}

fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

// ─── Clocks ──────────────────────────────────────────────────────────

/// Source of the present moment.
pub trait Clock {
    /// The current time.
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_utc(Utc::now())
    }
}

/// A clock frozen at a chosen instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub Timestamp);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_from_utc_truncates() {
        let dt = Utc.with_ymd_and_hms(2026, 1, 15, 12, 30, 45).unwrap();
        let ts = Timestamp::from_utc(dt.with_nanosecond(123_456_789).unwrap());
        assert_eq!(ts.as_datetime().nanosecond(), 0);
        assert_eq!(ts.to_iso8601(), "2026-01-15T12:30:45Z");
    }

    #[test]
    fn test_parse_z_suffix_accepted() {
        let ts = Timestamp::parse("2026-01-15T12:00:00Z").unwrap();
        assert_eq!(ts.to_string(), "2026-01-15T12:00:00Z");
    }

    #[test]
    fn test_parse_offsets_rejected() {
        assert!(Timestamp::parse("2026-01-15T12:00:00+00:00").is_err());
        assert!(Timestamp::parse("2026-01-15T17:00:00+05:00").is_err());
        assert!(Timestamp::parse("not-a-date").is_err());
        assert!(Timestamp::parse("").is_err());
    }

    #[test]
    fn test_parse_subseconds_truncated() {
        let ts = Timestamp::parse("2026-01-15T12:00:00.999Z").unwrap();
        assert_eq!(ts.to_iso8601(), "2026-01-15T12:00:00Z");
    }

    #[test]
    fn test_epoch_roundtrip() {
        let ts = Timestamp::parse("2026-01-15T12:00:00Z").unwrap();
        assert_eq!(Timestamp::from_epoch_secs(ts.epoch_secs()).unwrap(), ts);
    }

    #[test]
    fn test_checked_add() {
        let ts = Timestamp::parse("2026-01-01T00:00:00Z").unwrap();
        let later = ts.checked_add(Duration::days(30)).unwrap();
        assert_eq!(later.to_iso8601(), "2026-01-31T00:00:00Z");
        assert!(ts < later);
    }

    #[test]
    fn test_serde_uses_z_suffix() {
        let ts = Timestamp::parse("2026-01-15T12:00:00Z").unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "\"2026-01-15T12:00:00Z\"");
        let parsed: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ts);
    }

    #[test]
    fn test_deserialize_rejects_subseconds_and_offsets() {
        for bad in [
            "\"2026-03-02T00:00:00.750Z\"",
            "\"2026-01-01T05:00:00+05:00\"",
            "\"2026-01-01T00:00:00+00:00\"",
            "\"2026-01-01\"",
        ] {
            assert!(serde_json::from_str::<Timestamp>(bad).is_err(), "{bad}");
        }
        assert!(serde_json::from_str::<Timestamp>("1767225600").is_err());
    }

    #[test]
    fn test_parse_exact() {
        assert!(Timestamp::parse_exact("2026-01-15T12:00:00Z").is_ok());
        assert!(matches!(
            Timestamp::parse_exact("2026-01-15T12:00:00.001Z"),
            Err(TemporalError::Invalid { .. })
        ));
    }

    #[test]
    fn test_fixed_clock() {
        let ts = Timestamp::parse("2026-03-01T00:00:00Z").unwrap();
        let clock = FixedClock(ts);
        assert_eq!(clock.now(), ts);
    }

    #[test]
    fn test_system_clock_has_no_subseconds() {
        assert_eq!(SystemClock.now().as_datetime().nanosecond(), 0);
    }
}
