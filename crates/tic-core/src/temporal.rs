//! # Temporal Types — UTC Timestamps, Clocks, Validity Windows
//!
//! Defines `Timestamp`, a UTC-only timestamp truncated to seconds, the
//! `Clock` trait that services use instead of reading the wall clock, and
//! `ValidityWindow`, the half-open `[from, to)` interval every
//! qualification carries.
//!
//! ## Time Injection
//!
//! Rule functions take `now: Timestamp` as an argument. Services that need
//! "now" hold an `Arc<dyn Clock>`: [`SystemClock`] in production,
//! [`FixedClock`] in tests. No code path calls `Utc::now()` except
//! `SystemClock` and [`Timestamp::now()`].
//!
//! ## Day Arithmetic
//!
//! Remaining-days computations use calendar days between the UTC dates of
//! two instants, not elapsed 24-hour periods. A certificate that ends at
//! 00:30 tomorrow has one remaining day at 23:00 today.

use chrono::{DateTime, NaiveDate, TimeDelta, Timelike, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::TicError;

/// A UTC-only timestamp, truncated to seconds precision.
///
/// # Construction
///
/// - [`Timestamp::now()`]: current UTC time, truncated.
/// - [`Timestamp::from_utc()`]: from a `DateTime<Utc>`, truncating sub-seconds.
/// - [`Timestamp::from_date()`]: midnight UTC at the start of a calendar date.
/// - [`Timestamp::parse()`]: from an ISO8601 string, rejecting non-UTC offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp from the current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Midnight UTC at the start of `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.and_time(chrono::NaiveTime::MIN).and_utc())
    }

    /// Parse a timestamp from an RFC 3339 string with the `Z` suffix.
    ///
    /// Explicit offsets, even `+00:00`, are rejected. Use
    /// [`Timestamp::parse_lenient()`] for external data.
    pub fn parse(s: &str) -> Result<Self, TicError> {
        if !s.ends_with('Z') {
            return Err(TicError::Validation(format!(
                "timestamp must use Z suffix (UTC only), got: {s:?}"
            )));
        }
        Self::parse_lenient(s)
    }

    /// Parse an RFC 3339 string with any offset, converting to UTC.
    pub fn parse_lenient(s: &str) -> Result<Self, TicError> {
        let dt = DateTime::parse_from_rfc3339(s).map_err(|e| {
            TicError::Validation(format!("invalid RFC 3339 timestamp {s:?}: {e}"))
        })?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// Parse either a full RFC 3339 timestamp or a bare `YYYY-MM-DD` date
    /// (taken as midnight UTC).
    pub fn parse_date_or_timestamp(s: &str) -> Result<Self, TicError> {
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Ok(Self::from_date(date));
        }
        Self::parse_lenient(s)
    }

    /// Create a timestamp from a Unix epoch timestamp (seconds).
    pub fn from_epoch_secs(secs: i64) -> Result<Self, TicError> {
        let dt = DateTime::from_timestamp(secs, 0)
            .ok_or_else(|| TicError::Validation(format!("invalid Unix timestamp: {secs}")))?;
        Ok(Self(dt))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Returns the Unix epoch timestamp in seconds.
    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// The UTC calendar date of this instant.
    pub fn date(&self) -> NaiveDate {
        self.0.date_naive()
    }

    /// This instant shifted by `days` whole days. Saturates at the
    /// representable range instead of overflowing.
    pub fn plus_days(&self, days: i64) -> Self {
        let shifted = TimeDelta::try_days(days).and_then(|d| self.0.checked_add_signed(d));
        match shifted {
            Some(dt) => Self(dt),
            None if days >= 0 => Self(DateTime::<Utc>::MAX_UTC),
            None => Self(DateTime::<Utc>::MIN_UTC),
        }
    }

    /// Calendar days from `self`'s UTC date to `later`'s UTC date.
    /// Negative when `later` is on an earlier date.
    pub fn days_until(&self, later: Timestamp) -> i64 {
        (later.date() - self.date()).num_days()
    }

    /// Render as ISO8601 with Z suffix (e.g., `2026-01-15T12:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_utc(dt)
    }
}

/// Truncate a `DateTime<Utc>` to seconds precision (discard nanoseconds).
fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of "now" for long-lived services.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Reads the system wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock frozen at a settable instant. Used by tests and by the CLI's
/// `--as-of` flag.
#[derive(Debug)]
pub struct FixedClock {
    now: RwLock<Timestamp>,
}

impl FixedClock {
    pub fn new(now: Timestamp) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    /// Move the clock to `now`.
    pub fn set(&self, now: Timestamp) {
        *self.now.write() = now;
    }

    /// Move the clock forward (or back, for negative values) by whole days.
    pub fn advance_days(&self, days: i64) {
        let mut guard = self.now.write();
        *guard = guard.plus_days(days);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        *self.now.read()
    }
}

// ---------------------------------------------------------------------------
// ValidityWindow
// ---------------------------------------------------------------------------

/// A half-open validity interval `[valid_from, valid_to)`.
///
/// `valid_from < valid_to` holds for every value of this type, including
/// deserialized ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawWindow")]
pub struct ValidityWindow {
    valid_from: Timestamp,
    valid_to: Timestamp,
}

#[derive(Deserialize)]
struct RawWindow {
    valid_from: Timestamp,
    valid_to: Timestamp,
}

impl TryFrom<RawWindow> for ValidityWindow {
    type Error = TicError;

    fn try_from(raw: RawWindow) -> Result<Self, Self::Error> {
        Self::new(raw.valid_from, raw.valid_to)
    }
}

impl ValidityWindow {
    /// Build a window, rejecting `valid_from >= valid_to`.
    pub fn new(valid_from: Timestamp, valid_to: Timestamp) -> Result<Self, TicError> {
        if valid_from >= valid_to {
            return Err(TicError::Validation(format!(
                "valid_from ({valid_from}) must be before valid_to ({valid_to})"
            )));
        }
        Ok(Self {
            valid_from,
            valid_to,
        })
    }

    pub fn valid_from(&self) -> Timestamp {
        self.valid_from
    }

    pub fn valid_to(&self) -> Timestamp {
        self.valid_to
    }

    /// `valid_from <= now < valid_to`.
    pub fn contains(&self, now: Timestamp) -> bool {
        self.valid_from <= now && now < self.valid_to
    }

    /// Whether the window has closed at `now`.
    pub fn has_ended(&self, now: Timestamp) -> bool {
        self.valid_to <= now
    }

    /// Whether `valid_to` falls on or before `now + days`.
    pub fn ends_within(&self, now: Timestamp, days: i64) -> bool {
        self.valid_to <= now.plus_days(days)
    }

    /// Calendar days from `now`'s date to `valid_to`'s date; 0 once the
    /// window has ended.
    pub fn remaining_days(&self, now: Timestamp) -> i64 {
        if self.has_ended(now) {
            0
        } else {
            now.days_until(self.valid_to)
        }
    }

    /// The same window with a new end, re-checking the ordering.
    pub fn with_valid_to(&self, valid_to: Timestamp) -> Result<Self, TicError> {
        Self::new(self.valid_from, valid_to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    #[test]
    fn test_from_utc_truncates() {
        let dt = Utc.with_ymd_and_hms(2026, 1, 15, 12, 30, 45).unwrap();
        let ts = Timestamp::from_utc(dt.with_nanosecond(123_456_789).unwrap());
        assert_eq!(ts.as_datetime().nanosecond(), 0);
        assert_eq!(ts.to_iso8601(), "2026-01-15T12:30:45Z");
    }

    #[test]
    fn test_parse_rejects_offsets() {
        assert!(Timestamp::parse("2026-01-15T12:00:00+00:00").is_err());
        assert!(Timestamp::parse("2026-01-15T12:00:00-04:00").is_err());
        assert!(Timestamp::parse("not-a-date").is_err());
    }

    #[test]
    fn test_parse_lenient_converts_offset() {
        let ts = Timestamp::parse_lenient("2026-01-15T17:00:00+05:00").unwrap();
        assert_eq!(ts.to_iso8601(), "2026-01-15T12:00:00Z");
    }

    #[test]
    fn test_parse_date_or_timestamp() {
        assert_eq!(
            Timestamp::parse_date_or_timestamp("2026-03-01").unwrap(),
            ts("2026-03-01T00:00:00Z")
        );
        assert_eq!(
            Timestamp::parse_date_or_timestamp("2026-03-01T08:00:00Z").unwrap(),
            ts("2026-03-01T08:00:00Z")
        );
        assert!(Timestamp::parse_date_or_timestamp("03/01/2026").is_err());
    }

    #[test]
    fn test_plus_days_and_days_until() {
        let start = ts("2026-01-30T23:00:00Z");
        assert_eq!(start.plus_days(2), ts("2026-02-01T23:00:00Z"));
        assert_eq!(start.days_until(ts("2026-01-31T00:30:00Z")), 1);
        assert_eq!(start.days_until(ts("2026-01-29T12:00:00Z")), -1);
    }

    #[test]
    fn test_plus_days_saturates() {
        let far = ts("2026-01-01T00:00:00Z").plus_days(i64::MAX);
        assert_eq!(*far.as_datetime(), DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn test_fixed_clock_set_and_advance() {
        let clock = FixedClock::new(ts("2026-01-01T09:00:00Z"));
        assert_eq!(clock.now(), ts("2026-01-01T09:00:00Z"));
        clock.advance_days(10);
        assert_eq!(clock.now(), ts("2026-01-11T09:00:00Z"));
        clock.set(ts("2025-06-01T00:00:00Z"));
        assert_eq!(clock.now(), ts("2025-06-01T00:00:00Z"));
    }

    #[test]
    fn test_window_rejects_inverted_and_empty() {
        let a = ts("2026-01-01T00:00:00Z");
        let b = ts("2026-02-01T00:00:00Z");
        assert!(ValidityWindow::new(b, a).is_err());
        assert!(ValidityWindow::new(a, a).is_err());
        assert!(ValidityWindow::new(a, b).is_ok());
    }

    #[test]
    fn test_window_is_half_open() {
        let from = ts("2026-01-01T00:00:00Z");
        let to = ts("2026-12-31T00:00:00Z");
        let w = ValidityWindow::new(from, to).unwrap();
        assert!(w.contains(from));
        assert!(!w.contains(to));
        assert!(!w.contains(ts("2025-12-31T23:59:59Z")));
    }

    #[test]
    fn test_remaining_days() {
        let now = ts("2026-05-10T15:00:00Z");
        let w = ValidityWindow::new(now.plus_days(-30), now.plus_days(15)).unwrap();
        assert_eq!(w.remaining_days(now), 15);
        assert_eq!(w.remaining_days(now.plus_days(15)), 0);
        assert_eq!(w.remaining_days(now.plus_days(40)), 0);
    }

    #[test]
    fn test_ends_within() {
        let now = ts("2026-05-10T00:00:00Z");
        let w = ValidityWindow::new(now.plus_days(-1), now.plus_days(30)).unwrap();
        assert!(w.ends_within(now, 30));
        assert!(!w.ends_within(now, 29));
    }

    #[test]
    fn test_window_deserialize_enforces_order() {
        let ok = r#"{"valid_from":"2026-01-01T00:00:00Z","valid_to":"2027-01-01T00:00:00Z"}"#;
        let bad = r#"{"valid_from":"2027-01-01T00:00:00Z","valid_to":"2026-01-01T00:00:00Z"}"#;
        let w: ValidityWindow = serde_json::from_str(ok).unwrap();
        assert_eq!(w.valid_to(), ts("2027-01-01T00:00:00Z"));
        assert!(serde_json::from_str::<ValidityWindow>(bad).is_err());
    }

    #[test]
    fn test_serde_roundtrip() {
        let t = ts("2026-01-15T12:00:00Z");
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, "\"2026-01-15T12:00:00Z\"");
        let parsed: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(t, parsed);
    }
}
