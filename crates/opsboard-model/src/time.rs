//! Clock abstraction and calendar helpers
//!
//! The store never reads the system time directly; it asks an injected
//! [`Clock`]. Tests pin time with [`FixedClock`].

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use parking_lot::Mutex;

/// Milliseconds in one week bucket
pub const WEEK_MILLIS: i64 = 7 * 24 * 60 * 60 * 1000;

/// Days after creation before the email notification for a joiner unlocks
pub const EMAIL_UNLOCK_DAYS: i64 = 3;

/// Source of the current instant
pub trait Clock: Send + Sync {
    /// Current UTC instant
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock
#[derive(Debug)]
pub struct FixedClock {
    instant: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    /// Clock frozen at `instant`
    #[must_use]
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self {
            instant: Mutex::new(instant),
        }
    }

    /// Jump to `instant`
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.instant.lock() = instant;
    }

    /// Move forward by `by`
    pub fn advance(&self, by: Duration) {
        let mut guard = self.instant.lock();
        *guard += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.instant.lock()
    }
}

/// Elapsed-week bucket `(week, year)` for `instant`
///
/// `week = ceil((instant - Jan 1 00:00 UTC) / 7 days)`. This is neither the
/// ISO week nor Monday-aligned: buckets start on whatever weekday January 1st
/// falls on, and the first instant of the year lands in week 0.
#[must_use]
pub fn week_bucket(instant: DateTime<Utc>) -> (u32, i32) {
    let year = instant.year();
    let Some(start) = NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
    else {
        return (0, year);
    };

    let elapsed = (instant - start).num_milliseconds().max(0);
    let week = (elapsed + WEEK_MILLIS - 1) / WEEK_MILLIS;
    (u32::try_from(week).unwrap_or_default(), year)
}

/// Parse a stored record date
///
/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates (midnight UTC).
#[must_use]
pub fn parse_record_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Whether the email notification may be sent for a record created at
/// `creation_date`
///
/// Only consumers enforce this. Unparseable dates never block the toggle.
#[must_use]
pub fn email_notification_unlocked(creation_date: &str, now: DateTime<Utc>) -> bool {
    match parse_record_date(creation_date) {
        Some(created) => now >= created + Duration::days(EMAIL_UNLOCK_DAYS),
        None => true,
    }
}

/// Render an instant the way records store creation dates
#[inline]
#[must_use]
pub fn format_record_date(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn first_instant_of_year_is_week_zero() {
        assert_eq!(week_bucket(at(2025, 1, 1, 0, 0, 0)), (0, 2025));
    }

    #[test]
    fn first_seven_days_are_week_one() {
        assert_eq!(week_bucket(at(2025, 1, 1, 0, 0, 1)), (1, 2025));
        assert_eq!(week_bucket(at(2025, 1, 7, 23, 59, 59)), (1, 2025));
        assert_eq!(week_bucket(at(2025, 1, 8, 0, 0, 0)), (1, 2025));
        assert_eq!(week_bucket(at(2025, 1, 8, 0, 0, 1)), (2, 2025));
    }

    #[test]
    fn buckets_are_not_monday_aligned() {
        // 2025-01-06 is a Monday but still shares a bucket with the Sunday before.
        assert_eq!(
            week_bucket(at(2025, 1, 5, 12, 0, 0)),
            week_bucket(at(2025, 1, 6, 12, 0, 0))
        );
    }

    #[test]
    fn year_end_lands_in_week_fifty_three() {
        assert_eq!(week_bucket(at(2025, 12, 31, 12, 0, 0)), (53, 2025));
        assert_eq!(week_bucket(at(2026, 1, 1, 12, 0, 0)), (1, 2026));
    }

    #[test]
    fn email_unlocks_after_three_days() {
        let created = "2025-03-01T10:00:00.000Z";
        assert!(!email_notification_unlocked(created, at(2025, 3, 4, 9, 59, 59)));
        assert!(email_notification_unlocked(created, at(2025, 3, 4, 10, 0, 0)));
    }

    #[test]
    fn email_unlock_accepts_bare_dates_and_garbage() {
        assert!(!email_notification_unlocked("2025-03-01", at(2025, 3, 2, 0, 0, 0)));
        assert!(email_notification_unlocked("2025-03-01", at(2025, 3, 4, 0, 0, 0)));
        assert!(email_notification_unlocked("not a date", at(2000, 1, 1, 0, 0, 0)));
    }

    #[test]
    fn fixed_clock_advances() {
        let clock = FixedClock::new(at(2025, 1, 1, 0, 0, 0));
        clock.advance(Duration::days(8));
        assert_eq!(clock.now(), at(2025, 1, 9, 0, 0, 0));
        clock.set(at(2030, 6, 1, 0, 0, 0));
        assert_eq!(clock.now().year(), 2030);
    }

    proptest::proptest! {
        #[test]
        fn week_bucket_stays_in_range_and_is_monotonic(
            secs in 0i64..(366 * 24 * 3600),
            step in 0i64..(30 * 24 * 3600),
        ) {
            let start = at(2024, 1, 1, 0, 0, 0);
            let a = start + Duration::seconds(secs);
            let b = a + Duration::seconds(step);
            let (wa, ya) = week_bucket(a);
            let (wb, yb) = week_bucket(b);
            proptest::prop_assert!(wa <= 53);
            if ya == yb {
                proptest::prop_assert!(wa <= wb);
            }
        }
    }

    #[test]
    fn record_dates_format_as_rfc3339() {
        let formatted = format_record_date(at(2025, 5, 15, 8, 30, 0));
        assert_eq!(formatted, "2025-05-15T08:30:00.000Z");
        assert_eq!(parse_record_date(&formatted), Some(at(2025, 5, 15, 8, 30, 0)));
    }
}
