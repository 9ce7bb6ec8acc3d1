//! Date arithmetic, parsing and formatting for task schedules.
//!
//! # Responsibility
//! - Advance due dates according to a `Recurrence` rule.
//! - Format due dates for display and parse due-date input.
//! - Provide the clock abstraction used by store and views.
//!
//! # Invariants
//! - All calendar arithmetic happens in UTC.
//! - Monthly advance keeps the day-of-month, clamped to the target month's
//!   last day; it never yields an invalid date.

use crate::model::task::{EpochMs, Recurrence};
use chrono::{DateTime, Days, Months, NaiveDate, Utc};
use std::cell::Cell;
use std::rc::Rc;

const DUE_DATE_FORMAT: &str = "%b %-d, %Y";

/// Source of "now" for creation timestamps and overdue checks.
pub trait Clock {
    fn now_ms(&self) -> EpochMs;
}

/// Wall clock in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> EpochMs {
        Utc::now().timestamp_millis()
    }
}

/// Manually driven clock. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<EpochMs>>,
}

impl ManualClock {
    pub fn new(now: EpochMs) -> Self {
        Self {
            now: Rc::new(Cell::new(now)),
        }
    }

    pub fn set(&self, now: EpochMs) {
        self.now.set(now);
    }

    pub fn advance(&self, millis: i64) {
        self.now.set(self.now.get().saturating_add(millis));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> EpochMs {
        self.now.get()
    }
}

/// Computes the next due date for a recurring task.
///
/// Returns `None` for `Recurrence::None` and when the anchor or result falls
/// outside the representable calendar range.
pub fn next_due_date(due_date: EpochMs, recurrence: Recurrence) -> Option<EpochMs> {
    let anchor = DateTime::<Utc>::from_timestamp_millis(due_date)?;
    let next = match recurrence {
        Recurrence::None => return None,
        Recurrence::Daily => anchor.checked_add_days(Days::new(1))?,
        Recurrence::Weekly => anchor.checked_add_days(Days::new(7))?,
        Recurrence::Monthly => anchor.checked_add_months(Months::new(1))?,
    };
    Some(next.timestamp_millis())
}

/// Renders a due date as `Due: Mon D, YYYY`.
pub fn format_due_date(due_date: Option<EpochMs>) -> Option<String> {
    let due = DateTime::<Utc>::from_timestamp_millis(due_date?)?;
    Some(format!("Due: {}", due.format(DUE_DATE_FORMAT)))
}

/// Parses due-date input.
///
/// Accepts `YYYY-MM-DD` (midnight UTC) or an RFC 3339 timestamp. Blank input
/// means "no due date" and yields `Ok(None)`.
///
/// # Errors
/// Returns the offending input when it matches neither format.
pub fn parse_due_date(input: &str) -> Result<Option<EpochMs>, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    parse_timestamp(trimmed)
        .map(Some)
        .ok_or_else(|| format!("unrecognized date `{trimmed}`; expected YYYY-MM-DD or RFC 3339"))
}

pub(crate) fn parse_timestamp(value: &str) -> Option<EpochMs> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|midnight| midnight.and_utc().timestamp_millis());
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|parsed| parsed.timestamp_millis())
}

/// Epoch milliseconds for midnight UTC of the given calendar day.
pub fn ymd_ms(year: i32, month: u32, day: u32) -> Option<EpochMs> {
    NaiveDate::from_ymd_opt(year, month, day)?
        .and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::{
        format_due_date, next_due_date, parse_due_date, ymd_ms, Clock, ManualClock,
    };
    use crate::model::task::Recurrence;

    fn day(year: i32, month: u32, day: u32) -> i64 {
        ymd_ms(year, month, day).expect("valid calendar day")
    }

    #[test]
    fn daily_and_weekly_add_fixed_days() {
        let anchor = day(2024, 2, 28);
        assert_eq!(next_due_date(anchor, Recurrence::Daily), Some(day(2024, 2, 29)));
        assert_eq!(next_due_date(anchor, Recurrence::Weekly), Some(day(2024, 3, 6)));
    }

    #[test]
    fn monthly_clamps_to_end_of_month() {
        assert_eq!(
            next_due_date(day(2024, 1, 31), Recurrence::Monthly),
            Some(day(2024, 2, 29))
        );
        assert_eq!(
            next_due_date(day(2023, 1, 31), Recurrence::Monthly),
            Some(day(2023, 2, 28))
        );
        assert_eq!(
            next_due_date(day(2024, 12, 15), Recurrence::Monthly),
            Some(day(2025, 1, 15))
        );
    }

    #[test]
    fn none_never_advances() {
        assert_eq!(next_due_date(day(2024, 1, 1), Recurrence::None), None);
    }

    #[test]
    fn monthly_keeps_time_of_day() {
        let anchor = day(2024, 3, 31) + 15 * 3_600_000;
        let next = next_due_date(anchor, Recurrence::Monthly).unwrap();
        assert_eq!(next, day(2024, 4, 30) + 15 * 3_600_000);
    }

    #[test]
    fn format_uses_short_month_and_unpadded_day() {
        assert_eq!(
            format_due_date(Some(day(2024, 1, 5))).as_deref(),
            Some("Due: Jan 5, 2024")
        );
        assert_eq!(format_due_date(None), None);
    }

    #[test]
    fn parse_accepts_dates_and_rfc3339() {
        assert_eq!(parse_due_date("2024-01-31"), Ok(Some(day(2024, 1, 31))));
        assert_eq!(
            parse_due_date("2024-01-31T02:00:00+02:00"),
            Ok(Some(day(2024, 1, 31)))
        );
        assert_eq!(parse_due_date("   "), Ok(None));
        assert!(parse_due_date("31/01/2024").is_err());
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new(10);
        let shared = clock.clone();
        clock.advance(5);
        assert_eq!(shared.now_ms(), 15);
    }
}
