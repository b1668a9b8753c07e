//! Whole-month durations between item dates.
//!
//! # Invariants
//! - `months_between` never returns less than 1, including for reversed or
//!   missing ranges.
//! - Month arithmetic clamps to the last day of the target month.

use chrono::{Datelike, Months, NaiveDate};

/// Upper bound applied to months shown on charts (30 years).
pub const MAX_DISPLAY_MONTHS: u32 = 360;

/// Calendar-aware whole months from `start` to `end`, rounded up.
///
/// Missing dates yield the single-month placeholder `1`. An `end` before
/// `start` also yields `1`; existing displays rely on that clamp.
pub fn months_between(start: Option<NaiveDate>, end: Option<NaiveDate>) -> u32 {
    let (Some(start), Some(end)) = (start, end) else {
        return 1;
    };
    if end <= start {
        return 1;
    }

    let raw = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
    let mut full = u32::try_from(raw).unwrap_or(0);
    let mut anchor = start.checked_add_months(Months::new(full));
    if anchor.is_some_and(|anchor| anchor > end) {
        full = full.saturating_sub(1);
        anchor = start.checked_add_months(Months::new(full));
    }

    let has_remainder = anchor.is_some_and(|anchor| end > anchor);
    let total = if has_remainder { full + 1 } else { full };
    total.max(1)
}

/// Months clipped to `[1, MAX_DISPLAY_MONTHS]` for display.
pub fn display_months(months: u32) -> u32 {
    months.clamp(1, MAX_DISPLAY_MONTHS)
}

/// Moves `date` by `months` (negative moves backwards).
///
/// Returns `date` unchanged if the result would be out of range.
pub fn shift_months(date: NaiveDate, months: i32) -> NaiveDate {
    let amount = Months::new(months.unsigned_abs());
    let shifted = if months >= 0 {
        date.checked_add_months(amount)
    } else {
        date.checked_sub_months(amount)
    };
    shifted.unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::{display_months, months_between, shift_months};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn partial_month_rounds_up() {
        assert_eq!(months_between(date(2025, 1, 1), date(2025, 3, 15)), 3);
        assert_eq!(months_between(date(2025, 1, 1), date(2025, 1, 10)), 1);
        assert_eq!(months_between(date(2025, 1, 15), date(2025, 2, 10)), 1);
    }

    #[test]
    fn exact_months_do_not_round_up() {
        assert_eq!(months_between(date(2025, 1, 1), date(2025, 3, 1)), 2);
        assert_eq!(months_between(date(2025, 1, 31), date(2025, 2, 28)), 1);
        assert_eq!(months_between(date(2024, 6, 1), date(2026, 6, 1)), 24);
    }

    #[test]
    fn same_day_reversed_and_missing_floor_to_one() {
        assert_eq!(months_between(date(2025, 1, 1), date(2025, 1, 1)), 1);
        assert_eq!(months_between(date(2025, 6, 1), date(2025, 1, 1)), 1);
        assert_eq!(months_between(None, date(2025, 1, 1)), 1);
        assert_eq!(months_between(date(2025, 1, 1), None), 1);
    }

    #[test]
    fn display_clip_bounds() {
        assert_eq!(display_months(0), 1);
        assert_eq!(display_months(12), 12);
        assert_eq!(display_months(500), 360);
    }

    #[test]
    fn shift_months_clamps_to_month_end() {
        let jan_31 = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        assert_eq!(shift_months(jan_31, 1), date(2025, 2, 28).unwrap());
        assert_eq!(shift_months(jan_31, -2), date(2024, 11, 30).unwrap());
    }
}
