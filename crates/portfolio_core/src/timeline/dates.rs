//! Date normalization and the shared date backfill policy.
//!
//! # Responsibility
//! - Recover canonical dates from text, native dates or missing values.
//! - Fill missing item dates from the dataset's own range.
//!
//! # Invariants
//! - Parsing never fails loudly; unparseable input becomes `None`.
//! - `None` is never silently turned into "today".
//! - Slash-separated day/month input is decided by `FALLBACK_FORMATS` order
//!   only, so ambiguous values resolve day-first.

use crate::model::item::RawDate;
use crate::timeline::duration::shift_months;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// Explicit formats tried, in order, after the permissive pass.
pub const FALLBACK_FORMATS: [&str; 4] = ["%Y-%m-%d", "%b %d, %Y", "%d/%m/%Y", "%m/%d/%Y"];

/// Canonical storage format.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%d";

const LONG_FORMATS: [&str; 2] = ["%B %d, %Y", "%d %B %Y"];

static YEAR_FIRST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(\d{4})[-/.](\d{1,2})[-/.](\d{1,2})(?:[T ]\d{1,2}:\d{2}(?::\d{2}(?:\.\d+)?)?(?:Z|[+-]\d{2}:?\d{2})?)?$",
    )
    .expect("valid year-first date regex")
});

/// Parsed date column plus diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateColumn {
    pub dates: Vec<Option<NaiveDate>>,
    /// Non-blank entries no pass could parse.
    pub unparseable: usize,
}

/// Parses one boundary date value.
pub fn parse_date(raw: &RawDate) -> Option<NaiveDate> {
    match raw {
        RawDate::Date(date) => Some(*date),
        RawDate::Text(text) => parse_date_text(text),
        RawDate::Missing => None,
    }
}

/// Parses one text date: permissive pass first, then each fallback format.
pub fn parse_date_text(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    permissive_parse(trimmed).or_else(|| {
        FALLBACK_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
    })
}

/// Normalizes a column of boundary dates.
///
/// The permissive pass runs over the whole column; each fallback format is
/// then applied only to entries still unparsed.
pub fn normalize_dates(values: &[RawDate]) -> DateColumn {
    let mut dates: Vec<Option<NaiveDate>> = values
        .iter()
        .map(|raw| match raw {
            RawDate::Date(date) => Some(*date),
            RawDate::Text(text) => permissive_parse(text.trim()),
            RawDate::Missing => None,
        })
        .collect();

    for format in FALLBACK_FORMATS {
        for (slot, raw) in dates.iter_mut().zip(values) {
            if slot.is_some() {
                continue;
            }
            if let RawDate::Text(text) = raw {
                *slot = NaiveDate::parse_from_str(text.trim(), format).ok();
            }
        }
    }

    let unparseable = dates
        .iter()
        .zip(values)
        .filter(|(slot, raw)| slot.is_none() && !raw.is_blank())
        .count();

    DateColumn { dates, unparseable }
}

/// Formats a date in canonical storage form.
pub fn format_date(date: NaiveDate) -> String {
    date.format(CANONICAL_FORMAT).to_string()
}

fn permissive_parse(value: &str) -> Option<NaiveDate> {
    if value.is_empty() {
        return None;
    }
    if let Some(caps) = YEAR_FIRST_RE.captures(value) {
        let year = caps[1].parse::<i32>().ok()?;
        let month = caps[2].parse::<u32>().ok()?;
        let day = caps[3].parse::<u32>().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }
    LONG_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

/// Fallback start used when a dataset has no start dates at all.
pub fn default_backfill_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Replacement values for missing item dates, derived from one dataset.
///
/// - missing start -> dataset min(start), else 2025-01-01
/// - missing finish -> dataset max(finish), else resolved start + 1 month
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateBackfill {
    pub start: NaiveDate,
    pub finish: NaiveDate,
}

impl DateBackfill {
    /// Derives the backfill values from `(start, finish)` pairs.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Option<NaiveDate>, Option<NaiveDate>)>,
    {
        let mut min_start: Option<NaiveDate> = None;
        let mut max_finish: Option<NaiveDate> = None;
        for (start, finish) in pairs {
            if let Some(start) = start {
                min_start = Some(min_start.map_or(start, |current| current.min(start)));
            }
            if let Some(finish) = finish {
                max_finish = Some(max_finish.map_or(finish, |current| current.max(finish)));
            }
        }

        let start = min_start.unwrap_or_else(default_backfill_start);
        let finish = max_finish.unwrap_or_else(|| shift_months(start, 1));
        Self { start, finish }
    }

    /// Resolves one pair, returning the dates and how many were filled.
    pub fn resolve(
        &self,
        start: Option<NaiveDate>,
        finish: Option<NaiveDate>,
    ) -> (NaiveDate, NaiveDate, usize) {
        let filled = usize::from(start.is_none()) + usize::from(finish.is_none());
        (
            start.unwrap_or(self.start),
            finish.unwrap_or(self.finish),
            filled,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_dates, parse_date_text, DateBackfill};
    use crate::model::item::RawDate;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn supported_formats_agree_on_unambiguous_date() {
        for input in ["2025-01-15", "Jan 15, 2025", "15/01/2025", "01/15/2025"] {
            assert_eq!(parse_date_text(input), Some(date(2025, 1, 15)), "{input}");
        }
    }

    #[test]
    fn permissive_pass_accepts_timestamps_and_long_names() {
        assert_eq!(
            parse_date_text("2025-01-15T08:30:00Z"),
            Some(date(2025, 1, 15))
        );
        assert_eq!(
            parse_date_text("2025-01-15 08:30:00"),
            Some(date(2025, 1, 15))
        );
        assert_eq!(parse_date_text("2025/1/5"), Some(date(2025, 1, 5)));
        assert_eq!(
            parse_date_text("January 15, 2025"),
            Some(date(2025, 1, 15))
        );
        assert_eq!(parse_date_text("15 Jan 2025"), Some(date(2025, 1, 15)));
    }

    #[test]
    fn ambiguous_slash_dates_resolve_day_first() {
        assert_eq!(parse_date_text("03/04/2025"), Some(date(2025, 4, 3)));
    }

    #[test]
    fn garbage_and_blank_text_become_missing() {
        assert_eq!(parse_date_text("soon"), None);
        assert_eq!(parse_date_text("2025-02-30"), None);
        assert_eq!(parse_date_text("   "), None);
    }

    #[test]
    fn column_counts_only_non_blank_failures() {
        let column = normalize_dates(&[
            RawDate::from("2025-01-15"),
            RawDate::from("not a date"),
            RawDate::Missing,
            RawDate::from(""),
            RawDate::from("01/15/2025"),
        ]);
        assert_eq!(
            column.dates,
            vec![
                Some(date(2025, 1, 15)),
                None,
                None,
                None,
                Some(date(2025, 1, 15)),
            ]
        );
        assert_eq!(column.unparseable, 1);
    }

    #[test]
    fn backfill_uses_dataset_range_then_fixed_default() {
        let backfill = DateBackfill::from_pairs([
            (Some(date(2025, 3, 1)), None),
            (Some(date(2025, 2, 1)), Some(date(2025, 9, 1))),
        ]);
        assert_eq!(backfill.start, date(2025, 2, 1));
        assert_eq!(backfill.finish, date(2025, 9, 1));

        let empty = DateBackfill::from_pairs([(None, None)]);
        assert_eq!(empty.start, date(2025, 1, 1));
        assert_eq!(empty.finish, date(2025, 2, 1));
        assert_eq!(
            empty.resolve(None, Some(date(2025, 5, 1))),
            (date(2025, 1, 1), date(2025, 5, 1), 1)
        );
    }
}
