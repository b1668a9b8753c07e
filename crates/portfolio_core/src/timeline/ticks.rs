//! Axis tick planning.
//!
//! # Invariants
//! - Ticks fall on the first day of a month, inside `[min, max]` inclusive.
//! - An explicit interval of `0` means "choose automatically".

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Interval presets offered to users: `None` selects automatically.
pub const TICK_INTERVAL_PRESETS: [(&str, Option<u32>); 5] = [
    ("Auto", None),
    ("Monthly", Some(1)),
    ("Quarterly", Some(3)),
    ("Semi-Annual", Some(6)),
    ("Annual", Some(12)),
];

const TICK_LABEL_FORMAT: &str = "%b %Y";

/// One labeled axis gridline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tick {
    pub date: NaiveDate,
    pub label: String,
}

/// Chosen granularity and the concrete ticks for one axis.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TickPlan {
    pub interval_months: u32,
    pub ticks: Vec<Tick>,
}

/// Granularity for a range: <=2 years quarterly, <=5 semi-annual, else annual.
pub fn auto_interval(min: NaiveDate, max: NaiveDate) -> u32 {
    let span_years = f64::from(max.year() - min.year())
        + (f64::from(max.month()) - f64::from(min.month())) / 12.0;
    if span_years <= 2.0 {
        3
    } else if span_years <= 5.0 {
        6
    } else {
        12
    }
}

/// Plans ticks for `[min, max]`, honoring a non-zero explicit interval.
pub fn plan_ticks(explicit_interval: Option<u32>, min: NaiveDate, max: NaiveDate) -> TickPlan {
    let interval_months = match explicit_interval {
        Some(interval) if interval > 0 => interval,
        _ => auto_interval(min, max),
    };

    let mut ticks = Vec::new();
    for year in min.year()..=max.year() {
        for month in (1..=12).step_by(interval_months as usize) {
            let Some(date) = NaiveDate::from_ymd_opt(year, month, 1) else {
                continue;
            };
            if date >= min && date <= max {
                ticks.push(Tick {
                    date,
                    label: date.format(TICK_LABEL_FORMAT).to_string(),
                });
            }
        }
    }

    TickPlan {
        interval_months,
        ticks,
    }
}
