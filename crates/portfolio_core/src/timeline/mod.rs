//! Timeline and deadline charting rules.
//!
//! # Responsibility
//! - Normalize heterogeneous item dates and derive month durations.
//! - Project one project's items into lanes, bars and points.
//! - Aggregate cross-project team deadlines and sequencing warnings.
//!
//! # Invariants
//! - Every function in this module is pure over its inputs; "today" is
//!   injectable through the `*_at` entry points.
//! - Empty input yields empty result structures, never errors.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub mod dates;
pub mod deadlines;
pub mod duration;
pub mod normalize;
pub mod projector;
pub mod sequence;
pub mod ticks;

/// Label attached to the today marker.
pub const TODAY_LABEL: &str = "Today";

/// Caller-supplied axis options shared by both charts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisConfig {
    /// Custom axis start; derived from data when `None`.
    pub start: Option<NaiveDate>,
    /// Custom axis end; derived from data when `None`.
    pub end: Option<NaiveDate>,
    /// Months between ticks; `None` or `0` selects automatically.
    pub tick_interval: Option<u32>,
    /// Whether lane labels are rendered next to the timeline.
    pub show_labels: bool,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            tick_interval: None,
            show_labels: true,
        }
    }
}

/// Resolved visible date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Vertical "today" line spanning all rows of a chart.
///
/// Positioned at the current date even when it lies outside the axis range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodayMarker {
    pub date: NaiveDate,
    pub label: String,
    /// Row coordinate where the line starts.
    pub y0: f64,
    /// Row coordinate where the line ends.
    pub y1: f64,
}

impl TodayMarker {
    /// Marker spanning `rows` chart rows centered on integer positions.
    pub fn spanning(date: NaiveDate, rows: usize) -> Self {
        Self {
            date,
            label: TODAY_LABEL.to_string(),
            y0: -0.5,
            y1: rows as f64 - 0.5,
        }
    }
}

pub use dates::{normalize_dates, parse_date, parse_date_text, DateBackfill, DateColumn};
pub use deadlines::{
    compute_team_deadlines, compute_team_deadlines_at, DeadlineRecord, TeamDeadlineChart,
};
pub use duration::{display_months, months_between, shift_months};
pub use normalize::{normalize_item_dates, NormalizedItems};
pub use projector::{
    compute_timeline, compute_timeline_at, ElementShape, TimelineElement, TimelineProjection,
};
pub use sequence::{audit_project, SequenceWarning, WarningReport};
pub use ticks::{plan_ticks, Tick, TickPlan};
