//! Single-project timeline projection.
//!
//! # Responsibility
//! - Turn one project's items into lanes, bars and points.
//! - Resolve the visible axis range, ticks, legend and today marker.
//!
//! # Invariants
//! - One lane per distinct label; lanes are ordered by first appearance
//!   after a stable sort of items by start date.
//! - Items with missing dates are backfilled, never dropped.
//! - Items lasting more than 30 days (months x 30) are bars; everything else
//!   is a point at its start.

use crate::model::item::Item;
use crate::model::team::{Team, TeamPalette};
use crate::timeline::dates::DateBackfill;
use crate::timeline::duration::{display_months, months_between, shift_months};
use crate::timeline::ticks::{plan_ticks, TickPlan};
use crate::timeline::{AxisConfig, AxisRange, TodayMarker};
use chrono::{Local, NaiveDate};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Items up to this many days are drawn as points.
pub const POINT_THRESHOLD_DAYS: u32 = 30;
const DAYS_PER_MONTH: u32 = 30;
const AXIS_LEAD_MONTHS: i32 = 1;
const AXIS_TRAIL_MONTHS: i32 = 6;

/// One timeline row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lane {
    pub position: usize,
    pub label: String,
}

/// Geometry of one timeline element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ElementShape {
    /// Span from start to finish.
    Bar { start: NaiveDate, finish: NaiveDate },
    /// Marker at `at`; `hover_finish` is only shown in tooltips.
    Point {
        at: NaiveDate,
        hover_finish: NaiveDate,
    },
}

/// One rendered item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineElement {
    pub item_id: String,
    pub label: String,
    pub lane: usize,
    pub team: Team,
    pub color: String,
    /// Months clipped for display.
    pub months: u32,
    pub shape: ElementShape,
}

impl TimelineElement {
    pub fn is_bar(&self) -> bool {
        matches!(self.shape, ElementShape::Bar { .. })
    }
}

/// Legend swatch for one team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub team: Team,
    pub color: String,
}

/// Renderable timeline for one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineProjection {
    pub lanes: Vec<Lane>,
    pub elements: Vec<TimelineElement>,
    pub today: TodayMarker,
    /// `None` when there is nothing to plot.
    pub axis: Option<AxisRange>,
    pub ticks: TickPlan,
    pub legend: Vec<LegendEntry>,
    pub show_labels: bool,
    pub suggested_height: u32,
    /// Items with at least one backfilled date.
    pub backfilled_items: usize,
    /// Start/finish values filled; an item missing both counts twice.
    pub backfilled_dates: usize,
}

/// Projects `items` using the local current date for the today marker.
pub fn compute_timeline(
    items: &[Item],
    axis: &AxisConfig,
    palette: &TeamPalette,
) -> TimelineProjection {
    compute_timeline_at(items, axis, palette, Local::now().date_naive())
}

/// Projects `items` with an explicit "today".
pub fn compute_timeline_at(
    items: &[Item],
    axis: &AxisConfig,
    palette: &TeamPalette,
    today: NaiveDate,
) -> TimelineProjection {
    let legend: Vec<LegendEntry> = palette
        .entries()
        .map(|(team, color)| LegendEntry {
            team,
            color: color.to_string(),
        })
        .collect();

    if items.is_empty() {
        info!("event=timeline_project module=timeline status=empty");
        return TimelineProjection {
            lanes: Vec::new(),
            elements: Vec::new(),
            today: TodayMarker::spanning(today, 0),
            axis: None,
            ticks: TickPlan::default(),
            legend,
            show_labels: axis.show_labels,
            suggested_height: suggested_height(0),
            backfilled_items: 0,
            backfilled_dates: 0,
        };
    }

    let backfill =
        DateBackfill::from_pairs(items.iter().map(|item| (item.start_date, item.end_date)));
    let mut backfilled_items = 0;
    let mut backfilled_dates = 0;
    let mut rows: Vec<ResolvedRow<'_>> = items
        .iter()
        .map(|item| {
            let (start, finish, filled) = backfill.resolve(item.start_date, item.end_date);
            if filled > 0 {
                backfilled_items += 1;
                backfilled_dates += filled;
            }
            ResolvedRow {
                item,
                start,
                finish,
                label: lane_label(&item.item_name),
                months: months_between(item.start_date, item.end_date),
            }
        })
        .collect();

    if backfilled_items > 0 {
        warn!(
            "event=timeline_project module=timeline status=recovered project_id={} backfilled_items={} backfilled_dates={}",
            items[0].project_id, backfilled_items, backfilled_dates
        );
    }

    rows.sort_by_key(|row| row.start);

    let mut lanes: Vec<Lane> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for row in &rows {
        if !positions.contains_key(&row.label) {
            positions.insert(row.label.clone(), lanes.len());
            lanes.push(Lane {
                position: lanes.len(),
                label: row.label.clone(),
            });
        }
    }

    let elements: Vec<TimelineElement> = rows
        .iter()
        .map(|row| {
            let shape = if row.months * DAYS_PER_MONTH > POINT_THRESHOLD_DAYS {
                ElementShape::Bar {
                    start: row.start,
                    finish: row.finish,
                }
            } else {
                ElementShape::Point {
                    at: row.start,
                    hover_finish: row
                        .item
                        .end_date
                        .unwrap_or_else(|| shift_months(row.start, 1)),
                }
            };
            TimelineElement {
                item_id: row.item.item_id.clone(),
                label: row.label.clone(),
                lane: positions.get(&row.label).copied().unwrap_or_default(),
                team: row.item.team,
                color: palette.color_for(row.item.team).to_string(),
                months: display_months(row.months),
                shape,
            }
        })
        .collect();

    let data_start = rows.iter().map(|row| row.start).min().unwrap_or(backfill.start);
    let data_finish = rows.iter().map(|row| row.finish).max().unwrap_or(backfill.finish);
    let range = AxisRange {
        start: axis
            .start
            .unwrap_or_else(|| shift_months(data_start, -AXIS_LEAD_MONTHS)),
        end: axis
            .end
            .unwrap_or_else(|| shift_months(data_finish, AXIS_TRAIL_MONTHS)),
    };
    let ticks = plan_ticks(axis.tick_interval, range.start, range.end);

    info!(
        "event=timeline_project module=timeline status=ok project_id={} lanes={} elements={}",
        items[0].project_id,
        lanes.len(),
        elements.len()
    );

    TimelineProjection {
        today: TodayMarker::spanning(today, lanes.len()),
        suggested_height: suggested_height(lanes.len()),
        lanes,
        elements,
        axis: Some(range),
        ticks,
        legend,
        show_labels: axis.show_labels,
        backfilled_items,
        backfilled_dates,
    }
}

struct ResolvedRow<'a> {
    item: &'a Item,
    start: NaiveDate,
    finish: NaiveDate,
    label: String,
    months: u32,
}

fn lane_label(item_name: &str) -> String {
    item_name.replace('\n', " ").trim().to_string()
}

fn suggested_height(lanes: usize) -> u32 {
    match lanes {
        0..=5 => 400,
        6..=10 => 500,
        _ => {
            let scaled = 300_usize.saturating_add(lanes.saturating_mul(25));
            u32::try_from(scaled.min(650)).unwrap_or(650)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{lane_label, suggested_height};

    #[test]
    fn lane_label_flattens_newlines() {
        assert_eq!(lane_label(" Site\nsurvey "), "Site survey");
    }

    #[test]
    fn suggested_height_steps() {
        assert_eq!(suggested_height(3), 400);
        assert_eq!(suggested_height(8), 500);
        assert_eq!(suggested_height(12), 600);
        assert_eq!(suggested_height(40), 650);
    }
}
