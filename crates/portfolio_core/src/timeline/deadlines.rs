//! Cross-project team deadline aggregation.
//!
//! # Responsibility
//! - Find the latest end date per project x team.
//! - Run sequencing checks per project and collect the warning report.
//! - Resolve the chart axis, per-team series and project rows.
//!
//! # Invariants
//! - Records are ordered by project input order, then `Team` display order.
//! - Series are always emitted in `Team::DISPLAY_ORDER`.
//! - A project x team pair without any end date produces no record.

use crate::model::item::Item;
use crate::model::project::{Project, ProjectId};
use crate::model::team::{Team, TeamPalette};
use crate::timeline::duration::shift_months;
use crate::timeline::sequence::{audit_project, WarningReport};
use crate::timeline::ticks::{plan_ticks, TickPlan};
use crate::timeline::{AxisConfig, AxisRange, TodayMarker};
use chrono::{Local, NaiveDate};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

const AXIS_TRAIL_MONTHS: i32 = 1;

/// Default start of the deadline chart axis.
pub fn default_axis_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Latest end date of one team's items within one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlineRecord {
    pub project_id: ProjectId,
    pub project_name: String,
    pub iso: String,
    pub team: Team,
    pub deadline: NaiveDate,
}

/// One bar of a team series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlinePoint {
    pub project_name: String,
    pub iso: String,
    pub deadline: NaiveDate,
}

/// All deadlines of one team, drawn in one color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlineSeries {
    pub team: Team,
    pub color: String,
    pub points: Vec<DeadlinePoint>,
}

/// Project row on the deadline chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRow {
    pub project_name: String,
    /// Set when the project has sequencing warnings.
    pub flagged: bool,
}

/// Deadline records, warnings and everything needed to draw them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamDeadlineChart {
    pub records: Vec<DeadlineRecord>,
    pub warnings: WarningReport,
    pub series: Vec<DeadlineSeries>,
    pub rows: Vec<ProjectRow>,
    pub today: TodayMarker,
    /// `None` when no record exists.
    pub axis: Option<AxisRange>,
    pub ticks: TickPlan,
}

impl TeamDeadlineChart {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records belonging to one project.
    pub fn records_for(&self, project_id: &str) -> impl Iterator<Item = &DeadlineRecord> + '_ {
        let project_id = project_id.to_string();
        self.records
            .iter()
            .filter(move |record| record.project_id == project_id)
    }
}

/// Aggregates team deadlines using the local current date.
pub fn compute_team_deadlines(
    projects: &[Project],
    items: &[Item],
    axis: &AxisConfig,
    palette: &TeamPalette,
) -> TeamDeadlineChart {
    compute_team_deadlines_at(projects, items, axis, palette, Local::now().date_naive())
}

/// Aggregates team deadlines with an explicit "today".
pub fn compute_team_deadlines_at(
    projects: &[Project],
    items: &[Item],
    axis: &AxisConfig,
    palette: &TeamPalette,
    today: NaiveDate,
) -> TeamDeadlineChart {
    info!(
        "event=team_deadlines module=timeline status=start projects={} items={}",
        projects.len(),
        items.len()
    );

    let mut items_by_project: HashMap<&str, Vec<&Item>> = HashMap::new();
    for item in items {
        items_by_project
            .entry(item.project_id.as_str())
            .or_default()
            .push(item);
    }

    let mut records = Vec::new();
    let mut warnings = WarningReport::new();
    for project in projects {
        let Some(project_items) = items_by_project.get(project.id.as_str()) else {
            warn!(
                "event=team_deadlines module=timeline status=skipped reason=no_items project_id={}",
                project.id
            );
            continue;
        };

        let mut deadlines: BTreeMap<Team, NaiveDate> = BTreeMap::new();
        for team in Team::DISPLAY_ORDER {
            let mut team_items = project_items.iter().filter(|item| item.team == team).peekable();
            if team_items.peek().is_none() {
                continue;
            }
            let Some(deadline) = team_items.filter_map(|item| item.end_date).max() else {
                warn!(
                    "event=team_deadlines module=timeline status=skipped reason=no_end_dates project_id={} team={}",
                    project.id, team
                );
                continue;
            };
            deadlines.insert(team, deadline);
            records.push(DeadlineRecord {
                project_id: project.id.clone(),
                project_name: project.name.clone(),
                iso: project.iso.clone(),
                team,
                deadline,
            });
        }

        warnings.record(audit_project(&project.name, &deadlines));
    }

    if records.is_empty() {
        info!("event=team_deadlines module=timeline status=empty");
        return TeamDeadlineChart {
            records,
            warnings,
            series: Vec::new(),
            rows: Vec::new(),
            today: TodayMarker::spanning(today, 0),
            axis: None,
            ticks: TickPlan::default(),
        };
    }

    let series: Vec<DeadlineSeries> = Team::DISPLAY_ORDER
        .into_iter()
        .filter_map(|team| {
            let points: Vec<DeadlinePoint> = records
                .iter()
                .filter(|record| record.team == team)
                .map(|record| DeadlinePoint {
                    project_name: record.project_name.clone(),
                    iso: record.iso.clone(),
                    deadline: record.deadline,
                })
                .collect();
            if points.is_empty() {
                return None;
            }
            Some(DeadlineSeries {
                team,
                color: palette.color_for(team).to_string(),
                points,
            })
        })
        .collect();

    let mut rows: Vec<ProjectRow> = Vec::new();
    for record in &records {
        if rows.iter().all(|row| row.project_name != record.project_name) {
            rows.push(ProjectRow {
                project_name: record.project_name.clone(),
                flagged: warnings.is_flagged(&record.project_name),
            });
        }
    }

    let latest = records
        .iter()
        .map(|record| record.deadline)
        .max()
        .unwrap_or_else(default_axis_start);
    let range = AxisRange {
        start: axis.start.unwrap_or_else(default_axis_start),
        end: axis
            .end
            .unwrap_or_else(|| shift_months(latest, AXIS_TRAIL_MONTHS)),
    };
    let ticks = plan_ticks(axis.tick_interval, range.start, range.end);

    info!(
        "event=team_deadlines module=timeline status=ok records={} projects={} warnings={}",
        records.len(),
        rows.len(),
        warnings.details().len()
    );

    TeamDeadlineChart {
        today: TodayMarker::spanning(today, rows.len()),
        records,
        warnings,
        series,
        rows,
        axis: Some(range),
        ticks,
    }
}
