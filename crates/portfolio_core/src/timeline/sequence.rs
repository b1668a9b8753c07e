//! Sequencing checks between teams within one project.
//!
//! # Invariants
//! - Without a Construction deadline no checks run for the project.
//! - A warning is emitted only for a strictly later deadline, so `days_diff`
//!   is always positive.
//! - Projects without violations never appear in a [`WarningReport`].

use crate::model::team::Team;
use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A team finishing after the project's Construction deadline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceWarning {
    pub project_name: String,
    pub team: Team,
    /// Days between the team deadline and the Construction deadline.
    pub days_diff: i64,
}

impl SequenceWarning {
    /// Human-readable summary, e.g. `Procurement ends 9 days after Construction`.
    pub fn message(&self) -> String {
        format!(
            "{} ends {} days after {}",
            self.team,
            self.days_diff,
            Team::REFERENCE
        )
    }
}

/// Checks one project's per-team deadlines against Construction.
pub fn audit_project(
    project_name: &str,
    deadlines: &BTreeMap<Team, NaiveDate>,
) -> Vec<SequenceWarning> {
    let Some(reference) = deadlines.get(&Team::REFERENCE) else {
        debug!(
            "event=sequence_audit module=timeline status=skipped reason=no_reference project={project_name}"
        );
        return Vec::new();
    };

    Team::SEQUENCE_CHECKED
        .into_iter()
        .filter_map(|team| {
            let deadline = deadlines.get(&team)?;
            if deadline > reference {
                Some(SequenceWarning {
                    project_name: project_name.to_string(),
                    team,
                    days_diff: (*deadline - *reference).num_days(),
                })
            } else {
                None
            }
        })
        .collect()
}

/// Sequencing warnings across projects, keyed by project name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WarningReport {
    alert_projects: BTreeMap<String, Vec<Team>>,
    details: Vec<SequenceWarning>,
}

impl WarningReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one project's warnings; an empty list leaves the report unchanged.
    pub fn record(&mut self, warnings: Vec<SequenceWarning>) {
        for warning in warnings {
            self.alert_projects
                .entry(warning.project_name.clone())
                .or_default()
                .push(warning.team);
            self.details.push(warning);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.details.is_empty()
    }

    /// Whether `project_name` has at least one violation.
    pub fn is_flagged(&self, project_name: &str) -> bool {
        self.alert_projects.contains_key(project_name)
    }

    /// Violating teams for `project_name`, in check order.
    pub fn violating_teams(&self, project_name: &str) -> Option<&[Team]> {
        self.alert_projects.get(project_name).map(Vec::as_slice)
    }

    /// Flagged project names.
    pub fn projects(&self) -> impl Iterator<Item = &str> + '_ {
        self.alert_projects.keys().map(String::as_str)
    }

    /// Every warning in emission order.
    pub fn details(&self) -> &[SequenceWarning] {
        &self.details
    }
}
