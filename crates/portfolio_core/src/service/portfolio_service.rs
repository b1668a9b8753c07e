//! Portfolio use-case service.
//!
//! # Responsibility
//! - Provide project CRUD, filtering and bulk item editing over any
//!   [`RecordStore`].
//! - Load store data into the timeline and deadline computations.
//!
//! # Invariants
//! - A bulk save fully replaces a project's items through one
//!   `replace_items` call.
//! - Generated item IDs continue from the highest `I###` number in the store.
//! - Saved items always carry both dates and recomputed `months`.

use crate::model::item::{Item, RawItem};
use crate::model::project::{Project, ProjectId};
use crate::repo::store::{RecordStore, StoreError};
use crate::timeline::dates::DateBackfill;
use crate::timeline::deadlines::{compute_team_deadlines_at, TeamDeadlineChart};
use crate::timeline::normalize::normalize_item_dates;
use crate::timeline::projector::{compute_timeline_at, TimelineProjection};
use crate::timeline::AxisConfig;
use chrono::{Local, NaiveDate};
use log::{info, warn};
use std::collections::{BTreeSet, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

const ITEM_ID_PREFIX: char = 'I';

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors from portfolio use cases.
#[derive(Debug)]
pub enum ServiceError {
    Store(StoreError),
    /// A bulk save contained no non-blank rows.
    EmptyInput { project_id: ProjectId },
    /// A copy was refused because the target store already has projects.
    TargetNotEmpty { projects: usize },
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::EmptyInput { project_id } => {
                write!(f, "no items to save for project {project_id}")
            }
            Self::TargetNotEmpty { projects } => write!(
                f,
                "target store already holds {projects} projects; use force to overwrite"
            ),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::EmptyInput { .. } | Self::TargetNotEmpty { .. } => None,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Outcome of a bulk item save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    /// Items as persisted, in submitted order.
    pub items: Vec<Item>,
    /// Blank editor rows that were dropped.
    pub dropped_rows: usize,
    /// Item IDs generated for rows that had none (or a clashing one).
    pub assigned_ids: usize,
    /// Items with at least one backfilled date.
    pub backfilled_items: usize,
    /// Start/end values filled; an item missing both counts twice.
    pub backfilled_dates: usize,
    /// Non-blank dates that could not be parsed.
    pub unparseable_dates: usize,
}

/// Use-case facade over a record store.
pub struct PortfolioService<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> PortfolioService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn add_project(&mut self, project: &Project) -> ServiceResult<()> {
        Ok(self.store.add_project(project)?)
    }

    pub fn update_project(&mut self, project: &Project) -> ServiceResult<()> {
        Ok(self.store.update_project(project)?)
    }

    pub fn get_project(&self, id: &str) -> ServiceResult<Project> {
        Ok(self.store.get_project(id)?)
    }

    pub fn list_projects(&self) -> ServiceResult<Vec<Project>> {
        Ok(self.store.list_projects()?)
    }

    /// Deletes a project together with its items.
    pub fn delete_project(&mut self, id: &str) -> ServiceResult<()> {
        Ok(self.store.delete_project(id)?)
    }

    pub fn list_items(&self, project_id: &str) -> ServiceResult<Vec<Item>> {
        Ok(self.store.list_items(project_id)?)
    }

    /// Distinct ISO codes, sorted.
    pub fn unique_isos(&self) -> ServiceResult<Vec<String>> {
        let isos: BTreeSet<String> = self
            .store
            .list_projects()?
            .into_iter()
            .map(|project| project.iso)
            .collect();
        Ok(isos.into_iter().collect())
    }

    /// Distinct voltages, ascending.
    pub fn unique_voltages(&self) -> ServiceResult<Vec<i64>> {
        let voltages: BTreeSet<i64> = self
            .store
            .list_projects()?
            .iter()
            .map(|project| project.voltage)
            .collect();
        Ok(voltages.into_iter().collect())
    }

    /// Projects matching any of `isos` and any of `voltages`.
    ///
    /// An empty filter list does not restrict that attribute.
    pub fn filter_projects(
        &self,
        isos: &[String],
        voltages: &[i64],
    ) -> ServiceResult<Vec<Project>> {
        Ok(self
            .store
            .list_projects()?
            .into_iter()
            .filter(|project| isos.is_empty() || isos.contains(&project.iso))
            .filter(|project| voltages.is_empty() || voltages.contains(&project.voltage))
            .collect())
    }

    /// Replaces every item of `project_id` with the resolved `raw_items`.
    ///
    /// Blank rows are dropped. Missing names and teams are defaulted, missing
    /// IDs generated, dates normalized and backfilled, and months recomputed.
    ///
    /// # Errors
    /// - `EmptyInput` when no non-blank row remains; stored items are kept.
    /// - `Store(ProjectNotFound)` for an unknown project.
    pub fn save_project_items(
        &mut self,
        project_id: &str,
        raw_items: &[RawItem],
    ) -> ServiceResult<SaveReport> {
        self.store.get_project(project_id)?;

        let rows: Vec<RawItem> = raw_items
            .iter()
            .filter(|raw| !raw.is_blank())
            .map(|raw| RawItem {
                project_id: project_id.to_string(),
                ..raw.clone()
            })
            .collect();
        let dropped_rows = raw_items.len() - rows.len();
        if rows.is_empty() {
            warn!(
                "event=items_save module=service status=rejected reason=empty_input project_id={project_id}"
            );
            return Err(ServiceError::EmptyInput {
                project_id: project_id.to_string(),
            });
        }

        let normalized = normalize_item_dates(&rows);
        let mut items = normalized.items;

        let backfill =
            DateBackfill::from_pairs(items.iter().map(|item| (item.start_date, item.end_date)));
        let mut backfilled_items = 0;
        let mut backfilled_dates = 0;
        for item in &mut items {
            let (start, finish, filled) = backfill.resolve(item.start_date, item.end_date);
            item.start_date = Some(start);
            item.end_date = Some(finish);
            item.recompute_months();
            if filled > 0 {
                backfilled_items += 1;
                backfilled_dates += filled;
            }
        }

        let assigned_ids = self.assign_item_ids(project_id, &mut items)?;
        self.store.replace_items(project_id, &items)?;

        info!(
            "event=items_save module=service status=ok project_id={} items={} dropped_rows={} assigned_ids={} backfilled_items={} backfilled_dates={}",
            project_id,
            items.len(),
            dropped_rows,
            assigned_ids,
            backfilled_items,
            backfilled_dates
        );
        Ok(SaveReport {
            items,
            dropped_rows,
            assigned_ids,
            backfilled_items,
            backfilled_dates,
            unparseable_dates: normalized.unparseable_dates,
        })
    }

    /// Appends one item with a fresh ID and re-saves the project's items.
    pub fn add_project_item(
        &mut self,
        project_id: &str,
        raw_item: &RawItem,
    ) -> ServiceResult<Item> {
        let new_row = RawItem {
            item_id: None,
            ..raw_item.clone()
        };
        if new_row.is_blank() {
            return Err(ServiceError::EmptyInput {
                project_id: project_id.to_string(),
            });
        }

        let mut rows: Vec<RawItem> = self
            .store
            .list_items(project_id)?
            .iter()
            .map(RawItem::from)
            .collect();
        rows.push(new_row);

        let mut report = self.save_project_items(project_id, &rows)?;
        report.items.pop().ok_or_else(|| ServiceError::EmptyInput {
            project_id: project_id.to_string(),
        })
    }

    /// Timeline of one project using the local current date.
    pub fn project_timeline(
        &self,
        project_id: &str,
        axis: &AxisConfig,
    ) -> ServiceResult<TimelineProjection> {
        self.project_timeline_at(project_id, axis, Local::now().date_naive())
    }

    pub fn project_timeline_at(
        &self,
        project_id: &str,
        axis: &AxisConfig,
        today: NaiveDate,
    ) -> ServiceResult<TimelineProjection> {
        self.store.get_project(project_id)?;
        let items = self.store.list_items(project_id)?;
        let palette = self.store.team_color_map()?;
        Ok(compute_timeline_at(&items, axis, &palette, today))
    }

    /// Cross-project deadlines, restricted to `isos` unless it is empty.
    pub fn team_deadlines(
        &self,
        isos: &[String],
        axis: &AxisConfig,
    ) -> ServiceResult<TeamDeadlineChart> {
        self.team_deadlines_at(isos, axis, Local::now().date_naive())
    }

    pub fn team_deadlines_at(
        &self,
        isos: &[String],
        axis: &AxisConfig,
        today: NaiveDate,
    ) -> ServiceResult<TeamDeadlineChart> {
        let projects = self.filter_projects(isos, &[])?;
        let items = self.store.list_all_items()?;
        let palette = self.store.team_color_map()?;
        Ok(compute_team_deadlines_at(
            &projects, &items, axis, &palette, today,
        ))
    }

    /// Gives every item a store-unique ID, keeping valid existing ones.
    fn assign_item_ids(&self, project_id: &str, items: &mut [Item]) -> ServiceResult<usize> {
        let stored = self.store.list_all_items()?;
        let foreign_ids: HashSet<&str> = stored
            .iter()
            .filter(|item| item.project_id != project_id)
            .map(|item| item.item_id.as_str())
            .collect();
        let mut taken: HashSet<String> = stored
            .iter()
            .chain(items.iter())
            .map(|item| item.item_id.trim().to_string())
            .collect();
        let mut next = stored
            .iter()
            .chain(items.iter())
            .filter_map(|item| item_number(&item.item_id))
            .max()
            .unwrap_or(0);

        let mut seen: HashSet<String> = HashSet::new();
        let mut assigned = 0;
        for item in items.iter_mut() {
            let id = item.item_id.trim().to_string();
            if !id.is_empty() && !foreign_ids.contains(id.as_str()) && !seen.contains(&id) {
                item.item_id = id.clone();
                seen.insert(id);
                continue;
            }
            item.item_id = match next.checked_add(1) {
                Some(number) => {
                    next = number;
                    format_item_id(number)
                }
                None => {
                    let id = lowest_free_id(&taken);
                    warn!(
                        "event=item_ids module=service status=recovered reason=id_space_exhausted project_id={project_id} item_id={id}"
                    );
                    id
                }
            };
            taken.insert(item.item_id.clone());
            seen.insert(item.item_id.clone());
            assigned += 1;
        }
        Ok(assigned)
    }
}

/// Numeric suffix of an `I###` id.
fn item_number(id: &str) -> Option<u64> {
    let digits = id.trim().strip_prefix(ITEM_ID_PREFIX)?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn format_item_id(number: u64) -> String {
    format!("{ITEM_ID_PREFIX}{number:03}")
}

/// Smallest `I###` id not in `taken`; used once numbering hits `u64::MAX`.
fn lowest_free_id(taken: &HashSet<String>) -> String {
    let mut number = 1;
    loop {
        let id = format_item_id(number);
        if !taken.contains(&id) {
            return id;
        }
        number += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::{format_item_id, item_number, lowest_free_id};
    use std::collections::HashSet;

    #[test]
    fn item_numbers_parse_only_prefixed_digits() {
        assert_eq!(item_number("I007"), Some(7));
        assert_eq!(item_number(" I120 "), Some(120));
        assert_eq!(item_number("I"), None);
        assert_eq!(item_number("X007"), None);
        assert_eq!(item_number("I7a"), None);
    }

    #[test]
    fn item_ids_are_zero_padded() {
        assert_eq!(format_item_id(7), "I007");
        assert_eq!(format_item_id(1234), "I1234");
    }

    #[test]
    fn lowest_free_id_skips_taken_numbers() {
        let taken: HashSet<String> = ["I001", "I002", "I004"].map(String::from).into();
        assert_eq!(lowest_free_id(&taken), "I003");
        assert_eq!(lowest_free_id(&HashSet::new()), "I001");
    }
}
