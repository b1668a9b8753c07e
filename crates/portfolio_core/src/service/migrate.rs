//! Copying every record from one store into another.
//!
//! Used to move a flat-file data directory into SQLite and by the backup
//! and restore paths.
//!
//! # Invariants
//! - A target that already holds projects is only overwritten with `force`.
//! - The source is fully read and checked before the target is touched.
//! - Project order and per-project item order are preserved.

use crate::model::item::Item;
use crate::repo::store::{RecordStore, StoreError};
use crate::service::portfolio_service::{ServiceError, ServiceResult};
use log::{info, warn};
use std::collections::HashSet;

/// Outcome of a store-to-store copy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub projects: usize,
    pub items: usize,
    /// Target projects deleted before copying.
    pub cleared_projects: usize,
}

/// Copies all projects and items of `from` into `to`.
///
/// # Errors
/// - [`ServiceError::TargetNotEmpty`] when `to` has projects and `force` is
///   false; the target is left as it was.
/// - [`StoreError::InvalidData`] when one item id is used by two source
///   projects, which a relational target would reject halfway.
pub fn migrate_records(
    from: &dyn RecordStore,
    to: &mut dyn RecordStore,
    force: bool,
) -> ServiceResult<MigrationReport> {
    let existing = to.list_projects()?;
    if !existing.is_empty() && !force {
        warn!(
            "event=records_migrate module=service status=rejected reason=target_not_empty projects={}",
            existing.len()
        );
        return Err(ServiceError::TargetNotEmpty {
            projects: existing.len(),
        });
    }

    let projects = from.list_projects()?;
    let mut batches: Vec<Vec<Item>> = Vec::with_capacity(projects.len());
    let mut item_ids: HashSet<String> = HashSet::new();
    for project in &projects {
        let items = from.list_items(&project.id)?;
        for item in &items {
            if !item_ids.insert(item.item_id.clone()) {
                return Err(StoreError::InvalidData(format!(
                    "item id `{}` is used by more than one project",
                    item.item_id
                ))
                .into());
            }
        }
        batches.push(items);
    }
    info!(
        "event=records_migrate module=service status=start projects={} items={} force={}",
        projects.len(),
        item_ids.len(),
        force
    );

    for project in &existing {
        to.delete_project(&project.id)?;
    }

    let mut copied_items = 0;
    for (project, items) in projects.iter().zip(&batches) {
        to.add_project(project)?;
        to.replace_items(&project.id, items)?;
        copied_items += items.len();
    }

    let report = MigrationReport {
        projects: projects.len(),
        items: copied_items,
        cleared_projects: existing.len(),
    };
    info!(
        "event=records_migrate module=service status=ok projects={} items={} cleared_projects={}",
        report.projects, report.items, report.cleared_projects
    );
    Ok(report)
}
