//! Point-in-time backups of a record store.
//!
//! A backup is a flat-file data directory named after the moment it was
//! taken, so it can be inspected by hand or opened directly as a
//! [`FileRecordStore`].

use crate::repo::store::{RecordStore, StoreError};
use crate::repo::FileRecordStore;
use crate::service::migrate::{migrate_records, MigrationReport};
use crate::service::portfolio_service::ServiceResult;
use chrono::{Local, NaiveDateTime};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

pub const BACKUP_DIR_PREFIX: &str = "timeline_database_backup";

/// Result of a successful backup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupReport {
    pub path: PathBuf,
    pub records: MigrationReport,
}

/// Directory name for a backup taken at `taken_at`.
pub fn backup_dir_name(taken_at: NaiveDateTime) -> String {
    format!("{BACKUP_DIR_PREFIX}_{}", taken_at.format("%Y%m%d_%H%M%S"))
}

/// Backs up `from` into a new directory under `parent`, stamped with the
/// local time.
pub fn backup_records(from: &dyn RecordStore, parent: &Path) -> ServiceResult<BackupReport> {
    backup_records_at(from, parent, Local::now().naive_local())
}

/// Backs up `from` into `parent/<backup_dir_name(taken_at)>`.
///
/// An existing non-empty backup with the same name is never overwritten.
pub fn backup_records_at(
    from: &dyn RecordStore,
    parent: &Path,
    taken_at: NaiveDateTime,
) -> ServiceResult<BackupReport> {
    let path = parent.join(backup_dir_name(taken_at));
    let mut target = FileRecordStore::open(path.clone())?;
    let records = migrate_records(from, &mut target, false)?;
    info!(
        "event=records_backup module=service status=ok path={} projects={} items={}",
        path.display(),
        records.projects,
        records.items
    );
    Ok(BackupReport { path, records })
}

/// Loads a backup directory into `to`; `force` replaces existing records.
pub fn restore_records(
    backup_dir: &Path,
    to: &mut dyn RecordStore,
    force: bool,
) -> ServiceResult<MigrationReport> {
    let metadata = fs::metadata(backup_dir).map_err(StoreError::from)?;
    if !metadata.is_dir() {
        return Err(StoreError::InvalidData(format!(
            "backup path is not a directory: {}",
            backup_dir.display()
        ))
        .into());
    }
    let source = FileRecordStore::open(backup_dir)?;
    let records = migrate_records(&source, to, force)?;
    info!(
        "event=records_restore module=service status=ok path={} projects={} items={}",
        backup_dir.display(),
        records.projects,
        records.items
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::backup_dir_name;
    use chrono::NaiveDate;

    #[test]
    fn backup_names_sort_by_time() {
        let taken_at = NaiveDate::from_ymd_opt(2025, 3, 7)
            .unwrap()
            .and_hms_opt(9, 5, 30)
            .unwrap();
        assert_eq!(
            backup_dir_name(taken_at),
            "timeline_database_backup_20250307_090530"
        );
    }
}
