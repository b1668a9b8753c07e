use chrono::NaiveDate;
use portfolio_core::service::backup::{backup_dir_name, backup_records_at};
use portfolio_core::{
    migrate_records, restore_records, FileRecordStore, Item, Project, RecordStore, ServiceError,
    SqliteRecordStore, StoreError, Team,
};
use std::fs;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn item(id: &str, project_id: &str, name: &str, team: Team) -> Item {
    Item::new(
        id,
        project_id,
        name,
        team,
        Some(date(2025, 1, 1)),
        Some(date(2025, 4, 1)),
    )
}

fn seed(store: &mut dyn RecordStore) {
    let mut solar = Project::new("P001", "Solar One", "CAISO");
    solar.voltage = 230;
    solar.target_cod = Some(date(2026, 6, 30));
    store.add_project(&solar).unwrap();
    store
        .add_project(&Project::new("P002", "Wind Two", "ERCOT"))
        .unwrap();
    store
        .replace_items(
            "P001",
            &[
                item("I002", "P001", "Build", Team::Construction),
                item("I001", "P001", "Permit", Team::Development),
            ],
        )
        .unwrap();
    store
        .replace_items("P002", &[item("I003", "P002", "Turbines", Team::Procurement)])
        .unwrap();
}

fn item_ids(store: &dyn RecordStore) -> Vec<String> {
    store
        .list_all_items()
        .unwrap()
        .into_iter()
        .map(|item| item.item_id)
        .collect()
}

#[test]
fn flat_files_move_into_sqlite_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut files = FileRecordStore::open(dir.path()).unwrap();
    seed(&mut files);
    let mut sqlite = SqliteRecordStore::open_in_memory().unwrap();

    let report = migrate_records(&files, &mut sqlite, false).unwrap();

    assert_eq!(report.projects, 2);
    assert_eq!(report.items, 3);
    assert_eq!(report.cleared_projects, 0);
    let solar = sqlite.get_project("P001").unwrap();
    assert_eq!(solar.voltage, 230);
    assert_eq!(solar.target_cod, Some(date(2026, 6, 30)));
    assert_eq!(item_ids(&sqlite), vec!["I002", "I001", "I003"]);
    assert_eq!(sqlite.list_items("P002").unwrap()[0].team, Team::Procurement);
    assert_eq!(sqlite.list_items("P001").unwrap()[0].months, 3);
}

#[test]
fn populated_target_is_left_alone_without_force() {
    let dir = tempfile::tempdir().unwrap();
    let mut files = FileRecordStore::open(dir.path()).unwrap();
    seed(&mut files);
    let mut sqlite = SqliteRecordStore::open_in_memory().unwrap();
    sqlite
        .add_project(&Project::new("P900", "Existing", "PJM"))
        .unwrap();

    let err = migrate_records(&files, &mut sqlite, false).unwrap_err();

    assert!(matches!(err, ServiceError::TargetNotEmpty { projects: 1 }));
    let ids: Vec<String> = sqlite
        .list_projects()
        .unwrap()
        .into_iter()
        .map(|project| project.id)
        .collect();
    assert_eq!(ids, vec!["P900"]);
}

#[test]
fn force_replaces_target_records() {
    let dir = tempfile::tempdir().unwrap();
    let mut files = FileRecordStore::open(dir.path()).unwrap();
    seed(&mut files);
    let mut sqlite = SqliteRecordStore::open_in_memory().unwrap();
    sqlite
        .add_project(&Project::new("P001", "Stale", "PJM"))
        .unwrap();
    sqlite
        .replace_items("P001", &[item("I001", "P001", "Old", Team::Construction)])
        .unwrap();

    let report = migrate_records(&files, &mut sqlite, true).unwrap();

    assert_eq!(report.cleared_projects, 1);
    assert_eq!(sqlite.get_project("P001").unwrap().name, "Solar One");
    assert_eq!(item_ids(&sqlite), vec!["I002", "I001", "I003"]);
}

#[test]
fn item_id_shared_by_two_projects_is_rejected_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let mut files = FileRecordStore::open(dir.path()).unwrap();
    seed(&mut files);
    files
        .replace_items("P002", &[item("I001", "P002", "Turbines", Team::Procurement)])
        .unwrap();
    let mut sqlite = SqliteRecordStore::open_in_memory().unwrap();

    let err = migrate_records(&files, &mut sqlite, false).unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Store(StoreError::InvalidData(message)) if message.contains("I001")
    ));
    assert!(sqlite.list_projects().unwrap().is_empty());
}

#[test]
fn backup_restores_into_a_fresh_database() {
    let backups = tempfile::tempdir().unwrap();
    let mut source = SqliteRecordStore::open_in_memory().unwrap();
    seed(&mut source);
    let taken_at = date(2025, 3, 7).and_hms_opt(9, 5, 30).unwrap();

    let backup = backup_records_at(&source, backups.path(), taken_at).unwrap();

    assert_eq!(backup.path, backups.path().join(backup_dir_name(taken_at)));
    assert_eq!(backup.records.items, 3);
    assert!(backup.path.join("projects.json").is_file());

    let mut restored = SqliteRecordStore::open_in_memory().unwrap();
    let report = restore_records(&backup.path, &mut restored, false).unwrap();
    assert_eq!(report.projects, 2);
    assert_eq!(item_ids(&restored), item_ids(&source));
    assert_eq!(
        restored.get_project("P001").unwrap(),
        source.get_project("P001").unwrap()
    );

    // Same timestamp again must not overwrite the first backup.
    assert!(matches!(
        backup_records_at(&source, backups.path(), taken_at),
        Err(ServiceError::TargetNotEmpty { projects: 2 })
    ));
}

#[test]
fn restoring_from_missing_directory_fails_without_creating_it() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");
    let mut target = SqliteRecordStore::open_in_memory().unwrap();

    let err = restore_records(&missing, &mut target, false).unwrap_err();

    assert!(matches!(err, ServiceError::Store(StoreError::Io(_))));
    assert!(!missing.exists());
    assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
}
