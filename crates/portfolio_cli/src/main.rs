//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `portfolio_core` linkage with deterministic output.
//! - `deadlines` prints the cross-project deadline report of the configured
//!   record store.
//! - `migrate [--force]` copies the flat-file data directory into the
//!   configured SQLite database.
//! - `backup <dir>` and `restore <dir> [--force]` snapshot and reload the
//!   configured record store.

use log::error;
use portfolio_core::{
    backup_records, default_log_level, init_logging, migrate_records, open_record_store,
    restore_records, AxisConfig, FileRecordStore, MigrationReport, PortfolioService,
    SqliteRecordStore, StoreConfig,
};
use std::path::Path;
use std::process::ExitCode;

const LOG_DIR_ENV: &str = "PORTFOLIO_LOG_DIR";
const LOG_LEVEL_ENV: &str = "PORTFOLIO_LOG_LEVEL";
const FORCE_FLAG: &str = "--force";
const USAGE: &str =
    "expected `deadlines`, `migrate [--force]`, `backup <dir>` or `restore <dir> [--force]`";

fn main() -> ExitCode {
    init_logging_from_env();

    println!("portfolio_core ping={}", portfolio_core::ping());
    println!("portfolio_core version={}", portfolio_core::core_version());

    let args: Vec<String> = std::env::args().skip(1).collect();
    let force = args.iter().any(|arg| arg == FORCE_FLAG);
    let positional: Vec<&str> = args
        .iter()
        .map(String::as_str)
        .filter(|arg| *arg != FORCE_FLAG)
        .collect();

    let (command, outcome) = match positional.as_slice() {
        [] => return ExitCode::SUCCESS,
        ["deadlines"] => ("deadlines", print_deadlines()),
        ["migrate"] => ("migrate", migrate(force)),
        ["backup", dir] => ("backup", backup(Path::new(dir))),
        ["restore", dir] => ("restore", restore(Path::new(dir), force)),
        [other, ..] => {
            eprintln!("unknown command `{other}`; {USAGE}");
            return ExitCode::from(2);
        }
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("event=cli_{command} module=cli status=error error={message}");
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging_from_env() {
    let Ok(log_dir) = std::env::var(LOG_DIR_ENV) else {
        return;
    };
    let level = std::env::var(LOG_LEVEL_ENV).unwrap_or_else(|_| default_log_level().to_string());
    if let Err(err) = init_logging(&level, &log_dir) {
        eprintln!("logging disabled: {err}");
    }
}

fn print_deadlines() -> Result<(), String> {
    let config = StoreConfig::from_env();
    let store = open_record_store(&config).map_err(|err| err.to_string())?;
    let service = PortfolioService::new(store);
    let chart = service
        .team_deadlines(&[], &AxisConfig::default())
        .map_err(|err| err.to_string())?;

    if chart.is_empty() {
        println!("no deadlines recorded");
        return Ok(());
    }

    for record in &chart.records {
        println!(
            "{}\t{}\t{}\t{}",
            record.project_name, record.iso, record.team, record.deadline
        );
    }
    for warning in chart.warnings.details() {
        println!("warning\t{}\t{}", warning.project_name, warning.message());
    }
    Ok(())
}

fn migrate(force: bool) -> Result<(), String> {
    let config = StoreConfig::from_env();
    let db_path = config
        .db_path
        .as_ref()
        .ok_or("PORTFOLIO_DB_PATH is not set; nothing to migrate into")?;
    let source = FileRecordStore::open(config.data_dir.clone()).map_err(|err| err.to_string())?;
    let mut target = SqliteRecordStore::open(db_path).map_err(|err| err.to_string())?;
    let report = migrate_records(&source, &mut target, force).map_err(|err| err.to_string())?;
    print_report("migrated", &report);
    Ok(())
}

fn backup(dir: &Path) -> Result<(), String> {
    let store = open_record_store(&StoreConfig::from_env()).map_err(|err| err.to_string())?;
    let backup = backup_records(&*store, dir).map_err(|err| err.to_string())?;
    print_report("backed up", &backup.records);
    println!("backup\t{}", backup.path.display());
    Ok(())
}

fn restore(dir: &Path, force: bool) -> Result<(), String> {
    let mut store = open_record_store(&StoreConfig::from_env()).map_err(|err| err.to_string())?;
    let report = restore_records(dir, &mut *store, force).map_err(|err| err.to_string())?;
    print_report("restored", &report);
    Ok(())
}

fn print_report(action: &str, report: &MigrationReport) {
    println!(
        "{action}\tprojects={}\titems={}\tcleared_projects={}",
        report.projects, report.items, report.cleared_projects
    );
}
