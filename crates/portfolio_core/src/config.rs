//! Record store selection from the process environment.
//!
//! # Invariants
//! - A configured database path selects the SQLite store; otherwise the
//!   flat-file store is used.
//! - Blank variables count as unset.

use crate::repo::{FileRecordStore, RecordStore, SqliteRecordStore, StoreResult};
use log::{error, info};
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "PORTFOLIO_DB_PATH";
pub const DATA_DIR_ENV: &str = "PORTFOLIO_DATA_DIR";
pub const DEFAULT_DATA_DIR: &str = "data";

/// Where records live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// SQLite database file; `None` selects flat files.
    pub db_path: Option<PathBuf>,
    /// Flat-file directory, also the fallback when SQLite cannot be opened.
    pub data_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

impl StoreConfig {
    /// Reads `PORTFOLIO_DB_PATH` and `PORTFOLIO_DATA_DIR`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        Self {
            db_path: non_blank(DB_PATH_ENV).map(PathBuf::from),
            data_dir: non_blank(DATA_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
        }
    }
}

/// Opens the configured store.
///
/// A SQLite open failure is logged and answered with the flat-file store;
/// only a flat-file failure is returned.
pub fn open_record_store(config: &StoreConfig) -> StoreResult<Box<dyn RecordStore>> {
    if let Some(db_path) = &config.db_path {
        match SqliteRecordStore::open(db_path) {
            Ok(store) => {
                info!(
                    "event=store_select module=config status=ok store=sqlite db_path={}",
                    db_path.display()
                );
                return Ok(Box::new(store));
            }
            Err(err) => {
                error!(
                    "event=store_select module=config status=fallback store=file db_path={} error={}",
                    db_path.display(),
                    err
                );
            }
        }
    }

    let store = FileRecordStore::open(config.data_dir.clone())?;
    info!(
        "event=store_select module=config status=ok store=file data_dir={}",
        config.data_dir.display()
    );
    Ok(Box::new(store))
}

#[cfg(test)]
mod tests {
    use super::{open_record_store, StoreConfig, DATA_DIR_ENV, DB_PATH_ENV, DEFAULT_DATA_DIR};
    use crate::model::project::Project;
    use crate::repo::RecordStore;
    use std::collections::HashMap;
    use std::path::PathBuf;

    #[test]
    fn blank_variables_fall_back_to_defaults() {
        let vars = HashMap::from([(DB_PATH_ENV, "   ")]);
        let config = StoreConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.db_path, None);
        assert_eq!(config.data_dir, PathBuf::from(DEFAULT_DATA_DIR));
    }

    #[test]
    fn database_path_selects_sqlite() {
        let vars = HashMap::from([(DB_PATH_ENV, " /tmp/p.db "), (DATA_DIR_ENV, "records")]);
        let config = StoreConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/p.db")));
        assert_eq!(config.data_dir, PathBuf::from("records"));
    }

    #[test]
    fn unopenable_database_falls_back_to_flat_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            db_path: Some(dir.path().join("missing").join("portfolio.db")),
            data_dir: dir.path().join("records"),
        };
        let mut store = open_record_store(&config).unwrap();
        store
            .add_project(&Project::new("P001", "Solar One", "CAISO"))
            .unwrap();
        assert!(dir.path().join("records").join("projects.json").exists());
    }
}
