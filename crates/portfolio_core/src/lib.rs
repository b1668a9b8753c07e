//! Core domain logic for the portfolio timeline tool.
//! Date normalization, timeline projection and deadline auditing live here;
//! presentation layers only render what this crate computes.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod timeline;

pub use config::{open_record_store, StoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::item::{Item, ItemId, RawDate, RawItem};
pub use model::project::{Project, ProjectId, ProjectValidationError};
pub use model::team::{Team, TeamPalette};
pub use repo::{FileRecordStore, RecordStore, SqliteRecordStore, StoreError, StoreResult};
pub use service::backup::{backup_records, restore_records, BackupReport};
pub use service::export::{export_file_name, items_to_csv, projects_to_csv};
pub use service::migrate::{migrate_records, MigrationReport};
pub use service::portfolio_service::{PortfolioService, SaveReport, ServiceError, ServiceResult};
pub use timeline::deadlines::{compute_team_deadlines, DeadlineRecord, TeamDeadlineChart};
pub use timeline::normalize::{normalize_item_dates, NormalizedItems};
pub use timeline::projector::{compute_timeline, TimelineProjection};
pub use timeline::sequence::{SequenceWarning, WarningReport};
pub use timeline::{AxisConfig, AxisRange};

/// Liveness check used by the CLI.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
