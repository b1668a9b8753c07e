//! Record store trait and its error type.

use crate::model::item::Item;
use crate::model::project::{Project, ProjectId, ProjectValidationError};
use crate::model::team::TeamPalette;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from record store operations.
#[derive(Debug)]
pub enum StoreError {
    /// SQLite open or query failure.
    Sqlite(rusqlite::Error),
    /// Database was written by a newer build.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Flat-file read/write failure.
    Io(std::io::Error),
    /// Flat-file content is not valid JSON for the expected shape.
    Serde(serde_json::Error),
    /// Project failed field validation.
    Validation(ProjectValidationError),
    ProjectNotFound(ProjectId),
    DuplicateProject(ProjectId),
    /// Connection is not migrated to the schema this build expects.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Persisted data cannot be converted to a valid record.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "portfolio database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::Io(err) => write!(f, "record file error: {err}"),
            Self::Serde(err) => write!(f, "record file is not valid JSON: {err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::DuplicateProject(id) => write!(f, "project already exists: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "record store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid record data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Serde(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. }
            | Self::ProjectNotFound(_)
            | Self::DuplicateProject(_)
            | Self::UninitializedConnection { .. }
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value)
    }
}

impl From<ProjectValidationError> for StoreError {
    fn from(value: ProjectValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Persistence collaborator for projects and their items.
///
/// Calls are synchronous and blocking. Writers take `&mut self`; concurrent
/// edits are not coordinated.
pub trait RecordStore {
    /// Projects in insertion order.
    fn list_projects(&self) -> StoreResult<Vec<Project>>;

    fn get_project(&self, id: &str) -> StoreResult<Project>;

    /// Inserts a new project; an existing id is `DuplicateProject`.
    fn add_project(&mut self, project: &Project) -> StoreResult<()>;

    /// Overwrites the attributes of an existing project.
    fn update_project(&mut self, project: &Project) -> StoreResult<()>;

    /// Removes a project and all of its items.
    fn delete_project(&mut self, id: &str) -> StoreResult<()>;

    /// Items of one project in saved order; empty when it has none.
    fn list_items(&self, project_id: &str) -> StoreResult<Vec<Item>>;

    /// Items of every project, grouped by project insertion order.
    fn list_all_items(&self) -> StoreResult<Vec<Item>>;

    /// Replaces every item of `project_id` with `items` in one operation.
    fn replace_items(&mut self, project_id: &str, items: &[Item]) -> StoreResult<()>;

    fn team_color_map(&self) -> StoreResult<TeamPalette> {
        Ok(TeamPalette::default())
    }
}

impl<S: RecordStore + ?Sized> RecordStore for Box<S> {
    fn list_projects(&self) -> StoreResult<Vec<Project>> {
        (**self).list_projects()
    }

    fn get_project(&self, id: &str) -> StoreResult<Project> {
        (**self).get_project(id)
    }

    fn add_project(&mut self, project: &Project) -> StoreResult<()> {
        (**self).add_project(project)
    }

    fn update_project(&mut self, project: &Project) -> StoreResult<()> {
        (**self).update_project(project)
    }

    fn delete_project(&mut self, id: &str) -> StoreResult<()> {
        (**self).delete_project(id)
    }

    fn list_items(&self, project_id: &str) -> StoreResult<Vec<Item>> {
        (**self).list_items(project_id)
    }

    fn list_all_items(&self) -> StoreResult<Vec<Item>> {
        (**self).list_all_items()
    }

    fn replace_items(&mut self, project_id: &str, items: &[Item]) -> StoreResult<()> {
        (**self).replace_items(project_id, items)
    }

    fn team_color_map(&self) -> StoreResult<TeamPalette> {
        (**self).team_color_map()
    }
}
