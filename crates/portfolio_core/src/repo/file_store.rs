//! JSON flat-file record store.
//!
//! # Responsibility
//! - Persist projects and items as `projects.json` / `items.json` in one
//!   data directory.
//! - Re-normalize item rows on read so hand-edited files stay usable.
//!
//! # Invariants
//! - A missing file reads as an empty collection.
//! - Every write goes to a temporary sibling file that is persisted over
//!   the target, so readers never observe a partial file.

use crate::model::item::{Item, RawDate, RawItem};
use crate::model::project::Project;
use crate::repo::store::{RecordStore, StoreError, StoreResult};
use crate::timeline::dates::parse_date;
use crate::timeline::normalize::normalize_item_dates;
use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const PROJECTS_FILE: &str = "projects.json";
pub const ITEMS_FILE: &str = "items.json";

/// Record store backed by two JSON documents.
#[derive(Debug, Clone)]
pub struct FileRecordStore {
    data_dir: PathBuf,
}

/// On-disk project shape; tolerates free-form COD text.
#[derive(Debug, Serialize, Deserialize)]
struct ProjectRecord {
    id: String,
    name: String,
    iso: String,
    #[serde(default)]
    voltage: i64,
    #[serde(default)]
    capacity: f64,
    #[serde(default)]
    duration: f64,
    #[serde(default)]
    target_cod: RawDate,
}

impl From<&Project> for ProjectRecord {
    fn from(value: &Project) -> Self {
        Self {
            id: value.id.clone(),
            name: value.name.clone(),
            iso: value.iso.clone(),
            voltage: value.voltage,
            capacity: value.capacity,
            duration: value.duration,
            target_cod: value.target_cod.into(),
        }
    }
}

impl From<ProjectRecord> for Project {
    fn from(value: ProjectRecord) -> Self {
        Self {
            target_cod: parse_date(&value.target_cod),
            id: value.id,
            name: value.name,
            iso: value.iso,
            voltage: value.voltage,
            capacity: value.capacity,
            duration: value.duration,
        }
    }
}

impl FileRecordStore {
    /// Uses `data_dir`, creating it when absent.
    pub fn open(data_dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)?;
        info!(
            "event=store_open module=repo status=ok store=file data_dir={}",
            data_dir.display()
        );
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn projects_path(&self) -> PathBuf {
        self.data_dir.join(PROJECTS_FILE)
    }

    fn items_path(&self) -> PathBuf {
        self.data_dir.join(ITEMS_FILE)
    }

    fn load_projects(&self) -> StoreResult<Vec<Project>> {
        let records: Vec<ProjectRecord> = read_json_or_default(&self.projects_path())?;
        Ok(records.into_iter().map(Project::from).collect())
    }

    fn save_projects(&self, projects: &[Project]) -> StoreResult<()> {
        let records: Vec<ProjectRecord> = projects.iter().map(ProjectRecord::from).collect();
        write_json_atomic(&self.projects_path(), &records)
    }

    fn load_items(&self) -> StoreResult<Vec<Item>> {
        let rows: Vec<RawItem> = read_json_or_default(&self.items_path())?;
        let normalized = normalize_item_dates(&rows);
        if normalized.unparseable_dates > 0 {
            warn!(
                "event=items_read module=repo status=recovered store=file unparseable_dates={}",
                normalized.unparseable_dates
            );
        }
        Ok(normalized.items)
    }

    fn save_items(&self, items: &[Item]) -> StoreResult<()> {
        write_json_atomic(&self.items_path(), items)
    }
}

impl RecordStore for FileRecordStore {
    fn list_projects(&self) -> StoreResult<Vec<Project>> {
        self.load_projects()
    }

    fn get_project(&self, id: &str) -> StoreResult<Project> {
        self.load_projects()?
            .into_iter()
            .find(|project| project.id == id)
            .ok_or_else(|| StoreError::ProjectNotFound(id.to_string()))
    }

    fn add_project(&mut self, project: &Project) -> StoreResult<()> {
        project.validate()?;
        let mut projects = self.load_projects()?;
        if projects.iter().any(|existing| existing.id == project.id) {
            return Err(StoreError::DuplicateProject(project.id.clone()));
        }
        projects.push(project.clone());
        self.save_projects(&projects)?;
        info!(
            "event=project_add module=repo status=ok store=file project_id={}",
            project.id
        );
        Ok(())
    }

    fn update_project(&mut self, project: &Project) -> StoreResult<()> {
        project.validate()?;
        let mut projects = self.load_projects()?;
        let Some(slot) = projects.iter_mut().find(|existing| existing.id == project.id) else {
            return Err(StoreError::ProjectNotFound(project.id.clone()));
        };
        *slot = project.clone();
        self.save_projects(&projects)
    }

    fn delete_project(&mut self, id: &str) -> StoreResult<()> {
        let mut projects = self.load_projects()?;
        let before = projects.len();
        projects.retain(|project| project.id != id);
        if projects.len() == before {
            return Err(StoreError::ProjectNotFound(id.to_string()));
        }

        let mut items = self.load_items()?;
        let item_count = items.len();
        items.retain(|item| item.project_id != id);
        let removed_items = item_count - items.len();

        // Items first; orphan items must never outlive their project.
        self.save_items(&items)?;
        self.save_projects(&projects)?;
        info!(
            "event=project_delete module=repo status=ok store=file project_id={id} removed_items={removed_items}"
        );
        Ok(())
    }

    fn list_items(&self, project_id: &str) -> StoreResult<Vec<Item>> {
        Ok(self
            .load_items()?
            .into_iter()
            .filter(|item| item.project_id == project_id)
            .collect())
    }

    fn list_all_items(&self) -> StoreResult<Vec<Item>> {
        let projects = self.load_projects()?;
        let items = self.load_items()?;
        let mut ordered = Vec::with_capacity(items.len());
        for project in &projects {
            ordered.extend(
                items
                    .iter()
                    .filter(|item| item.project_id == project.id)
                    .cloned(),
            );
        }
        Ok(ordered)
    }

    fn replace_items(&mut self, project_id: &str, items: &[Item]) -> StoreResult<()> {
        if !self
            .load_projects()?
            .iter()
            .any(|project| project.id == project_id)
        {
            return Err(StoreError::ProjectNotFound(project_id.to_string()));
        }

        let mut stored = self.load_items()?;
        let before = stored.len();
        stored.retain(|item| item.project_id != project_id);
        let removed = before - stored.len();
        stored.extend(items.iter().cloned().map(|mut item| {
            item.project_id = project_id.to_string();
            item
        }));
        self.save_items(&stored)?;

        info!(
            "event=items_replace module=repo status=ok store=file project_id={} removed={} inserted={}",
            project_id,
            removed,
            items.len()
        );
        Ok(())
    }
}

fn read_json_or_default<T>(path: &Path) -> StoreResult<T>
where
    T: DeserializeOwned + Default,
{
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(T::default()),
        Err(err) => return Err(err.into()),
    };
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Serializes `value` into a temp file beside `path`, then persists it
/// over `path` and syncs the directory entry.
fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> StoreResult<()> {
    let parent = path.parent().ok_or_else(|| {
        StoreError::InvalidData(format!("record path has no parent: {}", path.display()))
    })?;
    let bytes = serde_json::to_vec_pretty(value)?;

    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(&bytes)?;
    temp.flush()?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|err| err.error)?;

    sync_dir(parent)?;
    Ok(())
}

/// Makes a completed rename durable.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> StoreResult<()> {
    File::open(dir)?.sync_all()?;
    Ok(())
}

// Directory handles cannot be synced on this platform.
#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> StoreResult<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{write_json_atomic, FileRecordStore, ITEMS_FILE};
    use crate::repo::store::RecordStore;
    use std::fs;

    #[test]
    fn missing_files_read_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRecordStore::open(dir.path()).unwrap();
        assert!(store.list_projects().unwrap().is_empty());
        assert!(store.list_all_items().unwrap().is_empty());
    }

    #[test]
    fn atomic_write_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(ITEMS_FILE);
        write_json_atomic(&path, &vec![1, 2, 3]).unwrap();
        write_json_atomic(&path, &vec![4]).unwrap();

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![ITEMS_FILE.to_string()]);
        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written.replace(char::is_whitespace, ""), "[4]");
    }

    #[test]
    fn failed_persist_cleans_up_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join(ITEMS_FILE);
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep"), b"x").unwrap();

        assert!(write_json_atomic(&target, &vec![1]).is_err());

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![ITEMS_FILE.to_string()]);
    }
}
