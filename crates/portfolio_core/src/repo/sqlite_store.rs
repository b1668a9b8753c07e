//! SQLite-backed record store.
//!
//! # Responsibility
//! - Persist projects and items in the migrated relational schema.
//! - Keep insertion order stable through explicit `position` columns.
//!
//! # Invariants
//! - The owned connection has `foreign_keys=ON`, so deleting a project
//!   cascades to its items.
//! - Dates are stored as `YYYY-MM-DD` text and re-parsed on read; `months`
//!   is recomputed rather than trusted.
//! - `replace_items` runs in one immediate transaction.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::{open_db, open_db_in_memory};
use crate::model::item::Item;
use crate::model::project::Project;
use crate::model::team::Team;
use crate::repo::store::{RecordStore, StoreError, StoreResult};
use crate::timeline::dates::{format_date, parse_date_text};
use chrono::NaiveDate;
use log::{info, warn};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::path::Path;

const PROJECT_COLUMNS: &str = "id, name, iso, voltage, capacity, duration, target_cod";
const ITEM_COLUMNS: &str =
    "i.item_id, i.project_id, i.item_name, i.team, i.start_date, i.end_date";

/// Record store owning one migrated SQLite connection.
pub struct SqliteRecordStore {
    conn: Connection,
}

impl SqliteRecordStore {
    /// Opens (and migrates) a database file.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::from_connection(open_db(path)?)
    }

    /// Opens a fresh in-memory database.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(open_db_in_memory()?)
    }

    /// Wraps an already migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when `user_version` is not the latest.
    /// - `InvalidData` when a required table is missing.
    pub fn from_connection(conn: Connection) -> StoreResult<Self> {
        ensure_connection_ready(&conn)?;
        Ok(Self { conn })
    }

    /// Borrow of the underlying connection, for diagnostics and tests.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn project_exists(&self, id: &str) -> StoreResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM projects WHERE id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

impl RecordStore for SqliteRecordStore {
    fn list_projects(&self) -> StoreResult<Vec<Project>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY position ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }
        Ok(projects)
    }

    fn get_project(&self, id: &str) -> StoreResult<Project> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => parse_project_row(row),
            None => Err(StoreError::ProjectNotFound(id.to_string())),
        }
    }

    fn add_project(&mut self, project: &Project) -> StoreResult<()> {
        project.validate()?;
        if self.project_exists(&project.id)? {
            return Err(StoreError::DuplicateProject(project.id.clone()));
        }
        self.conn.execute(
            "INSERT INTO projects (id, name, iso, voltage, capacity, duration, target_cod, position)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7,
                     (SELECT COALESCE(MAX(position) + 1, 0) FROM projects));",
            params![
                project.id,
                project.name,
                project.iso,
                project.voltage,
                project.capacity,
                project.duration,
                project.target_cod.map(format_date),
            ],
        )?;
        info!(
            "event=project_add module=repo status=ok store=sqlite project_id={}",
            project.id
        );
        Ok(())
    }

    fn update_project(&mut self, project: &Project) -> StoreResult<()> {
        project.validate()?;
        let changed = self.conn.execute(
            "UPDATE projects
             SET name = ?2, iso = ?3, voltage = ?4, capacity = ?5, duration = ?6, target_cod = ?7
             WHERE id = ?1;",
            params![
                project.id,
                project.name,
                project.iso,
                project.voltage,
                project.capacity,
                project.duration,
                project.target_cod.map(format_date),
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::ProjectNotFound(project.id.clone()));
        }
        Ok(())
    }

    fn delete_project(&mut self, id: &str) -> StoreResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM projects WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(StoreError::ProjectNotFound(id.to_string()));
        }
        info!("event=project_delete module=repo status=ok store=sqlite project_id={id}");
        Ok(())
    }

    fn list_items(&self, project_id: &str) -> StoreResult<Vec<Item>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ITEM_COLUMNS} FROM items i WHERE i.project_id = ?1 ORDER BY i.position ASC;"
        ))?;
        let mut rows = stmt.query([project_id])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }
        Ok(items)
    }

    fn list_all_items(&self) -> StoreResult<Vec<Item>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ITEM_COLUMNS}
             FROM items i
             JOIN projects p ON p.id = i.project_id
             ORDER BY p.position ASC, i.position ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }
        Ok(items)
    }

    fn replace_items(&mut self, project_id: &str, items: &[Item]) -> StoreResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let known: Option<i64> = tx
            .query_row("SELECT 1 FROM projects WHERE id = ?1;", [project_id], |row| {
                row.get(0)
            })
            .optional()?;
        if known.is_none() {
            return Err(StoreError::ProjectNotFound(project_id.to_string()));
        }

        let removed = tx.execute("DELETE FROM items WHERE project_id = ?1;", [project_id])?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO items (item_id, project_id, item_name, team, start_date, end_date, months, position)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            )?;
            for (position, item) in items.iter().enumerate() {
                insert.execute(params![
                    item.item_id,
                    project_id,
                    item.item_name,
                    item.team.as_str(),
                    item.start_date.map(format_date),
                    item.end_date.map(format_date),
                    item.months,
                    i64::try_from(position).unwrap_or(i64::MAX),
                ])?;
            }
        }
        tx.commit()?;

        info!(
            "event=items_replace module=repo status=ok store=sqlite project_id={} removed={} inserted={}",
            project_id,
            removed,
            items.len()
        );
        Ok(())
    }
}

fn parse_project_row(row: &Row<'_>) -> StoreResult<Project> {
    let id: String = row.get("id")?;
    let target_cod = stored_date(row.get("target_cod")?, "projects.target_cod", &id);
    Ok(Project {
        name: row.get("name")?,
        iso: row.get("iso")?,
        voltage: row.get("voltage")?,
        capacity: row.get("capacity")?,
        duration: row.get("duration")?,
        target_cod,
        id,
    })
}

fn parse_item_row(row: &Row<'_>) -> StoreResult<Item> {
    let item_id: String = row.get("item_id")?;
    let team = stored_team(row.get("team")?, &item_id);
    let start_date = stored_date(row.get("start_date")?, "items.start_date", &item_id);
    let end_date = stored_date(row.get("end_date")?, "items.end_date", &item_id);

    Ok(Item::new(
        item_id,
        row.get::<_, String>("project_id")?,
        row.get::<_, String>("item_name")?,
        team,
        start_date,
        end_date,
    ))
}

fn stored_team(value: Option<String>, record_id: &str) -> Team {
    let text = value.unwrap_or_default();
    Team::parse(&text).unwrap_or_else(|| {
        warn!(
            "event=team_read module=repo status=recovered column=items.team record_id={record_id} fallback={}",
            Team::DEFAULT.as_str()
        );
        Team::DEFAULT
    })
}

fn stored_date(value: Option<String>, column: &str, record_id: &str) -> Option<NaiveDate> {
    let text = value?;
    let parsed = parse_date_text(&text);
    if parsed.is_none() && !text.trim().is_empty() {
        warn!(
            "event=date_read module=repo status=recovered column={column} record_id={record_id}"
        );
    }
    parsed
}

fn ensure_connection_ready(conn: &Connection) -> StoreResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in ["projects", "items"] {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
            [table],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(StoreError::InvalidData(format!(
                "record store requires table `{table}`"
            )));
        }
    }
    Ok(())
}
