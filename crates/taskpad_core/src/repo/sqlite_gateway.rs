//! SQLite-backed task gateway.
//!
//! # Responsibility
//! - Persist the full task collection in the `tasks` table.
//! - Import the legacy blob stored in `legacy_kv`.
//!
//! # Invariants
//! - Write paths call `Task::validate()` before any SQL mutation.
//! - Read paths reject invalid persisted rows instead of masking them.
//! - `save_all` and legacy import each run in a single transaction.

use crate::db::{open_db_at, DbLocation};
use crate::model::task::{EpochMs, Priority, Recurrence, Task, TaskId};
use crate::repo::legacy::{decode_legacy_blob, LEGACY_TASKS_KEY};
use crate::repo::task_gateway::{MigrationOutcome, StorageError, StorageResult, TaskGateway};
use log::{info, warn};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Instant;
use uuid::Uuid;

const TASK_SELECT_SQL: &str = "SELECT
    id,
    text,
    completed,
    priority,
    category,
    due_date,
    recurrence,
    created_at
FROM tasks
ORDER BY position ASC";

/// Task gateway over a lazily opened SQLite connection.
pub struct SqliteTaskGateway {
    location: DbLocation,
    conn: Option<Connection>,
}

impl SqliteTaskGateway {
    pub fn new(location: DbLocation) -> Self {
        Self {
            location,
            conn: None,
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(DbLocation::File(path.into()))
    }

    pub fn in_memory() -> Self {
        Self::new(DbLocation::Memory)
    }

    pub fn location(&self) -> &DbLocation {
        &self.location
    }

    /// Open connection, if `open()` has succeeded.
    pub fn connection(&self) -> Option<&Connection> {
        self.conn.as_ref()
    }

    fn conn(&self) -> StorageResult<&Connection> {
        self.conn.as_ref().ok_or_else(not_open)
    }

    fn conn_mut(&mut self) -> StorageResult<&mut Connection> {
        self.conn.as_mut().ok_or_else(not_open)
    }
}

impl TaskGateway for SqliteTaskGateway {
    fn open(&mut self) -> StorageResult<()> {
        if self.conn.is_some() {
            return Ok(());
        }
        let conn =
            open_db_at(&self.location).map_err(|err| StorageError::Unavailable(err.to_string()))?;
        self.conn = Some(conn);
        Ok(())
    }

    fn load_all(&self) -> StorageResult<Vec<Task>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(TASK_SELECT_SQL).map_err(read_error)?;
        let mut rows = stmt.query([]).map_err(read_error)?;

        let mut tasks = Vec::new();
        while let Some(row) = rows.next().map_err(read_error)? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }

    fn save_all(&mut self, tasks: &[Task]) -> StorageResult<()> {
        for task in tasks {
            task.validate()
                .map_err(|err| StorageError::Write(format!("task {}: {err}", task.id)))?;
        }

        let started_at = Instant::now();
        let conn = self.conn_mut()?;
        let tx = conn.transaction().map_err(write_error)?;
        replace_tasks(&tx, tasks)?;
        tx.commit().map_err(write_error)?;

        info!(
            "event=tasks_save module=gateway status=ok backend=sqlite count={} duration_ms={}",
            tasks.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    fn migrate_legacy(&mut self, now: EpochMs) -> StorageResult<MigrationOutcome> {
        let blob: Option<String> = self
            .conn()?
            .query_row(
                "SELECT value FROM legacy_kv WHERE key = ?1;",
                [LEGACY_TASKS_KEY],
                |row| row.get(0),
            )
            .optional()
            .map_err(read_error)?;
        let Some(blob) = blob else {
            return Ok(MigrationOutcome::NothingToMigrate);
        };

        let imported = match decode_legacy_blob(&blob, now) {
            Ok(tasks) => tasks,
            Err(reason) => {
                warn!(
                    "event=legacy_migrate module=gateway status=skipped backend=sqlite reason={reason}"
                );
                return Ok(MigrationOutcome::Skipped(reason));
            }
        };

        let mut merged = self.load_all()?;
        let existing: HashSet<TaskId> = merged.iter().map(|task| task.id).collect();
        let before = merged.len();
        merged.extend(imported.into_iter().filter(|task| !existing.contains(&task.id)));
        let count = merged.len() - before;

        let conn = self.conn_mut()?;
        let tx = conn.transaction().map_err(write_error)?;
        replace_tasks(&tx, &merged)?;
        tx.execute("DELETE FROM legacy_kv WHERE key = ?1;", [LEGACY_TASKS_KEY])
            .map_err(write_error)?;
        tx.commit().map_err(write_error)?;

        info!("event=legacy_migrate module=gateway status=ok backend=sqlite imported={count}");
        Ok(MigrationOutcome::Imported { count })
    }
}

fn replace_tasks(tx: &Transaction<'_>, tasks: &[Task]) -> StorageResult<()> {
    tx.execute("DELETE FROM tasks;", []).map_err(write_error)?;
    let mut insert = tx
        .prepare(
            "INSERT INTO tasks (
                id,
                position,
                text,
                completed,
                priority,
                category,
                due_date,
                recurrence,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
        )
        .map_err(write_error)?;

    for (position, task) in tasks.iter().enumerate() {
        insert
            .execute(params![
                task.id.to_string(),
                position as i64,
                task.text.as_str(),
                bool_to_int(task.completed),
                task.priority.as_str(),
                task.category.as_deref(),
                task.due_date,
                task.recurrence.as_str(),
                task.created_at,
            ])
            .map_err(write_error)?;
    }
    Ok(())
}

fn parse_task_row(row: &Row<'_>) -> StorageResult<Task> {
    let id_text: String = row.get("id").map_err(read_error)?;
    let id = Uuid::parse_str(&id_text)
        .map_err(|_| invalid_data(format!("invalid uuid `{id_text}` in tasks.id")))?;

    let priority_text: String = row.get("priority").map_err(read_error)?;
    let priority = Priority::parse(&priority_text).ok_or_else(|| {
        invalid_data(format!("invalid priority `{priority_text}` in tasks.priority"))
    })?;

    let recurrence_text: String = row.get("recurrence").map_err(read_error)?;
    let recurrence = Recurrence::parse(&recurrence_text).ok_or_else(|| {
        invalid_data(format!(
            "invalid recurrence `{recurrence_text}` in tasks.recurrence"
        ))
    })?;

    let completed = match row.get::<_, i64>("completed").map_err(read_error)? {
        0 => false,
        1 => true,
        other => {
            return Err(invalid_data(format!(
                "invalid completed value `{other}` in tasks.completed"
            )));
        }
    };

    let task = Task {
        id,
        text: row.get("text").map_err(read_error)?,
        completed,
        priority,
        category: row.get("category").map_err(read_error)?,
        due_date: row.get("due_date").map_err(read_error)?,
        recurrence,
        created_at: row.get("created_at").map_err(read_error)?,
    };
    task.validate()
        .map_err(|err| invalid_data(format!("task {id}: {err}")))?;
    Ok(task)
}

fn not_open() -> StorageError {
    StorageError::Unavailable("gateway is not open".to_string())
}

fn read_error(err: rusqlite::Error) -> StorageError {
    StorageError::Read(err.to_string())
}

fn write_error(err: rusqlite::Error) -> StorageError {
    StorageError::Write(err.to_string())
}

fn invalid_data(message: String) -> StorageError {
    StorageError::Read(format!("invalid persisted task data: {message}"))
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
