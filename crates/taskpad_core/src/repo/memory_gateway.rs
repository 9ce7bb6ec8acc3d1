//! In-memory task gateway.
//!
//! Keeps the "stored" collection in process memory. Useful for embedding
//! without a database and for exercising failure paths: open, read and write
//! failures can be switched on at runtime.

use crate::model::task::{EpochMs, Task, TaskId};
use crate::repo::legacy::decode_legacy_blob;
use crate::repo::task_gateway::{MigrationOutcome, StorageError, StorageResult, TaskGateway};
use log::{info, warn};
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct MemoryTaskGateway {
    opened: bool,
    stored: Vec<Task>,
    legacy_blob: Option<String>,
    fail_open: bool,
    fail_reads: bool,
    fail_writes: bool,
    save_count: usize,
}

impl MemoryTaskGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates the stored collection.
    pub fn with_tasks(mut self, tasks: Vec<Task>) -> Self {
        self.stored = tasks;
        self
    }

    /// Pre-populates the legacy key-value blob.
    pub fn with_legacy_blob(mut self, blob: impl Into<String>) -> Self {
        self.legacy_blob = Some(blob.into());
        self
    }

    pub fn set_fail_open(&mut self, enabled: bool) {
        self.fail_open = enabled;
    }

    pub fn set_fail_reads(&mut self, enabled: bool) {
        self.fail_reads = enabled;
    }

    pub fn set_fail_writes(&mut self, enabled: bool) {
        self.fail_writes = enabled;
    }

    /// Currently stored collection.
    pub fn stored(&self) -> &[Task] {
        &self.stored
    }

    pub fn legacy_blob(&self) -> Option<&str> {
        self.legacy_blob.as_deref()
    }

    /// Number of successful `save_all` calls.
    pub fn save_count(&self) -> usize {
        self.save_count
    }

    fn ensure_open(&self) -> StorageResult<()> {
        if self.opened {
            Ok(())
        } else {
            Err(StorageError::Unavailable("gateway is not open".to_string()))
        }
    }

    fn replace(&mut self, tasks: &[Task]) -> StorageResult<()> {
        if self.fail_writes {
            return Err(StorageError::Write("memory writes disabled".to_string()));
        }
        let mut ids: HashSet<TaskId> = HashSet::with_capacity(tasks.len());
        for task in tasks {
            task.validate()
                .map_err(|err| StorageError::Write(format!("task {}: {err}", task.id)))?;
            if !ids.insert(task.id) {
                return Err(StorageError::Write(format!("duplicate task id {}", task.id)));
            }
        }
        self.stored = tasks.to_vec();
        self.save_count += 1;
        Ok(())
    }
}

impl TaskGateway for MemoryTaskGateway {
    fn open(&mut self) -> StorageResult<()> {
        if self.fail_open {
            return Err(StorageError::Unavailable(
                "memory medium disabled".to_string(),
            ));
        }
        self.opened = true;
        Ok(())
    }

    fn load_all(&self) -> StorageResult<Vec<Task>> {
        self.ensure_open()?;
        if self.fail_reads {
            return Err(StorageError::Read("memory reads disabled".to_string()));
        }
        for task in &self.stored {
            task.validate()
                .map_err(|err| StorageError::Read(format!("task {}: {err}", task.id)))?;
        }
        Ok(self.stored.clone())
    }

    fn save_all(&mut self, tasks: &[Task]) -> StorageResult<()> {
        self.ensure_open()?;
        self.replace(tasks)?;
        info!(
            "event=tasks_save module=gateway status=ok backend=memory count={}",
            tasks.len()
        );
        Ok(())
    }

    fn migrate_legacy(&mut self, now: EpochMs) -> StorageResult<MigrationOutcome> {
        self.ensure_open()?;
        let Some(blob) = self.legacy_blob.as_deref() else {
            return Ok(MigrationOutcome::NothingToMigrate);
        };

        let imported = match decode_legacy_blob(blob, now) {
            Ok(tasks) => tasks,
            Err(reason) => {
                warn!(
                    "event=legacy_migrate module=gateway status=skipped backend=memory reason={reason}"
                );
                return Ok(MigrationOutcome::Skipped(reason));
            }
        };

        let mut merged = self.load_all()?;
        let existing: HashSet<TaskId> = merged.iter().map(|task| task.id).collect();
        let before = merged.len();
        merged.extend(imported.into_iter().filter(|task| !existing.contains(&task.id)));
        let count = merged.len() - before;

        self.replace(&merged)?;
        self.legacy_blob = None;

        info!("event=legacy_migrate module=gateway status=ok backend=memory imported={count}");
        Ok(MigrationOutcome::Imported { count })
    }
}
