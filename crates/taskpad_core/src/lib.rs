//! Core domain logic for Taskpad, a local-first personal task tracker.
//! This crate is the single source of truth for task invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod schedule;
pub mod service;
pub mod view;

pub use db::{DbError, DbLocation};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::task::{
    CategoryChoice, EpochMs, Priority, Recurrence, Task, TaskDraft, TaskId, TaskValidationError,
};
pub use repo::memory_gateway::MemoryTaskGateway;
pub use repo::sqlite_gateway::SqliteTaskGateway;
pub use repo::task_gateway::{
    LegacySkipReason, MigrationOutcome, StorageError, StorageResult, TaskGateway,
};
pub use schedule::{
    format_due_date, next_due_date, parse_due_date, Clock, ManualClock, SystemClock,
};
pub use service::task_store::{
    StoreEvent, TaskStore, TaskStoreConfig, ToggleOutcome, DEFAULT_PRESET_CATEGORIES,
};
pub use view::category::CategoryIndex;
pub use view::engine::{
    filter_tasks, is_overdue, is_overdue_at, project, sort_tasks, summarize, CategoryFilter,
    EmptyState, SortMode, TaskSummary, TaskView, TaskViewItem, ViewSettings, ALL_CATEGORIES,
};

/// Opens a store persisted in the SQLite file at `path`.
///
/// Storage failures do not fail this call; see
/// `TaskStore::last_storage_error`.
pub fn open_file_store(path: impl Into<std::path::PathBuf>) -> TaskStore<SqliteTaskGateway> {
    TaskStore::load(SqliteTaskGateway::file(path))
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
