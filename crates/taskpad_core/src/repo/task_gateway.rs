//! Persistence gateway contract for the full task collection.
//!
//! # Responsibility
//! - Define the load/save/migrate contract the store depends on.
//! - Define storage error and migration outcome vocabularies.
//!
//! # Invariants
//! - `save_all` replaces the stored collection atomically; readers never see
//!   a partially written collection.
//! - `load_all` returns tasks in the order they were saved.
//! - Legacy data is only removed after a successful import.

use crate::model::task::{EpochMs, Task};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StorageResult<T> = Result<T, StorageError>;

/// Non-fatal storage failures reported by gateways.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Backing medium cannot be initialized (or was never opened).
    Unavailable(String),
    /// Stored data cannot be read or is corrupt.
    Read(String),
    /// A write could not complete; stored data is unchanged.
    Write(String),
}

impl StorageError {
    /// Stable short code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "storage_unavailable",
            Self::Read(_) => "storage_read_error",
            Self::Write(_) => "storage_write_error",
        }
    }
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(message) => write!(f, "storage unavailable: {message}"),
            Self::Read(message) => write!(f, "storage read failed: {message}"),
            Self::Write(message) => write!(f, "storage write failed: {message}"),
        }
    }
}

impl Error for StorageError {}

/// Why a legacy blob was left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LegacySkipReason {
    /// Blob is not valid JSON.
    MalformedJson,
    /// Blob is valid JSON but not an array.
    NotACollection,
    /// Array entry at `index` cannot be turned into a valid task.
    InvalidRecord { index: usize },
}

impl Display for LegacySkipReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedJson => write!(f, "malformed_json"),
            Self::NotACollection => write!(f, "not_a_collection"),
            Self::InvalidRecord { index } => write!(f, "invalid_record index={index}"),
        }
    }
}

/// Result of a legacy import attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// No legacy data was stored.
    NothingToMigrate,
    /// Legacy data exists but was not imported; it is kept as-is.
    Skipped(LegacySkipReason),
    /// `count` tasks were appended and the legacy data was removed.
    Imported { count: usize },
}

/// Storage collaborator used by `TaskStore`.
pub trait TaskGateway {
    /// Initializes the medium. Calling it again is a no-op.
    fn open(&mut self) -> StorageResult<()>;

    /// Loads the full collection; empty when nothing is stored.
    fn load_all(&self) -> StorageResult<Vec<Task>>;

    /// Atomically replaces the stored collection with `tasks`.
    fn save_all(&mut self, tasks: &[Task]) -> StorageResult<()>;

    /// Imports the legacy key-value blob once, best effort.
    ///
    /// `now` fills in creation timestamps missing from legacy records.
    fn migrate_legacy(&mut self, now: EpochMs) -> StorageResult<MigrationOutcome>;
}
