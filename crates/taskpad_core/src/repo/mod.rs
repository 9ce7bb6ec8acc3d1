//! Persistence gateway abstractions and implementations.
//!
//! # Responsibility
//! - Define the full-collection load/save contract used by the store.
//! - Isolate SQLite details from store and view logic.
//!
//! # Invariants
//! - Gateways validate tasks on both write and read paths.
//! - Gateways return semantic `StorageError` kinds, never panic.

mod legacy;
pub mod memory_gateway;
pub mod sqlite_gateway;
pub mod task_gateway;

pub use legacy::LEGACY_TASKS_KEY;
