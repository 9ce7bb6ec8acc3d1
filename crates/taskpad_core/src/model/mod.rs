//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record and the draft used to create one.
//! - Keep priority/recurrence vocabularies in one place.
//!
//! # Invariants
//! - Every task is identified by a stable, non-nil `TaskId`.
//! - `created_at` is written once at creation and never touched again.

pub mod task;
