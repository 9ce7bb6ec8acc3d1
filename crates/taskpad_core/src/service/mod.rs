//! Core use-case services.
//!
//! # Responsibility
//! - Expose the command/query surface presentation layers call into.
//! - Keep presentation layers decoupled from storage details.

pub mod task_store;
