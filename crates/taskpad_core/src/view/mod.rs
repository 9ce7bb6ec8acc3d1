//! Read-side projections over the task collection.
//!
//! Nothing in this module mutates tasks; the store calls into it after every
//! change and on every render.

pub mod category;
pub mod engine;
