//! Domain model for the note collection.
//!
//! # Responsibility
//! - Define the canonical persisted record and its identity rules.
//!
//! # Invariants
//! - `id` is storage-assigned, monotonic and never reused within a process.
//! - A non-positive `id` marks a record that storage has not assigned yet.

pub mod note;
