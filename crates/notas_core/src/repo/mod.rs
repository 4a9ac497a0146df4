//! Repository layer over the note store.
//!
//! # Responsibility
//! - Define the data access contract consumed by the view-state service.
//! - Keep the service substitutable away from the SQLite store in tests.
//!
//! # Invariants
//! - Repository operations map 1:1 onto store operations, no added policy.

pub mod note_repo;
