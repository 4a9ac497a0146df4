//! Reactive persistence core for a personal note collection.
//!
//! Notes live in a single SQLite table behind [`store::NoteStore`]; reads are
//! served as live queries that re-emit a full snapshot after every committed
//! write, so every open subscription always reflects the latest state without
//! manual refresh. Writes flow through [`service::note_service::NoteService`]
//! fire-and-forget, serialized by a single background writer.

pub mod db;
pub mod help;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use db::{open_db, open_db_in_memory, DbError, DbResult, SCHEMA_VERSION};
pub use help::help_text;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::note::{Note, NoteId, NEW_NOTE_ID, UNASSIGNED_ID};
pub use repo::note_repo::{NoteRepository, StoreNoteRepository};
pub use service::note_service::{EditSession, NoteService, ValidationError};
pub use store::{shared_store, LiveQuery, NoteStore};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
