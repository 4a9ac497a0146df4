//! Note repository contract and store-backed implementation.
//!
//! # Responsibility
//! - Translate domain operations 1:1 onto the storage engine.
//! - Decouple the view-state service from the concrete store so tests can
//!   substitute an in-memory fake.
//!
//! # Invariants
//! - No validation or policy lives here; blank-title checks happen in the
//!   edit session, not-found absorption happens in the store.

use crate::db::DbResult;
use crate::model::note::{Note, NoteId};
use crate::store::{LiveQuery, NoteStore};
use std::sync::Arc;

/// Data access contract for the note collection.
///
/// Implementations must be cheap to clone: the service hands one clone to
/// its background writer thread.
pub trait NoteRepository: Clone + Send + 'static {
    /// Live list of all notes, newest-first.
    fn all_notes(&self) -> DbResult<LiveQuery<Vec<Note>>>;
    /// Live single-note lookup; emits `None` while the row is absent.
    fn note_by_id(&self, id: NoteId) -> DbResult<LiveQuery<Option<Note>>>;
    /// Upsert; returns the effective id.
    fn insert(&self, note: &Note) -> DbResult<NoteId>;
    /// Field replacement; silent no-op when the row is gone.
    fn update(&self, note: &Note) -> DbResult<()>;
    /// Row removal by the note's id; absent rows are not an error.
    fn delete(&self, note: &Note) -> DbResult<()>;
    /// Empties the table; idempotent.
    fn delete_all(&self) -> DbResult<()>;
}

/// Production repository backed by the shared note store.
#[derive(Clone)]
pub struct StoreNoteRepository {
    store: Arc<NoteStore>,
}

impl StoreNoteRepository {
    /// Wraps a store handle, typically the one from [`crate::store::shared_store`].
    pub fn new(store: Arc<NoteStore>) -> Self {
        Self { store }
    }
}

impl NoteRepository for StoreNoteRepository {
    fn all_notes(&self) -> DbResult<LiveQuery<Vec<Note>>> {
        self.store.watch_all()
    }

    fn note_by_id(&self, id: NoteId) -> DbResult<LiveQuery<Option<Note>>> {
        self.store.watch_note(id)
    }

    fn insert(&self, note: &Note) -> DbResult<NoteId> {
        self.store.insert(note)
    }

    fn update(&self, note: &Note) -> DbResult<()> {
        self.store.update(note)
    }

    fn delete(&self, note: &Note) -> DbResult<()> {
        self.store.delete(note.id)
    }

    fn delete_all(&self) -> DbResult<()> {
        self.store.delete_all()
    }
}
