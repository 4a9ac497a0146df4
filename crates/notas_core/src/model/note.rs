//! Note domain model.
//!
//! # Responsibility
//! - Define the single persisted entity: id, title, category, content.
//! - Provide the blank-title validation helper used before every save.
//!
//! # Invariants
//! - `id > 0` iff the note has been persisted; storage assigns ids on insert.
//! - `NEW_NOTE_ID` is a caller-level request marker, never written to storage.
//! - Equality covers all fields (row-replace semantics rely on it).

use serde::{Deserialize, Serialize};

/// Storage-assigned row identifier.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type NoteId = i64;

/// Id value of a note that storage has not assigned yet.
///
/// Inserting a note with this id asks the engine for a fresh one.
pub const UNASSIGNED_ID: NoteId = 0;

/// Caller-side sentinel meaning "this is a request to create a new note".
///
/// Distinct from [`UNASSIGNED_ID`]: edit sessions use it to route a save to
/// insert rather than update. It never reaches the storage layer.
pub const NEW_NOTE_ID: NoteId = -1;

/// The sole persisted entity: a short text note.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Storage-assigned id; `UNASSIGNED_ID` until the first insert.
    pub id: NoteId,
    /// Required; blank titles are rejected before reaching storage.
    pub title: String,
    /// Optional grouping label, defaults to empty.
    pub category: String,
    /// Optional body text, defaults to empty.
    pub content: String,
}

impl Note {
    /// Creates an unpersisted note; storage assigns the id on insert.
    pub fn new(
        title: impl Into<String>,
        category: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: UNASSIGNED_ID,
            title: title.into(),
            category: category.into(),
            content: content.into(),
        }
    }

    /// Returns whether storage has assigned this note an id.
    pub fn is_persisted(&self) -> bool {
        self.id > 0
    }

    /// Returns whether the title is empty or whitespace-only.
    ///
    /// Saves with a blank title must be rejected before any write is issued.
    pub fn has_blank_title(&self) -> bool {
        self.title.trim().is_empty()
    }
}
