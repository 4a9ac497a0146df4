//! Note view-state service and edit sessions.
//!
//! # Responsibility
//! - Hold the long-lived live list backing the note overview.
//! - Dispatch mutations to a single background writer, preserving submission
//!   order (single-writer serialization).
//! - Run the edit-session state machine: Loading -> Populated -> save
//!   (rejected on blank title) or abandon.
//!
//! # Invariants
//! - Mutation entry points return immediately; no success/failure result is
//!   conveyed synchronously. A failed write is logged and dropped.
//! - Queued writes run to completion even after the service is dropped; the
//!   writer drains its queue before exiting.
//! - A blank-title save issues no write and leaves the session populated.

use crate::db::DbResult;
use crate::model::note::{Note, NoteId, NEW_NOTE_ID, UNASSIGNED_ID};
use crate::repo::note_repo::NoteRepository;
use crate::store::LiveQuery;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::mpsc::{self, Sender};
use std::thread;

/// Save-time validation failure, recovered entirely within the edit session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Title is empty or whitespace-only; the write was suppressed.
    BlankTitle,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "title is required"),
        }
    }
}

impl Error for ValidationError {}

enum WriteOp {
    Insert(Note),
    Update(Note),
    Delete(Note),
    DeleteAll,
}

impl WriteOp {
    fn name(&self) -> &'static str {
        match self {
            Self::Insert(_) => "insert",
            Self::Update(_) => "update",
            Self::Delete(_) => "delete",
            Self::DeleteAll => "delete_all",
        }
    }
}

/// View-state coordinator over a note repository.
///
/// Subscribes to the live list once at construction and keeps it open for
/// its whole lifetime; the presentation layer re-renders on each emission.
pub struct NoteService<R: NoteRepository> {
    repo: R,
    notes: LiveQuery<Vec<Note>>,
    writer: Sender<WriteOp>,
}

impl<R: NoteRepository> NoteService<R> {
    /// Builds the service and spawns its background writer thread.
    pub fn new(repo: R) -> DbResult<Self> {
        let notes = repo.all_notes()?;
        let writer = spawn_writer(repo.clone());
        Ok(Self {
            repo,
            notes,
            writer,
        })
    }

    /// The live list backing the overview screen, newest-first.
    pub fn notes(&self) -> &LiveQuery<Vec<Note>> {
        &self.notes
    }

    /// Per-edit-session live lookup, created on demand.
    pub fn note(&self, id: NoteId) -> DbResult<LiveQuery<Option<Note>>> {
        self.repo.note_by_id(id)
    }

    /// Schedules an insert and returns immediately.
    pub fn insert(&self, note: Note) {
        self.submit(WriteOp::Insert(note));
    }

    /// Schedules an update and returns immediately.
    pub fn update(&self, note: Note) {
        self.submit(WriteOp::Update(note));
    }

    /// Schedules a delete and returns immediately.
    pub fn delete(&self, note: Note) {
        self.submit(WriteOp::Delete(note));
    }

    /// Schedules a wipe of the whole collection and returns immediately.
    pub fn delete_all(&self) {
        self.submit(WriteOp::DeleteAll);
    }

    fn submit(&self, op: WriteOp) {
        let name = op.name();
        if self.writer.send(op).is_err() {
            // Only reachable if the writer thread died; the write is lost,
            // matching the logged-and-dropped failure policy.
            error!("event=write_dropped module=service status=error op={name}");
        }
    }
}

/// Single writer thread: one consumer guarantees submission order.
///
/// The thread exits once every sender is gone and the queue is drained, so
/// in-flight writes complete even when the owning service is dropped.
fn spawn_writer<R: NoteRepository>(repo: R) -> Sender<WriteOp> {
    let (tx, rx) = mpsc::channel::<WriteOp>();
    thread::spawn(move || {
        while let Ok(op) = rx.recv() {
            let name = op.name();
            let result = match &op {
                WriteOp::Insert(note) => repo.insert(note).map(|_| ()),
                WriteOp::Update(note) => repo.update(note),
                WriteOp::Delete(note) => repo.delete(note),
                WriteOp::DeleteAll => repo.delete_all(),
            };
            if let Err(err) = result {
                error!("event=write_failed module=service status=error op={name} error={err}");
            }
        }
        info!("event=writer_exit module=service status=ok");
    });
    tx
}

/// One editing session: transient, uncommitted local state until saved.
///
/// New-note sessions start populated with empty fields; edit sessions start
/// loading and seed their draft from the first emission carrying the row.
/// Dropping the session abandons it; its live lookup is cancelled and no
/// write is issued.
pub struct EditSession {
    target: Option<NoteId>,
    lookup: Option<LiveQuery<Option<Note>>>,
    draft: Option<Note>,
}

impl EditSession {
    /// Opens a session for `id`, honoring the new-note sentinel.
    ///
    /// `NEW_NOTE_ID` requests a fresh note; any other id opens an edit
    /// session against the live lookup for that row.
    pub fn open<R: NoteRepository>(service: &NoteService<R>, id: NoteId) -> DbResult<Self> {
        if id == NEW_NOTE_ID {
            Ok(Self::new_note())
        } else {
            Ok(Self {
                target: Some(id),
                lookup: Some(service.note(id)?),
                draft: None,
            })
        }
    }

    /// Session for a note that does not exist yet; populated immediately.
    pub fn new_note() -> Self {
        Self {
            target: None,
            lookup: None,
            draft: Some(Note::default()),
        }
    }

    /// Returns whether the session is still waiting for its first row.
    pub fn is_loading(&self) -> bool {
        self.draft.is_none()
    }

    /// Drains pending lookup emissions, seeding the draft once the row
    /// arrives. Returns whether the session is populated.
    ///
    /// Emissions after the draft is seeded are ignored; the draft is the
    /// user's uncommitted copy and must not be overwritten underneath them.
    pub fn poll(&mut self) -> bool {
        if self.draft.is_none() {
            if let Some(lookup) = &self.lookup {
                if let Some(Some(note)) = lookup.latest() {
                    self.target = Some(note.id);
                    self.draft = Some(note);
                }
            }
        }
        self.draft.is_some()
    }

    /// Read access to the uncommitted draft, once populated.
    pub fn draft(&self) -> Option<&Note> {
        self.draft.as_ref()
    }

    /// Mutable access to the uncommitted draft, once populated.
    pub fn draft_mut(&mut self) -> Option<&mut Note> {
        self.draft.as_mut()
    }

    /// Validates the draft and dispatches the matching mutation.
    ///
    /// A blank (or still-loading, hence absent) title rejects the save; no
    /// write is issued and the session stays as it was. On success the
    /// mutation is fire-and-forget dispatched and the caller ends the
    /// session; the effect is observed through the live list.
    pub fn save<R: NoteRepository>(
        &self,
        service: &NoteService<R>,
    ) -> Result<(), ValidationError> {
        let draft = match &self.draft {
            Some(draft) if !draft.has_blank_title() => draft,
            _ => return Err(ValidationError::BlankTitle),
        };

        match self.target {
            Some(id) => service.update(Note {
                id,
                ..draft.clone()
            }),
            None => service.insert(Note {
                id: UNASSIGNED_ID,
                ..draft.clone()
            }),
        }
        Ok(())
    }
}
