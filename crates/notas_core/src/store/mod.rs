//! Note storage engine with live queries.
//!
//! # Responsibility
//! - Own the durable `notes` table behind one SQLite connection.
//! - Serve queries as live subscriptions that re-emit a full snapshot after
//!   every committed write.
//!
//! # Invariants
//! - Watcher registration and snapshot re-evaluation happen under the
//!   connection lock, so every emission reflects the latest committed state.
//! - Lock order is always connection, then watchers.
//! - `update`/`delete` of an absent row are silent no-ops (last-writer-wins).
//!
//! # See also
//! - `store::live` for the subscription handle contract.

use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::model::note::{Note, NoteId};
use log::{debug, error, info};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::mpsc::{self, Sender};
use std::sync::Mutex;

mod instance;
pub mod live;

pub use instance::shared_store;
pub use live::LiveQuery;

const NOTE_SELECT_SQL: &str = "SELECT id, title, category, content FROM notes";

/// Durable note table plus the registry of live-query subscribers.
///
/// All repository instances share one store per process (see
/// [`shared_store`]); conflicting writes are serialized by the internal
/// connection lock.
pub struct NoteStore {
    conn: Mutex<Connection>,
    watchers: Mutex<Watchers>,
}

#[derive(Default)]
struct Watchers {
    all: Vec<Sender<Vec<Note>>>,
    by_id: Vec<(NoteId, Sender<Option<Note>>)>,
}

impl NoteStore {
    /// Opens a file-backed store, creating or resetting the schema as needed.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Ok(Self::from_connection(open_db(path)?))
    }

    /// Opens an in-memory store. Used by tests and the CLI probe.
    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self::from_connection(open_db_in_memory()?))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
            watchers: Mutex::new(Watchers::default()),
        }
    }

    /// Subscribes to the full note list, ordered newest-first (`id DESC`).
    ///
    /// The initial snapshot is queued before this returns; a fresh snapshot
    /// follows every committed write. An empty table yields `[]`.
    pub fn watch_all(&self) -> DbResult<LiveQuery<Vec<Note>>> {
        let conn = self.lock_conn();
        let initial = list_all(&conn)?;
        let (tx, rx) = mpsc::channel();
        // Send before registering: a watcher must never see a snapshot older
        // than one already delivered.
        let _ = tx.send(initial);
        self.lock_watchers().all.push(tx);
        Ok(LiveQuery::new(rx))
    }

    /// Subscribes to a single row; emits `None` while the row is absent.
    pub fn watch_note(&self, id: NoteId) -> DbResult<LiveQuery<Option<Note>>> {
        let conn = self.lock_conn();
        let initial = get_by_id(&conn, id)?;
        let (tx, rx) = mpsc::channel();
        let _ = tx.send(initial);
        self.lock_watchers().by_id.push((id, tx));
        Ok(LiveQuery::new(rx))
    }

    /// Inserts the note, or replaces the row sharing its id (upsert).
    ///
    /// A non-positive id asks the engine for a fresh one. Returns the
    /// effective id and re-emits every live query.
    pub fn insert(&self, note: &Note) -> DbResult<NoteId> {
        let conn = self.lock_conn();
        let id = if note.is_persisted() {
            conn.execute(
                "INSERT OR REPLACE INTO notes (id, title, category, content)
                 VALUES (?1, ?2, ?3, ?4);",
                params![note.id, note.title, note.category, note.content],
            )?;
            note.id
        } else {
            conn.execute(
                "INSERT INTO notes (title, category, content) VALUES (?1, ?2, ?3);",
                params![note.title, note.category, note.content],
            )?;
            conn.last_insert_rowid()
        };
        info!("event=note_insert module=store status=ok id={id}");
        self.publish(&conn);
        Ok(id)
    }

    /// Replaces the fields of an existing row.
    ///
    /// Silently ignored when the row no longer exists; a concurrent delete
    /// wins and no error is surfaced.
    pub fn update(&self, note: &Note) -> DbResult<()> {
        let conn = self.lock_conn();
        let changed = conn.execute(
            "UPDATE notes SET title = ?2, category = ?3, content = ?4 WHERE id = ?1;",
            params![note.id, note.title, note.category, note.content],
        )?;
        if changed == 0 {
            debug!("event=note_update module=store status=noop id={}", note.id);
            return Ok(());
        }
        info!("event=note_update module=store status=ok id={}", note.id);
        self.publish(&conn);
        Ok(())
    }

    /// Removes the row if present; an absent row is not an error.
    pub fn delete(&self, id: NoteId) -> DbResult<()> {
        let conn = self.lock_conn();
        let changed = conn.execute("DELETE FROM notes WHERE id = ?1;", params![id])?;
        if changed == 0 {
            debug!("event=note_delete module=store status=noop id={id}");
            return Ok(());
        }
        info!("event=note_delete module=store status=ok id={id}");
        self.publish(&conn);
        Ok(())
    }

    /// Empties the table. Idempotent; always re-emits the (empty) list.
    pub fn delete_all(&self) -> DbResult<()> {
        let conn = self.lock_conn();
        let removed = conn.execute("DELETE FROM notes;", [])?;
        info!("event=note_delete_all module=store status=ok removed={removed}");
        self.publish(&conn);
        Ok(())
    }

    /// Re-runs every registered query and pushes fresh snapshots.
    ///
    /// Called with the connection lock held so emissions are produced from
    /// the just-committed state. Watchers whose receiving end is gone are
    /// pruned here. A re-query failure after a committed write is logged and
    /// the emission skipped; the write itself already succeeded.
    fn publish(&self, conn: &Connection) {
        let mut watchers = self.lock_watchers();

        if !watchers.all.is_empty() {
            match list_all(conn) {
                Ok(snapshot) => watchers
                    .all
                    .retain(|tx| tx.send(snapshot.clone()).is_ok()),
                Err(err) => {
                    error!("event=live_requery module=store status=error query=all error={err}");
                }
            }
        }

        watchers.by_id.retain(|(id, tx)| match get_by_id(conn, *id) {
            Ok(row) => tx.send(row).is_ok(),
            Err(err) => {
                error!(
                    "event=live_requery module=store status=error query=by_id id={id} error={err}"
                );
                true
            }
        });
    }

    fn lock_conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        // Poisoning only happens if a holder panicked; the data itself is a
        // committed SQLite state, safe to keep using.
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_watchers(&self) -> std::sync::MutexGuard<'_, Watchers> {
        self.watchers.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn list_all(conn: &Connection) -> DbResult<Vec<Note>> {
    let mut stmt = conn.prepare(&format!("{NOTE_SELECT_SQL} ORDER BY id DESC;"))?;
    let rows = stmt.query_map([], note_from_row)?;
    let mut notes = Vec::new();
    for row in rows {
        notes.push(row?);
    }
    Ok(notes)
}

fn get_by_id(conn: &Connection, id: NoteId) -> DbResult<Option<Note>> {
    let note = conn
        .query_row(
            &format!("{NOTE_SELECT_SQL} WHERE id = ?1;"),
            params![id],
            note_from_row,
        )
        .optional()?;
    Ok(note)
}

fn note_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Note> {
    Ok(Note {
        id: row.get("id")?,
        title: row.get("title")?,
        category: row.get("category")?,
        content: row.get("content")?,
    })
}
