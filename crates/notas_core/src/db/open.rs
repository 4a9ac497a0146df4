//! Connection bootstrap for the note table.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Apply the `notes` schema before returning a usable connection.
//! - Enforce the destructive-reset policy on schema-version mismatch.
//!
//! # Invariants
//! - Returned connections always carry schema version `SCHEMA_VERSION`.
//! - A version mismatch drops and recreates the table; no migration path
//!   exists (documented data-loss policy).

use super::DbResult;
use log::{error, info, warn};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Current schema version, mirrored into `PRAGMA user_version`.
pub const SCHEMA_VERSION: u32 = 1;

// AUTOINCREMENT keeps ids monotonic and never reused after deletion.
const CREATE_NOTES_SQL: &str = "CREATE TABLE IF NOT EXISTS notes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    category TEXT NOT NULL DEFAULT '',
    content TEXT NOT NULL DEFAULT ''
);";

/// Opens a SQLite database file and applies the schema.
///
/// # Side effects
/// - May destroy existing data when the stored schema version differs from
///   `SCHEMA_VERSION`.
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=file");

    let mut conn = match Connection::open(path) {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode=file duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&mut conn) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode=file duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode=file duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

/// Opens an in-memory SQLite database and applies the schema.
pub fn open_db_in_memory() -> DbResult<Connection> {
    let mut conn = Connection::open_in_memory()?;
    bootstrap_connection(&mut conn)?;
    info!("event=db_open module=db status=ok mode=memory");
    Ok(conn)
}

fn bootstrap_connection(conn: &mut Connection) -> DbResult<()> {
    conn.busy_timeout(Duration::from_secs(5))?;
    apply_schema(conn)?;
    Ok(())
}

/// Applies the schema, wiping the store on a version mismatch.
///
/// Version `0` marks a fresh database and initializes normally. Any other
/// version that is not `SCHEMA_VERSION` (older or newer) triggers the reset.
fn apply_schema(conn: &mut Connection) -> DbResult<()> {
    let stored = current_user_version(conn)?;

    if stored != 0 && stored != SCHEMA_VERSION {
        warn!(
            "event=db_reset module=db status=start stored_version={stored} \
             target_version={SCHEMA_VERSION}"
        );
        let tx = conn.transaction()?;
        tx.execute_batch("DROP TABLE IF EXISTS notes;")?;
        tx.execute_batch(CREATE_NOTES_SQL)?;
        tx.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
        tx.commit()?;
        warn!("event=db_reset module=db status=ok");
        return Ok(());
    }

    let tx = conn.transaction()?;
    tx.execute_batch(CREATE_NOTES_SQL)?;
    tx.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
    tx.commit()?;
    Ok(())
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
