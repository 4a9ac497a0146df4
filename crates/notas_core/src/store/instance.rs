//! Process-wide shared store handle.
//!
//! # Responsibility
//! - Construct the note store exactly once per process and hand the same
//!   handle to every caller thereafter.
//!
//! # Invariants
//! - Concurrent first-time callers all observe one fully-constructed handle;
//!   no duplicate construction, no torn handle.
//! - The steady-state path after first construction takes no lock.
//! - The handle lives for the process lifetime; there is no teardown path.

use super::NoteStore;
use crate::db::DbResult;
use log::info;
use once_cell::sync::OnceCell;
use std::path::Path;
use std::sync::Arc;

static SHARED: OnceCell<Arc<NoteStore>> = OnceCell::new();

/// Returns the process-wide store, constructing it on first call.
///
/// The first caller's `path` decides where the backing file lives; later
/// callers get the already-open handle regardless of the path they pass.
/// Construction failure propagates to every caller racing the first
/// construction, and the next call retries.
///
/// # Errors
/// - Returns the underlying error when the backing file cannot be opened or
///   the schema cannot be applied (fatal at startup, no degraded mode).
pub fn shared_store(path: impl AsRef<Path>) -> DbResult<Arc<NoteStore>> {
    let store = SHARED.get_or_try_init(|| -> DbResult<Arc<NoteStore>> {
        let store = NoteStore::open(path.as_ref())?;
        info!(
            "event=store_init module=store status=ok path={}",
            path.as_ref().display()
        );
        Ok(Arc::new(store))
    })?;
    Ok(Arc::clone(store))
}
