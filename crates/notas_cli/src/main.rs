//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `notas_core` linkage.
//! - Run one insert/list cycle against an in-memory store and print the
//!   emitted snapshot.

use notas_core::{Note, NoteStore};

fn main() {
    println!("notas_core version={}", notas_core::core_version());

    let store = match NoteStore::open_in_memory() {
        Ok(store) => store,
        Err(err) => {
            eprintln!("failed to open in-memory store: {err}");
            std::process::exit(1);
        }
    };

    let live = match store.watch_all() {
        Ok(live) => live,
        Err(err) => {
            eprintln!("failed to subscribe: {err}");
            std::process::exit(1);
        }
    };
    // Consume the initial (empty) snapshot before writing.
    let _ = live.recv();

    if let Err(err) = store.insert(&Note::new("Milk", "Shopping", "2L, semi-skimmed")) {
        eprintln!("insert failed: {err}");
        std::process::exit(1);
    }

    match live.recv() {
        Some(notes) => {
            for note in notes {
                println!("#{} [{}] {}", note.id, note.category, note.title);
            }
        }
        None => eprintln!("live query closed unexpectedly"),
    }
}
