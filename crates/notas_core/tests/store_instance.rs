use notas_core::shared_store;
use std::sync::{Arc, Barrier};
use std::thread;

// The shared store is process-wide state, so every assertion about it lives
// in this single test: concurrent first access, then steady-state identity.
#[test]
fn concurrent_first_access_yields_one_handle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.db");

    const CALLERS: usize = 8;
    let barrier = Arc::new(Barrier::new(CALLERS));

    let handles: Vec<_> = (0..CALLERS)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            let path = path.clone();
            thread::spawn(move || {
                barrier.wait();
                shared_store(&path).unwrap()
            })
        })
        .collect();

    let stores: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    for store in &stores[1..] {
        assert!(Arc::ptr_eq(&stores[0], store));
    }

    // Later callers get the same handle even with a different path: the
    // first construction wins for the process lifetime.
    let other_dir = tempfile::tempdir().unwrap();
    let late = shared_store(other_dir.path().join("elsewhere.db")).unwrap();
    assert!(Arc::ptr_eq(&stores[0], &late));
}
