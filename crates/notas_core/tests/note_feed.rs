use notas_core::{
    DbResult, EditSession, LiveQuery, Note, NoteId, NoteRepository, NoteService, NoteStore,
    StoreNoteRepository, ValidationError, NEW_NOTE_ID,
};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const EMISSION_WAIT: Duration = Duration::from_secs(5);

fn service() -> NoteService<StoreNoteRepository> {
    let store = Arc::new(NoteStore::open_in_memory().unwrap());
    NoteService::new(StoreNoteRepository::new(store)).unwrap()
}

/// Waits until the live list emits a snapshot satisfying `pred`.
fn wait_for(service: &NoteService<StoreNoteRepository>, pred: impl Fn(&[Note]) -> bool) -> Vec<Note> {
    loop {
        let snapshot = service
            .notes()
            .recv_timeout(EMISSION_WAIT)
            .expect("live list should keep emitting");
        if pred(&snapshot) {
            return snapshot;
        }
    }
}

#[test]
fn live_list_starts_with_the_initial_snapshot() {
    let service = service();
    assert_eq!(service.notes().recv(), Some(vec![]));
}

#[test]
fn fire_and_forget_insert_surfaces_through_the_live_list() {
    let service = service();
    let _ = service.notes().recv();

    service.insert(Note::new("Milk", "Shopping", ""));

    let notes = wait_for(&service, |notes| notes.len() == 1);
    assert_eq!(notes[0].title, "Milk");
    assert!(notes[0].id > 0);
}

#[test]
fn writes_apply_in_submission_order() {
    let service = service();

    service.insert(Note::new("A", "", ""));
    service.insert(Note::new("B", "", ""));
    service.delete_all();
    service.insert(Note::new("D", "", ""));

    let notes = wait_for(&service, |notes| {
        notes.len() == 1 && notes[0].title == "D"
    });
    assert_eq!(notes.len(), 1);
}

#[test]
fn update_and_delete_round_trip_through_the_service() {
    let service = service();

    service.insert(Note::new("Milk", "Shopping", ""));
    let inserted = wait_for(&service, |notes| notes.len() == 1);
    let id = inserted[0].id;

    service.update(Note {
        id,
        title: "Milk 2L".to_string(),
        category: "Shopping".to_string(),
        content: String::new(),
    });
    wait_for(&service, |notes| {
        notes.len() == 1 && notes[0].title == "Milk 2L"
    });

    service.delete(Note {
        id,
        title: "Milk 2L".to_string(),
        category: "Shopping".to_string(),
        content: String::new(),
    });
    wait_for(&service, |notes| notes.is_empty());
}

#[test]
fn queued_writes_complete_after_the_service_is_dropped() {
    let store = Arc::new(NoteStore::open_in_memory().unwrap());
    let service = NoteService::new(StoreNoteRepository::new(Arc::clone(&store))).unwrap();

    service.insert(Note::new("survives", "", ""));
    drop(service);

    // The writer drains its queue before exiting; poll the store until the
    // row lands.
    let live = store.watch_all().unwrap();
    loop {
        match live.recv_timeout(EMISSION_WAIT) {
            Some(notes) if notes.len() == 1 => break,
            Some(_) => continue,
            None => panic!("queued insert never committed"),
        }
    }
}

#[test]
fn new_note_session_is_populated_immediately() {
    let service = service();
    let session = EditSession::open(&service, NEW_NOTE_ID).unwrap();
    assert!(!session.is_loading());
    assert_eq!(session.draft().unwrap(), &Note::default());
}

#[test]
fn blank_title_save_is_rejected_and_writes_nothing() {
    let service = service();
    let _ = service.notes().recv();

    let mut session = EditSession::new_note();
    let draft = session.draft_mut().unwrap();
    draft.title = "   ".to_string();
    draft.content = "body without a title".to_string();

    assert_eq!(
        session.save(&service),
        Err(ValidationError::BlankTitle)
    );
    // Session stays populated; the draft is untouched.
    assert_eq!(
        session.draft().unwrap().content,
        "body without a title"
    );
    // No write reached storage.
    assert_eq!(service.notes().recv_timeout(Duration::from_millis(200)), None);
}

#[test]
fn saving_a_new_note_dispatches_an_insert() {
    let service = service();
    let _ = service.notes().recv();

    let mut session = EditSession::new_note();
    {
        let draft = session.draft_mut().unwrap();
        draft.title = "Milk".to_string();
        draft.category = "Shopping".to_string();
    }
    session.save(&service).unwrap();

    let notes = wait_for(&service, |notes| notes.len() == 1);
    assert_eq!(notes[0].title, "Milk");
    assert_eq!(notes[0].category, "Shopping");
}

#[test]
fn edit_session_loads_seeds_and_saves_an_update() {
    let service = service();
    let _ = service.notes().recv();

    service.insert(Note::new("Milk", "Shopping", ""));
    let inserted = wait_for(&service, |notes| notes.len() == 1);
    let id = inserted[0].id;

    let mut session = EditSession::open(&service, id).unwrap();
    assert!(session.is_loading());
    while !session.poll() {
        std::thread::yield_now();
    }
    assert_eq!(session.draft().unwrap().title, "Milk");

    session.draft_mut().unwrap().title = "Milk 2L".to_string();
    session.save(&service).unwrap();

    wait_for(&service, |notes| {
        notes.len() == 1 && notes[0].title == "Milk 2L"
    });
}

#[test]
fn saving_while_still_loading_is_rejected() {
    let service = service();
    // Id 9 does not exist; the session never leaves Loading.
    let session = EditSession::open(&service, 9).unwrap();
    assert!(session.is_loading());
    assert_eq!(session.save(&service), Err(ValidationError::BlankTitle));
}

// -- fake repository ---------------------------------------------------------

/// In-memory repository fake: proves the service only depends on the trait.
#[derive(Clone, Default)]
struct FakeRepository {
    log: Arc<Mutex<Vec<String>>>,
}

impl FakeRepository {
    fn operations(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

impl NoteRepository for FakeRepository {
    fn all_notes(&self) -> DbResult<LiveQuery<Vec<Note>>> {
        let (tx, rx) = mpsc::channel();
        let _ = tx.send(Vec::new());
        Ok(LiveQuery::new(rx))
    }

    fn note_by_id(&self, _id: NoteId) -> DbResult<LiveQuery<Option<Note>>> {
        let (tx, rx) = mpsc::channel();
        let _ = tx.send(None);
        Ok(LiveQuery::new(rx))
    }

    fn insert(&self, note: &Note) -> DbResult<NoteId> {
        self.log.lock().unwrap().push(format!("insert:{}", note.title));
        Ok(1)
    }

    fn update(&self, note: &Note) -> DbResult<()> {
        self.log.lock().unwrap().push(format!("update:{}", note.id));
        Ok(())
    }

    fn delete(&self, note: &Note) -> DbResult<()> {
        self.log.lock().unwrap().push(format!("delete:{}", note.id));
        Ok(())
    }

    fn delete_all(&self) -> DbResult<()> {
        self.log.lock().unwrap().push("delete_all".to_string());
        Ok(())
    }
}

#[test]
fn service_runs_against_a_substituted_repository() {
    let repo = FakeRepository::default();
    let service = NoteService::new(repo.clone()).unwrap();

    service.insert(Note::new("one", "", ""));
    service.delete_all();
    drop(service);

    // Dropping the service closes the queue; wait for the writer to drain.
    let deadline = std::time::Instant::now() + EMISSION_WAIT;
    loop {
        let ops = repo.operations();
        if ops == ["insert:one", "delete_all"] {
            break;
        }
        assert!(
            std::time::Instant::now() < deadline,
            "writer never drained, saw {ops:?}"
        );
        std::thread::sleep(Duration::from_millis(10));
    }
}
