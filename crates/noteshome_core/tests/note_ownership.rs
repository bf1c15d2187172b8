use noteshome_core::db::open_db_in_memory;
use noteshome_core::{
    AuthService, NoteRepository, NoteService, SqliteNoteRepository, SqliteUserRepository,
};
use rusqlite::Connection;

fn seed_user(conn: &mut Connection, username: &str, email: &str) -> i64 {
    let repo = SqliteUserRepository::try_new(conn).unwrap();
    let mut auth = AuthService::new(repo);
    auth.register_user(username, email, "midnight-garden-42", "midnight-garden-42")
        .unwrap()
        .id
        .unwrap()
}

#[test]
fn foreign_note_is_indistinguishable_from_nonexistent() {
    let mut conn = open_db_in_memory().unwrap();
    let alice = seed_user(&mut conn, "alice", "alice@example.com");
    let bob = seed_user(&mut conn, "bob", "bob@example.com");

    let note_id = {
        let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
        let mut notes = NoteService::new(repo);
        notes
            .create_note("Private", "alice only", alice)
            .unwrap()
            .id
            .unwrap()
    };

    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let notes = NoteService::new(repo);

    let foreign = notes.get_note(note_id, bob).unwrap_err();
    let nonexistent = notes.get_note(987_654, bob).unwrap_err();
    assert_eq!(foreign, nonexistent);
}

#[test]
fn store_get_by_id_returns_none_for_foreign_owner() {
    let mut conn = open_db_in_memory().unwrap();
    let alice = seed_user(&mut conn, "alice", "alice@example.com");
    let bob = seed_user(&mut conn, "bob", "bob@example.com");

    let note_id = {
        let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
        let mut notes = NoteService::new(repo);
        notes
            .create_note("Private", "alice only", alice)
            .unwrap()
            .id
            .unwrap()
    };

    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    assert!(repo.get_by_id(note_id, alice).unwrap().is_some());
    assert!(repo.get_by_id(note_id, bob).unwrap().is_none());
}

#[test]
fn foreign_update_and_delete_are_rejected_and_leave_the_note_intact() {
    let mut conn = open_db_in_memory().unwrap();
    let alice = seed_user(&mut conn, "alice", "alice@example.com");
    let bob = seed_user(&mut conn, "bob", "bob@example.com");

    let note_id = {
        let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
        let mut notes = NoteService::new(repo);
        notes
            .create_note("Private", "alice only", alice)
            .unwrap()
            .id
            .unwrap()
    };

    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut notes = NoteService::new(repo);

    notes
        .update_note(note_id, "Hijacked", "gotcha", bob, false)
        .unwrap_err();
    notes.delete_note(note_id, bob).unwrap_err();

    let untouched = notes.get_note(note_id, alice).unwrap();
    assert_eq!(untouched.title, "Private");
    assert_eq!(untouched.content, "alice only");
}

#[test]
fn listing_only_returns_the_requesting_users_notes() {
    let mut conn = open_db_in_memory().unwrap();
    let alice = seed_user(&mut conn, "alice", "alice@example.com");
    let bob = seed_user(&mut conn, "bob", "bob@example.com");

    {
        let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
        let mut notes = NoteService::new(repo);
        notes.create_note("alice note 1", "", alice).unwrap();
        notes.create_note("alice note 2", "", alice).unwrap();
        notes.create_note("bob note", "", bob).unwrap();
    }

    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let notes = NoteService::new(repo);

    let alices = notes.get_all_notes(alice, true).unwrap();
    assert_eq!(alices.len(), 2);
    assert!(alices.iter().all(|note| note.user_id == alice));

    let bobs = notes.get_all_notes(bob, true).unwrap();
    assert_eq!(bobs.len(), 1);
    assert_eq!(bobs[0].title, "bob note");
}
