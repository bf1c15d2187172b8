use noteshome_core::db::open_db_in_memory;
use noteshome_core::{
    AuthService, NoteService, SqliteNoteRepository, SqliteUserRepository, NOTE_TITLE_MAX_CHARS,
};
use rusqlite::{params, Connection};

fn seed_user(conn: &mut Connection, username: &str, email: &str) -> i64 {
    let repo = SqliteUserRepository::try_new(conn).unwrap();
    let mut auth = AuthService::new(repo);
    auth.register_user(username, email, "midnight-garden-42", "midnight-garden-42")
        .unwrap()
        .id
        .unwrap()
}

#[test]
fn create_and_get_roundtrip() {
    let mut conn = open_db_in_memory().unwrap();
    let user_id = seed_user(&mut conn, "alice", "alice@example.com");

    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut notes = NoteService::new(repo);

    let created = notes.create_note("Groceries", "milk, eggs", user_id).unwrap();
    assert!(created.id.is_some());
    assert_eq!(created.title, "Groceries");
    assert_eq!(created.content, "milk, eggs");
    assert_eq!(created.user_id, user_id);
    assert!(!created.is_archived);
    assert_eq!(created.created_at, created.updated_at);

    let fetched = notes.get_note(created.id.unwrap(), user_id).unwrap();
    assert_eq!(fetched, created);
}

#[test]
fn create_trims_title_and_content() {
    let mut conn = open_db_in_memory().unwrap();
    let user_id = seed_user(&mut conn, "alice", "alice@example.com");

    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut notes = NoteService::new(repo);

    let created = notes
        .create_note("  Groceries  ", "  milk  ", user_id)
        .unwrap();
    assert_eq!(created.title, "Groceries");
    assert_eq!(created.content, "milk");
}

#[test]
fn create_accepts_empty_content() {
    let mut conn = open_db_in_memory().unwrap();
    let user_id = seed_user(&mut conn, "alice", "alice@example.com");

    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut notes = NoteService::new(repo);

    let created = notes.create_note("Title only", "", user_id).unwrap();
    assert_eq!(created.content, "");
}

#[test]
fn title_boundary_is_exactly_200_characters() {
    let mut conn = open_db_in_memory().unwrap();
    let user_id = seed_user(&mut conn, "alice", "alice@example.com");

    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut notes = NoteService::new(repo);

    let max_title = "t".repeat(NOTE_TITLE_MAX_CHARS);
    assert!(notes.create_note(&max_title, "body", user_id).is_ok());

    let too_long = "t".repeat(NOTE_TITLE_MAX_CHARS + 1);
    let err = notes.create_note(&too_long, "body", user_id).unwrap_err();
    assert!(err.to_string().contains("cannot exceed 200"));

    let blank = notes.create_note("   ", "body", user_id).unwrap_err();
    assert_eq!(blank.to_string(), "note title cannot be empty");
}

#[test]
fn create_validates_user_id() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut notes = NoteService::new(repo);

    let err = notes.create_note("Title", "body", 0).unwrap_err();
    assert_eq!(err.to_string(), "user id is required");
}

#[test]
fn create_for_unknown_user_fails_with_wrapped_cause() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut notes = NoteService::new(repo);

    // No such user row; the foreign key rejects the insert and the store
    // wraps the cause instead of letting it escape.
    let err = notes.create_note("Title", "body", 9_999).unwrap_err();
    assert!(err.to_string().contains("failed to create note"));
}

#[test]
fn update_preserves_identity_fields_and_advances_updated_at() {
    let mut conn = open_db_in_memory().unwrap();
    let user_id = seed_user(&mut conn, "alice", "alice@example.com");

    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut notes = NoteService::new(repo);

    let created = notes.create_note("Draft", "v1", user_id).unwrap();
    let note_id = created.id.unwrap();

    let updated = notes
        .update_note(note_id, "Final", "v2", user_id, false)
        .unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.user_id, created.user_id);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > created.updated_at);
    assert_eq!(updated.title, "Final");
    assert_eq!(updated.content, "v2");
}

#[test]
fn update_validates_input_before_touching_storage() {
    let mut conn = open_db_in_memory().unwrap();
    let user_id = seed_user(&mut conn, "alice", "alice@example.com");

    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut notes = NoteService::new(repo);
    let created = notes.create_note("Draft", "v1", user_id).unwrap();
    let note_id = created.id.unwrap();

    let missing_id = notes.update_note(0, "T", "C", user_id, false).unwrap_err();
    assert_eq!(missing_id.to_string(), "note id is required");

    let blank_title = notes.update_note(note_id, "  ", "C", user_id, false).unwrap_err();
    assert_eq!(blank_title.to_string(), "note title cannot be empty");

    let too_long = "t".repeat(NOTE_TITLE_MAX_CHARS + 1);
    let long_title = notes
        .update_note(note_id, &too_long, "C", user_id, false)
        .unwrap_err();
    assert!(long_title.to_string().contains("cannot exceed 200"));
}

#[test]
fn update_of_missing_note_reports_no_permission() {
    let mut conn = open_db_in_memory().unwrap();
    let user_id = seed_user(&mut conn, "alice", "alice@example.com");

    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut notes = NoteService::new(repo);

    let err = notes.update_note(42, "T", "C", user_id, false).unwrap_err();
    assert_eq!(
        err.to_string(),
        "the note does not exist or you do not have permission to access it"
    );
}

#[test]
fn explicit_archive_flag_archives_and_unarchives() {
    let mut conn = open_db_in_memory().unwrap();
    let user_id = seed_user(&mut conn, "alice", "alice@example.com");

    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut notes = NoteService::new(repo);
    let created = notes.create_note("Keep", "body", user_id).unwrap();
    let note_id = created.id.unwrap();

    let archived = notes
        .update_note(note_id, "Keep", "body", user_id, true)
        .unwrap();
    assert!(archived.is_archived);

    // Every edit states the archival flag; passing false un-archives.
    let unarchived = notes
        .update_note(note_id, "Keep", "body", user_id, false)
        .unwrap();
    assert!(!unarchived.is_archived);
}

#[test]
fn archived_notes_are_excluded_unless_requested() {
    let mut conn = open_db_in_memory().unwrap();
    let user_id = seed_user(&mut conn, "alice", "alice@example.com");

    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut notes = NoteService::new(repo);
    let keep = notes.create_note("Keep", "", user_id).unwrap();
    let archive = notes.create_note("Archive", "", user_id).unwrap();
    notes
        .update_note(archive.id.unwrap(), "Archive", "", user_id, true)
        .unwrap();

    let visible = notes.get_all_notes(user_id, false).unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, keep.id);
    assert!(visible.iter().all(|note| !note.is_archived));

    let all = notes.get_all_notes(user_id, true).unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().any(|note| note.is_archived));
}

#[test]
fn listing_orders_by_most_recently_updated_first() {
    let mut conn = open_db_in_memory().unwrap();
    let user_id = seed_user(&mut conn, "alice", "alice@example.com");

    let (first_id, second_id) = {
        let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
        let mut notes = NoteService::new(repo);
        let first = notes.create_note("first", "", user_id).unwrap();
        let second = notes.create_note("second", "", user_id).unwrap();
        (first.id.unwrap(), second.id.unwrap())
    };

    conn.execute(
        "UPDATE notes SET updated_at = 2000 WHERE id = ?1;",
        params![first_id],
    )
    .unwrap();
    conn.execute(
        "UPDATE notes SET updated_at = 1000 WHERE id = ?1;",
        params![second_id],
    )
    .unwrap();

    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let notes = NoteService::new(repo);
    let listed = notes.get_all_notes(user_id, false).unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, Some(first_id));
    assert_eq!(listed[1].id, Some(second_id));
}

#[test]
fn delete_removes_the_note_and_reports_absence_afterwards() {
    let mut conn = open_db_in_memory().unwrap();
    let user_id = seed_user(&mut conn, "alice", "alice@example.com");

    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut notes = NoteService::new(repo);
    let created = notes.create_note("Trash me", "", user_id).unwrap();
    let note_id = created.id.unwrap();

    notes.delete_note(note_id, user_id).unwrap();

    let gone = notes.get_note(note_id, user_id).unwrap_err();
    assert_eq!(
        gone.to_string(),
        "the note does not exist or you do not have permission to access it"
    );

    let again = notes.delete_note(note_id, user_id).unwrap_err();
    assert_eq!(
        again.to_string(),
        "the note does not exist or you do not have permission to delete it"
    );
}

#[test]
fn get_note_validates_both_ids() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let notes = NoteService::new(repo);

    let missing_note_id = notes.get_note(0, 1).unwrap_err();
    assert_eq!(missing_note_id.to_string(), "note id is required");

    let missing_user_id = notes.get_note(1, 0).unwrap_err();
    assert_eq!(missing_user_id.to_string(), "user id is required");

    let listing = notes.get_all_notes(0, false).unwrap_err();
    assert_eq!(listing.to_string(), "user id is required");
}
