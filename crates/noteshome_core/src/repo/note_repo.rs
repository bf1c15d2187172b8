//! Note repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide owner-scoped note persistence APIs over the `notes` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Every read/update/delete filters by note id AND owner id; a foreign
//!   note is indistinguishable from a nonexistent one.
//! - Mutations run inside a single immediate transaction per call.
//! - `created_at` is written once; `updated_at` advances on every mutation.

use crate::db::now_epoch_ms;
use crate::model::note::Note;
use crate::repo::{
    bool_to_int, int_to_bool, table_exists, table_has_column, RepoError, RepoResult,
};
use log::{error, info, warn};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    title,
    content,
    user_id,
    created_at,
    updated_at,
    is_archived
FROM notes";

/// Repository interface for owner-scoped note operations.
pub trait NoteRepository {
    /// Persists a new note and returns the hydrated row.
    fn create(&mut self, note: &Note) -> RepoResult<Note>;
    /// `Ok(None)` when the note does not exist or belongs to another user.
    fn get_by_id(&self, note_id: i64, user_id: i64) -> RepoResult<Option<Note>>;
    /// Lists one user's notes, most recently updated first.
    fn get_all_by_user(&self, user_id: i64, include_archived: bool) -> RepoResult<Vec<Note>>;
    /// Updates title/content/is_archived in place; requires `note.id`.
    fn update(&mut self, note: &Note) -> RepoResult<Note>;
    /// `Ok(true)` when a row matching both ids was removed.
    fn delete(&mut self, note_id: i64, user_id: i64) -> RepoResult<bool>;
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_note_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn insert_note(&mut self, note: &Note) -> RepoResult<Note> {
        let now = now_epoch_ms();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO notes (title, content, user_id, created_at, updated_at, is_archived)
             VALUES (?1, ?2, ?3, ?4, ?4, ?5);",
            params![
                note.title,
                note.content,
                note.user_id,
                now,
                bool_to_int(note.is_archived),
            ],
        )?;

        let note_id = tx.last_insert_rowid();
        let created = load_note_in_tx(&tx, note_id, note.user_id)?;
        tx.commit()?;
        Ok(created)
    }

    fn apply_update(&mut self, note_id: i64, note: &Note) -> RepoResult<Note> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let Some(existing) = get_note_in_tx(&tx, note_id, note.user_id)? else {
            return Err(RepoError::NotFound(note_id));
        };

        // updated_at must advance even when two mutations land within the
        // same millisecond.
        let now = now_epoch_ms().max(existing.updated_at.unwrap_or(0) + 1);
        tx.execute(
            "UPDATE notes
             SET
                title = ?1,
                content = ?2,
                is_archived = ?3,
                updated_at = ?4
             WHERE id = ?5
               AND user_id = ?6;",
            params![
                note.title,
                note.content,
                bool_to_int(note.is_archived),
                now,
                note_id,
                note.user_id,
            ],
        )?;

        let updated = load_note_in_tx(&tx, note_id, note.user_id)?;
        tx.commit()?;
        Ok(updated)
    }

    fn apply_delete(&mut self, note_id: i64, user_id: i64) -> RepoResult<bool> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "DELETE FROM notes WHERE id = ?1 AND user_id = ?2;",
            params![note_id, user_id],
        )?;
        tx.commit()?;
        Ok(changed > 0)
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn create(&mut self, note: &Note) -> RepoResult<Note> {
        note.validate()?;
        if note.id.is_some() {
            return Err(RepoError::Validation(
                "cannot create an already persisted note".to_string(),
            ));
        }

        info!(
            "event=note_insert module=note_repo status=start user_id={} title_chars={}",
            note.user_id,
            note.title.chars().count()
        );

        match self.insert_note(note) {
            Ok(created) => {
                info!(
                    "event=note_insert module=note_repo status=ok note_id={} user_id={}",
                    created.id.unwrap_or_default(),
                    created.user_id
                );
                Ok(created)
            }
            Err(RepoError::Db(err)) => {
                error!(
                    "event=note_insert module=note_repo status=error user_id={} error={err}",
                    note.user_id
                );
                Err(RepoError::Validation(format!("failed to create note: {err}")))
            }
            Err(other) => {
                error!(
                    "event=note_insert module=note_repo status=error user_id={} error={other}",
                    note.user_id
                );
                Err(other)
            }
        }
    }

    fn get_by_id(&self, note_id: i64, user_id: i64) -> RepoResult<Option<Note>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NOTE_SELECT_SQL}
             WHERE id = ?1
               AND user_id = ?2;"
        ))?;
        let mut rows = stmt.query(params![note_id, user_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_note_row(row)?));
        }
        Ok(None)
    }

    fn get_all_by_user(&self, user_id: i64, include_archived: bool) -> RepoResult<Vec<Note>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NOTE_SELECT_SQL}
             WHERE user_id = ?1
               AND (?2 = 1 OR is_archived = 0)
             ORDER BY updated_at DESC, id ASC;"
        ))?;
        let mut rows = stmt.query(params![user_id, bool_to_int(include_archived)])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }

    fn update(&mut self, note: &Note) -> RepoResult<Note> {
        note.validate()?;
        let Some(note_id) = note.id else {
            return Err(RepoError::Validation(
                "note id is required for update".to_string(),
            ));
        };

        info!(
            "event=note_update module=note_repo status=start note_id={note_id} user_id={}",
            note.user_id
        );

        match self.apply_update(note_id, note) {
            Ok(updated) => {
                info!(
                    "event=note_update module=note_repo status=ok note_id={note_id} user_id={}",
                    note.user_id
                );
                Ok(updated)
            }
            Err(err @ RepoError::NotFound(_)) => {
                warn!(
                    "event=note_update module=note_repo status=failed note_id={note_id} user_id={} error_code=not_found_or_not_owned",
                    note.user_id
                );
                Err(err)
            }
            Err(RepoError::Db(err)) => {
                error!(
                    "event=note_update module=note_repo status=error note_id={note_id} user_id={} error={err}",
                    note.user_id
                );
                Err(RepoError::Validation(format!("failed to update note: {err}")))
            }
            Err(other) => {
                error!(
                    "event=note_update module=note_repo status=error note_id={note_id} user_id={} error={other}",
                    note.user_id
                );
                Err(other)
            }
        }
    }

    fn delete(&mut self, note_id: i64, user_id: i64) -> RepoResult<bool> {
        info!(
            "event=note_delete module=note_repo status=start note_id={note_id} user_id={user_id}"
        );

        match self.apply_delete(note_id, user_id) {
            Ok(true) => {
                info!(
                    "event=note_delete module=note_repo status=ok note_id={note_id} user_id={user_id}"
                );
                Ok(true)
            }
            Ok(false) => {
                warn!(
                    "event=note_delete module=note_repo status=failed note_id={note_id} user_id={user_id} error_code=not_found_or_not_owned"
                );
                Ok(false)
            }
            Err(RepoError::Db(err)) => {
                error!(
                    "event=note_delete module=note_repo status=error note_id={note_id} user_id={user_id} error={err}"
                );
                Err(RepoError::Validation(format!("failed to delete note: {err}")))
            }
            Err(other) => {
                error!(
                    "event=note_delete module=note_repo status=error note_id={note_id} user_id={user_id} error={other}"
                );
                Err(other)
            }
        }
    }
}

fn get_note_in_tx(
    tx: &Transaction<'_>,
    note_id: i64,
    user_id: i64,
) -> RepoResult<Option<Note>> {
    let mut stmt = tx.prepare(&format!(
        "{NOTE_SELECT_SQL}
         WHERE id = ?1
           AND user_id = ?2;"
    ))?;
    let mut rows = stmt.query(params![note_id, user_id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_note_row(row)?));
    }
    Ok(None)
}

fn load_note_in_tx(tx: &Transaction<'_>, note_id: i64, user_id: i64) -> RepoResult<Note> {
    get_note_in_tx(tx, note_id, user_id)?.ok_or_else(|| {
        RepoError::InvalidData(format!("note {note_id} not found in read-back"))
    })
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    let is_archived = int_to_bool(row.get("is_archived")?, "notes.is_archived")?;
    let note = Note {
        id: Some(row.get("id")?),
        title: row.get("title")?,
        content: row.get("content")?,
        user_id: row.get("user_id")?,
        created_at: Some(row.get("created_at")?),
        updated_at: Some(row.get("updated_at")?),
        is_archived,
    };
    note.validate()?;
    Ok(note)
}

fn ensure_note_connection_ready(conn: &Connection) -> RepoResult<()> {
    for table in ["users", "notes"] {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    for column in [
        "id",
        "title",
        "content",
        "user_id",
        "created_at",
        "updated_at",
        "is_archived",
    ] {
        if !table_has_column(conn, "notes", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "notes",
                column,
            });
        }
    }

    Ok(())
}
