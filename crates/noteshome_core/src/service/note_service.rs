//! Note lifecycle use-case service.
//!
//! # Responsibility
//! - Validate note input and delegate persistence to the note repository.
//! - Enforce ownership on every operation through the repository's
//!   owner-scoped contracts.
//!
//! # Invariants
//! - A repository "absent" answer is surfaced to callers as an explicit
//!   no-permission message; the service never reveals whether the note
//!   exists under another owner.
//! - Updates preserve `id`, `created_at` and the owner.

use crate::model::note::{Note, NOTE_TITLE_MAX_CHARS};
use crate::repo::note_repo::NoteRepository;
use crate::service::{ServiceError, ServiceResult};

/// Use-case service for the note lifecycle.
pub struct NoteService<R: NoteRepository> {
    repo: R,
}

impl<R: NoteRepository> NoteService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a note owned by `user_id`.
    pub fn create_note(
        &mut self,
        title: &str,
        content: &str,
        user_id: i64,
    ) -> ServiceResult<Note> {
        let title = title.trim();
        let content = content.trim();

        if title.is_empty() {
            return Err(ServiceError::message("note title cannot be empty"));
        }
        if title.chars().count() > NOTE_TITLE_MAX_CHARS {
            return Err(ServiceError::message(format!(
                "note title cannot exceed {NOTE_TITLE_MAX_CHARS} characters"
            )));
        }
        if user_id <= 0 {
            return Err(ServiceError::message("user id is required"));
        }

        let note = Note::new(title, content, user_id)?;
        Ok(self.repo.create(&note)?)
    }

    /// Fetches one note; absence and foreign ownership are reported with
    /// the same message.
    pub fn get_note(&self, note_id: i64, user_id: i64) -> ServiceResult<Note> {
        if note_id <= 0 {
            return Err(ServiceError::message("note id is required"));
        }
        if user_id <= 0 {
            return Err(ServiceError::message("user id is required"));
        }

        self.repo.get_by_id(note_id, user_id)?.ok_or_else(|| {
            ServiceError::message("the note does not exist or you do not have permission to access it")
        })
    }

    /// Lists the user's notes, most recently updated first.
    pub fn get_all_notes(
        &self,
        user_id: i64,
        include_archived: bool,
    ) -> ServiceResult<Vec<Note>> {
        if user_id <= 0 {
            return Err(ServiceError::message("user id is required"));
        }
        Ok(self.repo.get_all_by_user(user_id, include_archived)?)
    }

    /// Updates title/content/archival state of an existing note.
    ///
    /// Performs a read-before-write through [`Self::get_note`] to enforce
    /// ownership and to carry over the immutable `created_at`.
    pub fn update_note(
        &mut self,
        note_id: i64,
        title: &str,
        content: &str,
        user_id: i64,
        is_archived: bool,
    ) -> ServiceResult<Note> {
        let title = title.trim();
        let content = content.trim();

        if note_id <= 0 {
            return Err(ServiceError::message("note id is required"));
        }
        if title.is_empty() {
            return Err(ServiceError::message("note title cannot be empty"));
        }
        if title.chars().count() > NOTE_TITLE_MAX_CHARS {
            return Err(ServiceError::message(format!(
                "note title cannot exceed {NOTE_TITLE_MAX_CHARS} characters"
            )));
        }
        if user_id <= 0 {
            return Err(ServiceError::message("user id is required"));
        }

        let existing = self.get_note(note_id, user_id)?;

        let mut updated = Note::with_id(note_id, title, content, user_id)?;
        updated.created_at = existing.created_at;
        updated.is_archived = is_archived;
        Ok(self.repo.update(&updated)?)
    }

    /// Deletes a note; deleting a nonexistent or foreign note is an error
    /// message, never a panic.
    pub fn delete_note(&mut self, note_id: i64, user_id: i64) -> ServiceResult<()> {
        if note_id <= 0 {
            return Err(ServiceError::message("note id is required"));
        }
        if user_id <= 0 {
            return Err(ServiceError::message("user id is required"));
        }

        if !self.repo.delete(note_id, user_id)? {
            return Err(ServiceError::message(
                "the note does not exist or you do not have permission to delete it",
            ));
        }
        Ok(())
    }
}
