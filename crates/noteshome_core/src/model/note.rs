//! Note domain entity.
//!
//! # Responsibility
//! - Represent a personal text note owned by exactly one user.
//! - Enforce title presence/length and owner presence rules.
//!
//! # Invariants
//! - `user_id` is a back-reference only; a note never owns its user.
//! - `created_at` is set once by the store; `updated_at` advances on every
//!   mutation.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Maximum note title length in characters.
pub const NOTE_TITLE_MAX_CHARS: usize = 200;

/// Entity-level validation failure for [`Note`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    EmptyTitle,
    TitleTooLong { length: usize },
    MissingOwner,
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "note title cannot be empty"),
            Self::TitleTooLong { length } => write!(
                f,
                "note title cannot exceed {NOTE_TITLE_MAX_CHARS} characters (got {length})"
            ),
            Self::MissingOwner => write!(f, "user id is required"),
        }
    }
}

impl Error for NoteValidationError {}

/// Personal text note, exclusively owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Row identity; `None` until the store persists this note.
    pub id: Option<i64>,
    pub title: String,
    /// Body text; empty by default, never null.
    pub content: String,
    /// Owning user id. Every read/update/delete filters on it.
    pub user_id: i64,
    /// Epoch milliseconds, assigned once at creation.
    pub created_at: Option<i64>,
    /// Epoch milliseconds, refreshed by every mutation.
    pub updated_at: Option<i64>,
    pub is_archived: bool,
}

impl Note {
    /// Creates a new, unpersisted note and checks entity invariants.
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        user_id: i64,
    ) -> Result<Self, NoteValidationError> {
        Self::build(None, title, content, user_id)
    }

    /// Creates a note value carrying an existing identity.
    ///
    /// Used by update paths where the row already exists.
    pub fn with_id(
        id: i64,
        title: impl Into<String>,
        content: impl Into<String>,
        user_id: i64,
    ) -> Result<Self, NoteValidationError> {
        Self::build(Some(id), title, content, user_id)
    }

    fn build(
        id: Option<i64>,
        title: impl Into<String>,
        content: impl Into<String>,
        user_id: i64,
    ) -> Result<Self, NoteValidationError> {
        let note = Self {
            id,
            title: title.into(),
            content: content.into(),
            user_id,
            created_at: None,
            updated_at: None,
            is_archived: false,
        };
        note.validate()?;
        Ok(note)
    }

    /// Checks entity invariants.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(NoteValidationError::EmptyTitle);
        }
        let length = title.chars().count();
        if length > NOTE_TITLE_MAX_CHARS {
            return Err(NoteValidationError::TitleTooLong { length });
        }
        if self.user_id <= 0 {
            return Err(NoteValidationError::MissingOwner);
        }
        Ok(())
    }
}
