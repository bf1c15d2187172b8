//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Funnel every expected failure into display-ready messages.
//!
//! # Invariants
//! - Services never panic or propagate raw persistence errors; expected
//!   failures always surface as [`ServiceError`].
//! - Validation gates short-circuit: only the first violated rule is
//!   reported.

use crate::model::note::NoteValidationError;
use crate::model::user::UserValidationError;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod auth_service;
pub mod note_service;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Business-rule failure carrying user-displayable messages.
///
/// Callers render every message verbatim; there is no error-code taxonomy
/// beyond the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    messages: Vec<String>,
}

impl ServiceError {
    /// Builds an error carrying a single message.
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            messages: vec![text.into()],
        }
    }

    /// The display-ready messages, in the order they were produced.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.messages.join("; "))
    }
}

impl Error for ServiceError {}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::message(value.to_string())
    }
}

impl From<UserValidationError> for ServiceError {
    fn from(value: UserValidationError) -> Self {
        Self::message(value.to_string())
    }
}

impl From<NoteValidationError> for ServiceError {
    fn from(value: NoteValidationError) -> Self {
        Self::message(value.to_string())
    }
}
