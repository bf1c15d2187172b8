//! Core domain logic for the notes application.
//! This crate is the single source of truth for business invariants:
//! validated entities, owner-scoped stores, and the auth/note services.

pub mod credential;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use credential::{hash_password, verify_password, CredentialError, PasswordPolicy};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::note::{Note, NoteValidationError, NOTE_TITLE_MAX_CHARS};
pub use model::user::{User, UserValidationError, USERNAME_MAX_CHARS};
pub use repo::note_repo::{NoteRepository, SqliteNoteRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::auth_service::AuthService;
pub use service::note_service::NoteService;
pub use service::{ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
