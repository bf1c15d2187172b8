//! User domain entity.
//!
//! # Responsibility
//! - Represent an account holder before and after persistence.
//! - Enforce username/email/password presence rules.
//!
//! # Invariants
//! - `id == None` marks a new user; only new users must carry a non-empty
//!   password, because persisted representations are always redacted.
//! - `date_joined` is assigned by the store and immutable thereafter.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Maximum username length in characters.
pub const USERNAME_MAX_CHARS: usize = 150;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("valid username regex"));

/// Entity-level validation failure for [`User`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyUsername,
    UsernameTooLong { length: usize },
    InvalidUsernameChars,
    InvalidEmail,
    EmptyPassword,
}

impl Display for UserValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username cannot be empty"),
            Self::UsernameTooLong { length } => write!(
                f,
                "username cannot exceed {USERNAME_MAX_CHARS} characters (got {length})"
            ),
            Self::InvalidUsernameChars => {
                write!(f, "username may only contain letters, digits and @/./+/-/_")
            }
            Self::InvalidEmail => write!(f, "email must be valid"),
            Self::EmptyPassword => write!(f, "password cannot be empty"),
        }
    }
}

impl Error for UserValidationError {}

/// Account holder record.
///
/// The `password` field holds plaintext only transiently, between service
/// validation and the store hashing it away. Every user hydrated from
/// storage carries an empty password, and the field never serializes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Row identity; `None` until the store persists this user.
    pub id: Option<i64>,
    pub username: String,
    pub email: String,
    /// Transient plaintext for new users; redacted on every read path.
    #[serde(skip)]
    pub password: String,
    /// Epoch milliseconds, assigned once by the store.
    pub date_joined: Option<i64>,
    pub is_active: bool,
}

impl User {
    /// Creates a new, unpersisted user and checks entity invariants.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, UserValidationError> {
        let user = Self {
            id: None,
            username: username.into(),
            email: email.into(),
            password: password.into(),
            date_joined: None,
            is_active: true,
        };
        user.validate()?;
        Ok(user)
    }

    /// Checks entity invariants.
    ///
    /// Persisted users (`id` set) are exempt from the password presence
    /// check: their password field is always redacted.
    pub fn validate(&self) -> Result<(), UserValidationError> {
        let username = self.username.trim();
        if username.is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        let length = username.chars().count();
        if length > USERNAME_MAX_CHARS {
            return Err(UserValidationError::UsernameTooLong { length });
        }
        if !USERNAME_RE.is_match(username) {
            return Err(UserValidationError::InvalidUsernameChars);
        }

        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(UserValidationError::InvalidEmail);
        }

        if self.id.is_none() && self.password.trim().is_empty() {
            return Err(UserValidationError::EmptyPassword);
        }

        Ok(())
    }

    /// Returns whether this user has been persisted.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}
