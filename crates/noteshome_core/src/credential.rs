//! Credential policy and password hashing.
//!
//! # Responsibility
//! - Enforce the configurable password-strength policy applied before any
//!   user row is written.
//! - Hash and verify passwords as PHC-format Argon2id strings.
//!
//! # Invariants
//! - Policy checks collect every violated rule; callers present all of them.
//! - Plaintext passwords never leave this module in any form other than a
//!   PHC hash string.

use crate::model::user::User;
use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

const DEFAULT_MIN_PASSWORD_CHARS: usize = 8;

/// Attributes shorter than this are too generic for a similarity match.
const SIMILARITY_MIN_ATTR_CHARS: usize = 3;

static NUMERIC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").expect("valid numeric regex"));

/// Passwords rejected outright regardless of the other rules.
const COMMON_PASSWORDS: &[&str] = &[
    "password", "contraseña", "12345678", "123456789", "qwertyuiop", "letmein1", "iloveyou",
    "admin123", "welcome1", "abc12345",
];

/// Failure raised by the hashing/verification primitives.
#[derive(Debug)]
pub enum CredentialError {
    /// The hashing backend rejected the input.
    HashingFailed(String),
    /// A stored hash is not a parseable PHC string.
    MalformedHash(String),
}

impl Display for CredentialError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HashingFailed(cause) => write!(f, "password hashing failed: {cause}"),
            Self::MalformedHash(cause) => write!(f, "stored password hash is malformed: {cause}"),
        }
    }
}

impl Error for CredentialError {}

/// Configurable password-strength policy.
///
/// The default mirrors the rule chain the application has always shipped
/// with: minimum length, user-attribute similarity, common-password list,
/// and an all-numeric rejection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub reject_user_similarity: bool,
    pub reject_common_passwords: bool,
    pub reject_numeric_only: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_MIN_PASSWORD_CHARS,
            reject_user_similarity: true,
            reject_common_passwords: true,
            reject_numeric_only: true,
        }
    }
}

impl PasswordPolicy {
    /// Checks `password` against every enabled rule.
    ///
    /// Returns all violated rules as human-readable messages; an empty
    /// result list never occurs (`Ok(())` signals acceptance).
    pub fn validate(&self, password: &str, user: &User) -> Result<(), Vec<String>> {
        let mut violations = Vec::new();

        if password.chars().count() < self.min_length {
            violations.push(format!(
                "password is too short: it must contain at least {} characters",
                self.min_length
            ));
        }

        if self.reject_user_similarity {
            if let Some(attribute) = similar_user_attribute(password, user) {
                violations.push(format!("password is too similar to the {attribute}"));
            }
        }

        if self.reject_common_passwords
            && COMMON_PASSWORDS.contains(&password.to_lowercase().as_str())
        {
            violations.push("password is too common".to_string());
        }

        if self.reject_numeric_only && NUMERIC_RE.is_match(password) {
            violations.push("password is entirely numeric".to_string());
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

/// Hashes a password with Argon2id and a fresh random salt.
///
/// Returns a PHC-format string suitable for the `users.password_hash`
/// column.
pub fn hash_password(password: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| CredentialError::HashingFailed(err.to_string()))?;
    Ok(hash.to_string())
}

/// Verifies a password against a stored PHC-format hash.
///
/// `Ok(false)` on mismatch; `Err` only when the stored hash itself cannot
/// be parsed.
pub fn verify_password(password: &str, phc_hash: &str) -> Result<bool, CredentialError> {
    let parsed = PasswordHash::new(phc_hash)
        .map_err(|err| CredentialError::MalformedHash(err.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Returns which user attribute the password overlaps with, if any.
fn similar_user_attribute(password: &str, user: &User) -> Option<&'static str> {
    let lowered = password.to_lowercase();
    if attribute_overlaps(&lowered, &user.username) {
        return Some("username");
    }

    let email = user.email.to_lowercase();
    let local_part = email.split('@').next().unwrap_or_default();
    if attribute_overlaps(&lowered, &email) || attribute_overlaps(&lowered, local_part) {
        return Some("email address");
    }

    None
}

fn attribute_overlaps(lowered_password: &str, attribute: &str) -> bool {
    let attribute = attribute.trim().to_lowercase();
    if attribute.chars().count() < SIMILARITY_MIN_ATTR_CHARS {
        return false;
    }
    lowered_password.contains(&attribute) || attribute.contains(lowered_password)
}
