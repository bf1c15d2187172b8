//! Registration and authentication use-case service.
//!
//! # Responsibility
//! - Run the registration validation gate and delegate persistence to the
//!   user repository.
//! - Keep authentication failure messages uniform against enumeration.
//!
//! # Invariants
//! - The registration gate is linear and short-circuits at the first
//!   violated rule; it never accumulates messages.
//! - The same "incorrect" message answers unknown usernames and wrong
//!   passwords.

use crate::model::user::User;
use crate::repo::user_repo::UserRepository;
use crate::service::{ServiceError, ServiceResult};

/// Use-case service for account registration and login checks.
pub struct AuthService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> AuthService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a new user.
    ///
    /// Validation order: password presence (pre- and post-trim), username
    /// presence, email shape, password confirmation, username/email
    /// uniqueness, entity invariants, persistence. The password-strength
    /// policy runs inside the store as part of persistence.
    pub fn register_user(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
        password_confirm: &str,
    ) -> ServiceResult<User> {
        if password.is_empty() {
            return Err(ServiceError::message("password cannot be empty"));
        }

        let username = username.trim();
        let email = email.trim();
        let password = password.trim();
        let password_confirm = password_confirm.trim();

        if password.is_empty() {
            return Err(ServiceError::message("password cannot be empty"));
        }
        if username.is_empty() {
            return Err(ServiceError::message("username cannot be empty"));
        }
        if email.is_empty() || !email.contains('@') {
            return Err(ServiceError::message("email must be valid"));
        }
        if password != password_confirm {
            return Err(ServiceError::message("passwords do not match"));
        }
        if self.repo.exists_by_username(username)? {
            return Err(ServiceError::message("username is already in use"));
        }
        if self.repo.exists_by_email(email)? {
            return Err(ServiceError::message("email is already registered"));
        }

        let user = User::new(username, email, password)?;
        Ok(self.repo.create(&user)?)
    }

    /// Authenticates a user by username and password.
    ///
    /// Inactive users are rejected even when the credentials matched.
    pub fn authenticate_user(&self, username: &str, password: &str) -> ServiceResult<User> {
        if username.is_empty() || password.is_empty() {
            return Err(ServiceError::message("username and password are required"));
        }

        let Some(user) = self.repo.authenticate(username, password)? else {
            return Err(ServiceError::message("incorrect username or password"));
        };

        if !user.is_active {
            return Err(ServiceError::message("user is inactive"));
        }

        Ok(user)
    }
}
