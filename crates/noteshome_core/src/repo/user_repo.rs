//! User repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable account persistence APIs over the `users` table.
//! - Own the validate-hash-insert sequence for new credentials.
//!
//! # Invariants
//! - Password-strength policy runs before any row is written.
//! - Hydrated users always carry an empty (redacted) password.
//! - `authenticate` answers identically for unknown usernames and wrong
//!   passwords.
//! - Log events are metadata-only; no credential material.

use crate::credential::{self, PasswordPolicy};
use crate::model::user::User;
use crate::repo::{
    bool_to_int, int_to_bool, table_exists, table_has_column, RepoError, RepoResult,
};
use log::{error, info, warn};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};

const USER_SELECT_SQL: &str = "SELECT
    id,
    username,
    email,
    date_joined,
    is_active
FROM users";

/// Repository interface for account operations.
pub trait UserRepository {
    /// Persists a new, unpersisted user and returns the hydrated row.
    fn create(&mut self, user: &User) -> RepoResult<User>;
    /// Case-sensitive exact lookup; absence is `Ok(None)`, never an error.
    fn get_by_username(&self, username: &str) -> RepoResult<Option<User>>;
    /// Lookup by row identity; same contract as [`Self::get_by_username`].
    fn get_by_id(&self, user_id: i64) -> RepoResult<Option<User>>;
    /// Race-tolerant existence predicate used for uniqueness pre-checks.
    fn exists_by_username(&self, username: &str) -> RepoResult<bool>;
    /// Race-tolerant existence predicate used for uniqueness pre-checks.
    fn exists_by_email(&self, email: &str) -> RepoResult<bool>;
    /// Verifies credentials; `Ok(None)` for unknown user and wrong password
    /// alike. Does not filter on `is_active`.
    fn authenticate(&self, username: &str, password: &str) -> RepoResult<Option<User>>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn mut Connection,
    policy: PasswordPolicy,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection, using the
    /// default password policy.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        Self::try_new_with_policy(conn, PasswordPolicy::default())
    }

    /// Constructs a repository with an externally configured policy.
    pub fn try_new_with_policy(
        conn: &'conn mut Connection,
        policy: PasswordPolicy,
    ) -> RepoResult<Self> {
        ensure_user_connection_ready(conn)?;
        Ok(Self { conn, policy })
    }

    fn insert_user(&mut self, user: &User) -> RepoResult<User> {
        let password_hash = credential::hash_password(&user.password)
            .map_err(|err| RepoError::Validation(format!("failed to create user: {err}")))?;
        let joined_at = crate::db::now_epoch_ms();

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        if let Err(err) = tx.execute(
            "INSERT INTO users (username, email, password_hash, date_joined, is_active)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                user.username,
                user.email,
                password_hash,
                joined_at,
                bool_to_int(user.is_active),
            ],
        ) {
            return Err(wrap_insert_error(err));
        }

        let user_id = tx.last_insert_rowid();
        let created = load_user_in_tx(&tx, user_id)?;
        tx.commit()?;
        Ok(created)
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create(&mut self, user: &User) -> RepoResult<User> {
        user.validate()?;
        if user.is_persisted() {
            return Err(RepoError::Validation(
                "cannot create an already persisted user".to_string(),
            ));
        }

        info!(
            "event=user_insert module=user_repo status=start username={}",
            user.username
        );

        if let Err(violations) = self.policy.validate(&user.password, user) {
            let cause = violations.join("; ");
            error!(
                "event=user_insert module=user_repo status=error username={} error_code=password_policy error={cause}",
                user.username
            );
            return Err(RepoError::Validation(cause));
        }

        match self.insert_user(user) {
            Ok(created) => {
                info!(
                    "event=user_insert module=user_repo status=ok user_id={} username={}",
                    created.id.unwrap_or_default(),
                    created.username
                );
                Ok(created)
            }
            Err(RepoError::Db(err)) => {
                error!(
                    "event=user_insert module=user_repo status=error username={} error={err}",
                    user.username
                );
                Err(RepoError::Validation(format!("failed to create user: {err}")))
            }
            Err(other) => {
                error!(
                    "event=user_insert module=user_repo status=error username={} error={other}",
                    user.username
                );
                Err(other)
            }
        }
    }

    fn get_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE username = ?1;"))?;
        let mut rows = stmt.query([username])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }

    fn get_by_id(&self, user_id: i64) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([user_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }

    fn exists_by_username(&self, username: &str) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1);",
            [username],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn exists_by_email(&self, email: &str) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1);",
            [email],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn authenticate(&self, username: &str, password: &str) -> RepoResult<Option<User>> {
        let credential_row: Option<(i64, String)> = {
            let mut stmt = self
                .conn
                .prepare("SELECT id, password_hash FROM users WHERE username = ?1;")?;
            let mut rows = stmt.query([username])?;
            match rows.next()? {
                Some(row) => Some((row.get(0)?, row.get(1)?)),
                None => None,
            }
        };

        let Some((user_id, stored_hash)) = credential_row else {
            warn!("event=user_authenticate module=user_repo status=failed username={username}");
            return Ok(None);
        };

        let verified = credential::verify_password(password, &stored_hash).map_err(|err| {
            error!(
                "event=user_authenticate module=user_repo status=error user_id={user_id} error_code=malformed_hash"
            );
            RepoError::InvalidData(format!("stored credential for user {user_id}: {err}"))
        })?;

        if !verified {
            warn!("event=user_authenticate module=user_repo status=failed username={username}");
            return Ok(None);
        }

        info!(
            "event=user_authenticate module=user_repo status=ok user_id={user_id} username={username}"
        );
        self.get_by_id(user_id)
    }
}

fn wrap_insert_error(err: rusqlite::Error) -> RepoError {
    // Existence pre-checks are not serialized against concurrent creates;
    // the UNIQUE constraints are the last line of defense.
    if is_unique_violation(&err) {
        RepoError::Validation("username or email is already in use".to_string())
    } else {
        RepoError::Validation(format!("failed to create user: {err}"))
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

fn load_user_in_tx(tx: &Transaction<'_>, user_id: i64) -> RepoResult<User> {
    let mut stmt = tx.prepare(&format!("{USER_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([user_id])?;
    match rows.next()? {
        Some(row) => parse_user_row(row),
        None => Err(RepoError::InvalidData(format!(
            "created user {user_id} not found in read-back"
        ))),
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let is_active = int_to_bool(row.get("is_active")?, "users.is_active")?;
    let user = User {
        id: Some(row.get("id")?),
        username: row.get("username")?,
        email: row.get("email")?,
        // Persisted representations never carry real passwords.
        password: String::new(),
        date_joined: Some(row.get("date_joined")?),
        is_active,
    };
    user.validate()?;
    Ok(user)
}

fn ensure_user_connection_ready(conn: &Connection) -> RepoResult<()> {
    if !table_exists(conn, "users")? {
        return Err(RepoError::MissingRequiredTable("users"));
    }

    for column in [
        "id",
        "username",
        "email",
        "password_hash",
        "date_joined",
        "is_active",
    ] {
        if !table_has_column(conn, "users", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "users",
                column,
            });
        }
    }

    Ok(())
}
