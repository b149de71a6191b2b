//! Storage layer for usertable.
//!
//! This module provides the record store: a single flat `users` collection
//! in `SQLite`, addressed by store-generated UUIDs.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::types::{Type, Value};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Number;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::user::{normalize, User, UserInput};

/// Column list shared by every user query.
const USER_COLUMNS: &str = "id, name, age, mobile";

/// Storage engine for user records.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&conn)?;

        let storage = Self { path, conn };
        info!(
            "Database opened at {} ({} users)",
            storage.path.display(),
            storage.count()?
        );
        Ok(storage)
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Validate the input and insert it as a new user with a fresh id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if a required field is missing, or a
    /// database error if the insert fails.
    pub fn create(&self, input: &UserInput) -> Result<User> {
        let fields = input.validate()?;
        let user = User::new(Uuid::new_v4().to_string(), fields);
        let now = Utc::now().to_rfc3339();

        self.conn.execute(
            r"
            INSERT INTO users (id, name, age, mobile, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            ",
            params![user.id, user.name, age_to_sql(&user.age), user.mobile, now],
        )?;

        debug!("Created user {}", user.id);
        Ok(user)
    }

    /// Get every user, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list(&self) -> Result<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY seq ASC"))?;

        let users = stmt
            .query_map([], Self::row_to_user)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(users)
    }

    /// Look a user up by id, returning `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn find(&self, id: &str) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                [id],
                Self::row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Get a user by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no such user exists, or a database error.
    pub fn get(&self, id: &str) -> Result<User> {
        self.find(id)?.ok_or_else(|| Error::not_found(id))
    }

    /// Replace the name, age and mobile of an existing user.
    ///
    /// The id is looked up before the body is validated, so an unknown id is
    /// reported as not found even when the body is also invalid.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`], [`Error::Validation`] or a database error.
    pub fn update(&self, id: &str, input: &UserInput) -> Result<User> {
        let existing = self.get(id)?;
        let fields = input.validate()?;
        let now = Utc::now().to_rfc3339();

        self.conn.execute(
            r"
            UPDATE users SET name = ?2, age = ?3, mobile = ?4, updated_at = ?5
            WHERE id = ?1
            ",
            params![
                existing.id,
                fields.name,
                age_to_sql(&fields.age),
                fields.mobile,
                now
            ],
        )?;

        debug!("Updated user {}", existing.id);
        Ok(User::new(existing.id, fields))
    }

    /// Delete a user by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no such user exists, or a database error.
    pub fn delete(&self, id: &str) -> Result<()> {
        let affected = self.conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
        if affected == 0 {
            return Err(Error::not_found(id));
        }
        debug!("Deleted user {}", id);
        Ok(())
    }

    /// Count stored users.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count)
    }

    fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get(0)?,
            name: row.get(1)?,
            age: age_from_sql(row.get(2)?)?,
            mobile: row.get(3)?,
        })
    }
}

fn age_to_sql(age: &Number) -> Value {
    match age.as_i64() {
        Some(n) => Value::Integer(n),
        None => Value::Real(age.as_f64().unwrap_or_default()),
    }
}

fn age_from_sql(value: Value) -> rusqlite::Result<Number> {
    let number = match value {
        Value::Integer(n) => Some(Number::from(n)),
        Value::Real(f) => Number::from_f64(f).map(normalize),
        _ => None,
    };
    number.ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(2, Type::Real, "age is not a number".into())
    })
}
