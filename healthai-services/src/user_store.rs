//! User Store
//!
//! SQLite-backed storage for user accounts and their analysis history.

use std::path::Path;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};

use healthai_core::{AnalysisKind, AnalysisRecord, HealthError, User};

/// SQLite-backed user store
pub struct UserStore {
    conn: Mutex<Connection>,
}

/// Insert payload for a new account
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub full_name: String,
    /// Absent for OAuth-only accounts
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
    pub oauth_provider: Option<String>,
    pub profile_picture: Option<String>,
    pub is_verified: bool,
}

impl UserStore {
    /// Open or create the database file and its tables
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self, UserStoreError> {
        if let Some(parent) = db_path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                UserStoreError::Io(format!("Failed to create database directory: {}", e))
            })?;
        }

        let conn = Connection::open(db_path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;

        Ok(store)
    }

    /// Create an in-memory store (useful for testing)
    pub fn new_in_memory() -> Result<Self, UserStoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;

        Ok(store)
    }

    /// Initialize the database schema
    fn init_schema(&self) -> Result<(), UserStoreError> {
        let conn = self.conn.lock();

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL UNIQUE,
                full_name TEXT NOT NULL,
                password_hash TEXT,
                google_id TEXT UNIQUE,
                oauth_provider TEXT,
                profile_picture TEXT,
                is_active INTEGER NOT NULL DEFAULT 1,
                is_verified INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL,
                last_login INTEGER
            );

            CREATE INDEX IF NOT EXISTS idx_users_email
            ON users(email);

            CREATE TABLE IF NOT EXISTS analysis_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id),
                kind TEXT NOT NULL,
                result JSON NOT NULL,
                confidence REAL,
                diagnosis TEXT,
                created_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_history_user
            ON analysis_history(user_id, created_at);
            "#,
        )?;

        Ok(())
    }

    /// Insert a new account and return the stored row
    ///
    /// Fails with a constraint violation when the email (or google_id) is
    /// already taken; callers check for an existing account first to report
    /// a friendlier error.
    pub fn create_user(&self, new_user: &NewUser) -> Result<User, UserStoreError> {
        let conn = self.conn.lock();

        conn.execute(
            r#"
            INSERT INTO users (email, full_name, password_hash, google_id, oauth_provider,
                               profile_picture, is_verified, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                new_user.email,
                new_user.full_name,
                new_user.password_hash,
                new_user.google_id,
                new_user.oauth_provider,
                new_user.profile_picture,
                new_user.is_verified,
                Utc::now().timestamp(),
            ],
        )?;

        let id = conn.last_insert_rowid();
        let user = conn.query_row(
            &format!("{} WHERE id = ?1", SELECT_USER),
            params![id],
            map_user_row,
        )?;

        Ok(user)
    }

    /// Look up an account by email
    pub fn find_by_email(&self, email: &str) -> Result<Option<User>, UserStoreError> {
        let conn = self.conn.lock();
        let user = conn
            .query_row(
                &format!("{} WHERE email = ?1", SELECT_USER),
                params![email],
                map_user_row,
            )
            .optional()?;

        Ok(user)
    }

    /// Look up an account by id
    pub fn find_by_id(&self, id: i64) -> Result<Option<User>, UserStoreError> {
        let conn = self.conn.lock();
        let user = conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_USER),
                params![id],
                map_user_row,
            )
            .optional()?;

        Ok(user)
    }

    /// Look up an account by its Google subject id
    pub fn find_by_google_id(&self, google_id: &str) -> Result<Option<User>, UserStoreError> {
        let conn = self.conn.lock();
        let user = conn
            .query_row(
                &format!("{} WHERE google_id = ?1", SELECT_USER),
                params![google_id],
                map_user_row,
            )
            .optional()?;

        Ok(user)
    }

    /// Attach a Google identity to an existing password account
    pub fn link_google(
        &self,
        user_id: i64,
        google_id: &str,
        profile_picture: Option<&str>,
    ) -> Result<(), UserStoreError> {
        let conn = self.conn.lock();
        conn.execute(
            r#"
            UPDATE users
            SET google_id = ?2,
                oauth_provider = 'google',
                profile_picture = COALESCE(?3, profile_picture),
                is_verified = 1
            WHERE id = ?1
            "#,
            params![user_id, google_id, profile_picture],
        )?;

        Ok(())
    }

    /// Update the last-login timestamp
    pub fn touch_last_login(&self, user_id: i64) -> Result<(), UserStoreError> {
        let conn = self.conn.lock();
        conn.execute(
            "UPDATE users SET last_login = ?2 WHERE id = ?1",
            params![user_id, Utc::now().timestamp()],
        )?;

        Ok(())
    }

    /// Store one analysis outcome for a user
    pub fn record_analysis(
        &self,
        user_id: i64,
        kind: AnalysisKind,
        result: &serde_json::Value,
        confidence: Option<f64>,
        diagnosis: Option<&str>,
    ) -> Result<i64, UserStoreError> {
        let conn = self.conn.lock();
        conn.execute(
            r#"
            INSERT INTO analysis_history (user_id, kind, result, confidence, diagnosis, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                user_id,
                kind.as_str(),
                result.to_string(),
                confidence,
                diagnosis,
                Utc::now().timestamp(),
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Fetch a user's analysis history, newest first
    pub fn history_for_user(
        &self,
        user_id: i64,
        limit: usize,
    ) -> Result<Vec<AnalysisRecord>, UserStoreError> {
        let conn = self.conn.lock();

        let mut stmt = conn.prepare(
            r#"
            SELECT id, user_id, kind, result, confidence, diagnosis, created_at
            FROM analysis_history
            WHERE user_id = ?1
            ORDER BY created_at DESC, id DESC
            LIMIT ?2
            "#,
        )?;

        let records = stmt
            .query_map(params![user_id, limit as i64], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<f64>>(4)?,
                    row.get::<_, Option<String>>(5)?,
                    row.get::<_, i64>(6)?,
                ))
            })?
            .filter_map(|r| r.ok())
            .filter_map(
                |(id, user_id, kind, result, confidence, diagnosis, created_at)| {
                    Some(AnalysisRecord {
                        id,
                        user_id,
                        kind: AnalysisKind::from_str(&kind)?,
                        result: serde_json::from_str(&result).unwrap_or(serde_json::Value::Null),
                        confidence,
                        diagnosis,
                        created_at: DateTime::from_timestamp(created_at, 0)
                            .unwrap_or_else(Utc::now),
                    })
                },
            )
            .collect();

        Ok(records)
    }
}

/// Shared SELECT column list so every lookup maps rows identically
const SELECT_USER: &str = r#"
    SELECT id, email, full_name, password_hash, google_id, oauth_provider,
           profile_picture, is_active, is_verified, created_at, last_login
    FROM users
"#;

fn map_user_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let created_at: i64 = row.get(9)?;
    let last_login: Option<i64> = row.get(10)?;

    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        full_name: row.get(2)?,
        password_hash: row.get(3)?,
        google_id: row.get(4)?,
        oauth_provider: row.get(5)?,
        profile_picture: row.get(6)?,
        is_active: row.get(7)?,
        is_verified: row.get(8)?,
        created_at: DateTime::from_timestamp(created_at, 0).unwrap_or_else(Utc::now),
        last_login: last_login.and_then(|ts| DateTime::from_timestamp(ts, 0)),
    })
}

/// Errors that can occur during user store operations
#[derive(Debug, thiserror::Error)]
pub enum UserStoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<UserStoreError> for HealthError {
    fn from(e: UserStoreError) -> Self {
        HealthError::storage(e.to_string())
    }
}
