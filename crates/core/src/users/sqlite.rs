//! SQLite-backed user store.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use uuid::Uuid;

use super::{User, UserError, UserStore};

/// SQLite-backed user store.
pub struct SqliteUserStore {
    conn: Mutex<Connection>,
}

impl SqliteUserStore {
    /// Create a new SQLite user store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, UserError> {
        let conn = Connection::open(path).map_err(|e| UserError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite user store (useful for testing).
    pub fn in_memory() -> Result<Self, UserError> {
        let conn = Connection::open_in_memory().map_err(|e| UserError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), UserError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE COLLATE NOCASE,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS revoked_tokens (
                jti TEXT PRIMARY KEY,
                expires_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS watchlist_items (
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                item_id TEXT NOT NULL,
                added_at TEXT NOT NULL,
                PRIMARY KEY (user_id, item_id)
            );
            "#,
        )
        .map_err(|e| UserError::Database(e.to_string()))?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, UserError> {
        self.conn
            .lock()
            .map_err(|e| UserError::Internal(format!("user store lock poisoned: {e}")))
    }

    fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
        let created_at_str: String = row.get(3)?;
        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        Ok(User {
            id: row.get(0)?,
            email: row.get(1)?,
            password_hash: row.get(2)?,
            created_at,
        })
    }
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

impl UserStore for SqliteUserStore {
    fn create_user(&self, email: &str, password_hash: &str) -> Result<User, UserError> {
        let conn = self.lock()?;
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };

        conn.execute(
            "INSERT INTO users (id, email, password_hash, created_at) VALUES (?, ?, ?, ?)",
            params![
                &user.id,
                &user.email,
                &user.password_hash,
                user.created_at.to_rfc3339()
            ],
        )
        .map_err(|e| {
            if is_constraint_violation(&e) {
                UserError::AlreadyExists(email.to_string())
            } else {
                UserError::Database(e.to_string())
            }
        })?;

        Ok(user)
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = ? COLLATE NOCASE",
            params![email],
            Self::row_to_user,
        )
        .optional()
        .map_err(|e| UserError::Database(e.to_string()))
    }

    fn get_user(&self, id: &str) -> Result<Option<User>, UserError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT id, email, password_hash, created_at FROM users WHERE id = ?",
            params![id],
            Self::row_to_user,
        )
        .optional()
        .map_err(|e| UserError::Database(e.to_string()))
    }

    fn revoke_token(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<(), UserError> {
        let conn = self.lock()?;

        // Revocations only matter until the token would have expired anyway.
        conn.execute(
            "DELETE FROM revoked_tokens WHERE expires_at < ?",
            params![Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)],
        )
        .map_err(|e| UserError::Database(e.to_string()))?;

        conn.execute(
            "INSERT OR REPLACE INTO revoked_tokens (jti, expires_at) VALUES (?, ?)",
            params![jti, expires_at.to_rfc3339_opts(SecondsFormat::Secs, true)],
        )
        .map_err(|e| UserError::Database(e.to_string()))?;

        Ok(())
    }

    fn is_token_revoked(&self, jti: &str) -> Result<bool, UserError> {
        let conn = self.lock()?;
        let revoked = conn
            .query_row(
                "SELECT 1 FROM revoked_tokens WHERE jti = ?",
                params![jti],
                |_| Ok(true),
            )
            .optional()
            .map_err(|e| UserError::Database(e.to_string()))?;
        Ok(revoked.unwrap_or(false))
    }

    fn watchlist(&self, user_id: &str) -> Result<Vec<String>, UserError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT item_id FROM watchlist_items WHERE user_id = ? ORDER BY rowid")
            .map_err(|e| UserError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![user_id], |row| row.get::<_, String>(0))
            .map_err(|e| UserError::Database(e.to_string()))?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(row.map_err(|e| UserError::Database(e.to_string()))?);
        }
        Ok(ids)
    }

    fn add_to_watchlist(&self, user_id: &str, item_id: &str) -> Result<(), UserError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO watchlist_items (user_id, item_id, added_at) VALUES (?, ?, ?)",
            params![user_id, item_id, Utc::now().to_rfc3339()],
        )
        .map_err(|e| {
            if is_constraint_violation(&e) {
                UserError::AlreadyInWatchlist(item_id.to_string())
            } else {
                UserError::Database(e.to_string())
            }
        })?;
        Ok(())
    }

    fn remove_from_watchlist(&self, user_id: &str, item_id: &str) -> Result<bool, UserError> {
        let conn = self.lock()?;
        let removed = conn
            .execute(
                "DELETE FROM watchlist_items WHERE user_id = ? AND item_id = ?",
                params![user_id, item_id],
            )
            .map_err(|e| UserError::Database(e.to_string()))?;
        Ok(removed > 0)
    }
}
