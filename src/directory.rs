//! User directory
//!
//! Looks up a registered student by Telegram chat identifier. SQLite-backed,
//! read-only from the bot's perspective; the table is populated out of band
//! (see [`SqliteUserDirectory::add_user`] for seeding).

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

/// A registered student
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub chat_id: i64,
    pub given_name: String,
    pub family_name: String,
}

/// Lookup by chat identifier. `Ok(None)` is a normal outcome (unknown user),
/// not an error; it drives the rejection-message branch.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find(&self, chat_id: i64) -> Result<Option<UserProfile>>;
}

/// SQLite-backed directory
pub struct SqliteUserDirectory {
    conn: Mutex<Connection>,
}

impl SqliteUserDirectory {
    /// Open or create the users database
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        let directory = Self {
            conn: Mutex::new(conn),
        };
        directory.init_schema()?;

        info!("User directory opened: {}", path.display());
        Ok(directory)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY,
                chat_id INTEGER NOT NULL UNIQUE,
                name TEXT NOT NULL,
                surname TEXT NOT NULL DEFAULT ''
            );
            "#,
        )?;
        Ok(())
    }

    /// Insert or update a student record (seeding and tests)
    pub fn add_user(&self, chat_id: i64, name: &str, surname: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO users (chat_id, name, surname) VALUES (?1, ?2, ?3)
             ON CONFLICT(chat_id) DO UPDATE SET name = ?2, surname = ?3",
            params![chat_id, name, surname],
        )?;
        Ok(())
    }

    fn find_sync(&self, chat_id: i64) -> Result<Option<UserProfile>> {
        let conn = self.lock()?;
        let profile = conn
            .query_row(
                "SELECT chat_id, name, surname FROM users WHERE chat_id = ?1",
                params![chat_id],
                |row| {
                    Ok(UserProfile {
                        chat_id: row.get(0)?,
                        given_name: row.get(1)?,
                        family_name: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(profile)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))
    }
}

#[async_trait]
impl UserDirectory for SqliteUserDirectory {
    async fn find(&self, chat_id: i64) -> Result<Option<UserProfile>> {
        self.find_sync(chat_id)
    }
}
