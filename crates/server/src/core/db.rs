//! Database handle
//!
//! All persistent state lives in one SQLite database. The pool is owned by
//! [`Db`], which is cloned into every manager instead of living in a global.

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        full_name TEXT NOT NULL,
        email TEXT UNIQUE NOT NULL COLLATE NOCASE,
        password_hash TEXT NOT NULL,
        bio TEXT NOT NULL DEFAULT '',
        profile_pic TEXT NOT NULL DEFAULT '',
        native_language TEXT NOT NULL DEFAULT '',
        learning_language TEXT NOT NULL DEFAULT '',
        location TEXT NOT NULL DEFAULT '',
        is_onboarded INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS friend_requests (
        id TEXT PRIMARY KEY,
        sender_id TEXT NOT NULL,
        recipient_id TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'pending',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        FOREIGN KEY (sender_id) REFERENCES users(id),
        FOREIGN KEY (recipient_id) REFERENCES users(id)
    )
    "#,
    // One request per unordered pair, whichever side sent it.
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS friend_requests_pair
        ON friend_requests (min(sender_id, recipient_id), max(sender_id, recipient_id))
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS friendships (
        user_id TEXT NOT NULL,
        friend_id TEXT NOT NULL,
        created_at TEXT NOT NULL,
        PRIMARY KEY (user_id, friend_id),
        FOREIGN KEY (user_id) REFERENCES users(id),
        FOREIGN KEY (friend_id) REFERENCES users(id)
    )
    "#,
];

/// Shared handle to the SQLite pool.
#[derive(Clone, Debug)]
pub struct Db {
    pool: SqlitePool,
}

impl Db {
    /// Connect using a sqlx URL such as `sqlite://streamify.sqlite`.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        let db = Self { pool };
        db.init_schema().await?;

        info!("[Db] Connected to {}", url);
        Ok(db)
    }

    /// Open (or create) a database file at `path`.
    pub async fn open(path: &Path) -> Result<Self> {
        Self::connect(&format!(
            "sqlite://{}",
            path.to_string_lossy().replace('\\', "/")
        ))
        .await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn init_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn schema_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("db.sqlite");

        let db = Db::open(&path).await.unwrap();
        db.close().await;

        // Reopening runs the schema again against existing tables.
        let db = Db::open(&path).await.unwrap();
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
