use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};

use crate::{error::StoreError, types::CredentialTableRow};

/// A persisted credential row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredential {
    pub user_id: String,
    pub refresh_token: String,
    pub updated_at: String,
}

impl From<StoredCredential> for CredentialTableRow {
    fn from(stored: StoredCredential) -> Self {
        let updated = DateTime::parse_from_rfc3339(&stored.updated_at)
            .map(|at| at.with_timezone(&Utc).format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or(stored.updated_at);
        CredentialTableRow {
            user: stored.user_id,
            updated,
        }
    }
}

/// Durable refresh-token storage, one row per Spotify user.
///
/// Each operation opens its own connection on the blocking pool; the store
/// itself only remembers the database path.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Opens (and if needed creates) the database at `path`.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            async_fs::create_dir_all(parent).await?;
        }

        let store = CredentialStore { path };
        store
            .with_connection(|conn| {
                conn.execute(
                    "CREATE TABLE IF NOT EXISTS users (
                        user_id TEXT PRIMARY KEY,
                        refresh_token TEXT NOT NULL,
                        updated_at TEXT NOT NULL
                    )",
                    [],
                )?;
                Ok(())
            })
            .await?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stores the refresh token for `user_id`, replacing any previous one.
    pub async fn save(&self, user_id: &str, refresh_token: &str) -> Result<(), StoreError> {
        let user_id = user_id.to_string();
        let refresh_token = refresh_token.to_string();
        let updated_at = Utc::now().to_rfc3339();

        self.with_connection(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO users (user_id, refresh_token, updated_at) VALUES (?1, ?2, ?3)",
                params![user_id, refresh_token, updated_at],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn load(&self, user_id: &str) -> Result<Option<String>, StoreError> {
        let user_id = user_id.to_string();
        self.with_connection(move |conn| {
            conn.query_row(
                "SELECT refresh_token FROM users WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()
        })
        .await
    }

    /// Deletes the row of `user_id`, returning whether there was one.
    pub async fn remove(&self, user_id: &str) -> Result<bool, StoreError> {
        let user_id = user_id.to_string();
        self.with_connection(move |conn| {
            let removed = conn.execute("DELETE FROM users WHERE user_id = ?1", params![user_id])?;
            Ok(removed > 0)
        })
        .await
    }

    pub async fn list(&self) -> Result<Vec<StoredCredential>, StoreError> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id, refresh_token, updated_at FROM users ORDER BY user_id ASC",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(StoredCredential {
                    user_id: row.get(0)?,
                    refresh_token: row.get(1)?,
                    updated_at: row.get(2)?,
                })
            })?;

            let mut credentials = Vec::new();
            for row in rows {
                credentials.push(row?);
            }
            Ok(credentials)
        })
        .await
    }

    async fn with_connection<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, rusqlite::Error> + Send + 'static,
    {
        let path = self.path.clone();
        let result = tokio::task::spawn_blocking(move || {
            let conn = Connection::open(path)?;
            f(&conn)
        })
        .await??;
        Ok(result)
    }
}
