// ── Local persistence ──
//
// One SQLite database holds the credential singleton and the rule
// bookmarks. The connection lives behind a mutex shared by both stores;
// every write is a single parameterized statement, or one transaction for
// bulk import.

mod bookmarks;
mod credentials;

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;
use tracing::debug;

use crate::error::CoreError;

pub use bookmarks::{BookmarkStore, RuleBookmark};
pub use credentials::{ApiCredentials, CredentialStore, PasswordUpdate, UNCHANGED_PASSWORD};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS rules (
    id   INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    uuid TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS api_info (
    id            INTEGER PRIMARY KEY CHECK (id = 1),
    api_key       TEXT NOT NULL UNIQUE,
    api_secret    TEXT NOT NULL UNIQUE,
    url           TEXT NOT NULL UNIQUE,
    port          INTEGER NOT NULL,
    password_hash TEXT
);
";

/// Handle to the local database. Cheap to clone.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}

impl Database {
    /// Open (or create) the database file, creating parent directories and
    /// the schema as needed.
    pub fn open(path: &Path) -> Result<Self, CoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                CoreError::Storage(format!("cannot create {}: {e}", parent.display()))
            })?;
        }
        debug!(path = %path.display(), "opening database");
        Self::init(Connection::open(path)?)
    }

    /// A private in-memory database.
    pub fn open_in_memory() -> Result<Self, CoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, CoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn credentials(&self) -> CredentialStore {
        CredentialStore::new(self.clone())
    }

    pub fn bookmarks(&self) -> BookmarkStore {
        BookmarkStore::new(self.clone())
    }

    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, Connection>, CoreError> {
        self.conn
            .lock()
            .map_err(|_| CoreError::Storage("database lock poisoned".into()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn open_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("opnly.db");
        let db = Database::open(&path).unwrap();
        assert!(path.exists());
        assert!(db.bookmarks().list().unwrap().is_empty());
    }

    #[test]
    fn reopen_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("opnly.db");
        {
            let db = Database::open(&path).unwrap();
            db.bookmarks().upsert("WAN-block", "uuid-1").unwrap();
        }
        let db = Database::open(&path).unwrap();
        assert_eq!(db.bookmarks().list().unwrap().len(), 1);
    }
}
