use rusqlite::params;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::Database;
use crate::error::CoreError;

/// A locally stored pointer to a remote filter rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleBookmark {
    pub id: i64,
    pub name: String,
    pub uuid: String,
}

/// Persists rule bookmarks. `uuid` is unique; names may repeat.
#[derive(Debug, Clone)]
pub struct BookmarkStore {
    db: Database,
}

impl BookmarkStore {
    pub(crate) fn new(db: Database) -> Self {
        Self { db }
    }

    /// All bookmarks in insertion order.
    pub fn list(&self) -> Result<Vec<RuleBookmark>, CoreError> {
        let conn = self.db.lock()?;
        let mut stmt = conn.prepare("SELECT id, name, uuid FROM rules ORDER BY id")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(RuleBookmark {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    uuid: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Add a bookmark, or rename the existing one with the same uuid.
    ///
    /// A renamed bookmark keeps its id, and so its position.
    pub fn upsert(&self, name: &str, uuid: &str) -> Result<RuleBookmark, CoreError> {
        let name = name.trim();
        let uuid = uuid.trim();
        if name.is_empty() || uuid.is_empty() {
            return Err(CoreError::validation("bookmark name and uuid must not be empty"));
        }

        let conn = self.db.lock()?;
        let id: i64 = conn.query_row(
            "INSERT INTO rules (name, uuid) VALUES (?1, ?2)
             ON CONFLICT(uuid) DO UPDATE SET name = excluded.name
             RETURNING id",
            params![name, uuid],
            |row| row.get(0),
        )?;
        info!(name, uuid, "saved rule bookmark");
        Ok(RuleBookmark {
            id,
            name: name.to_owned(),
            uuid: uuid.to_owned(),
        })
    }

    /// Delete the bookmark for `uuid`. The remote rule is not touched.
    ///
    /// Returns whether a bookmark existed.
    pub fn remove(&self, uuid: &str) -> Result<bool, CoreError> {
        let conn = self.db.lock()?;
        let removed = conn.execute("DELETE FROM rules WHERE uuid = ?1", params![uuid.trim()])?;
        debug!(uuid, removed, "deleted rule bookmark");
        Ok(removed > 0)
    }

    /// Upsert many bookmarks in one transaction. Returns how many were
    /// written.
    pub fn import<'a, I>(&self, entries: I) -> Result<usize, CoreError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut conn = self.db.lock()?;
        let tx = conn.transaction()?;
        let mut written = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO rules (name, uuid) VALUES (?1, ?2)
                 ON CONFLICT(uuid) DO UPDATE SET name = excluded.name",
            )?;
            for (name, uuid) in entries {
                let (name, uuid) = (name.trim(), uuid.trim());
                if name.is_empty() || uuid.is_empty() {
                    continue;
                }
                written += stmt.execute(params![name, uuid])?;
            }
        }
        tx.commit()?;
        info!(written, "imported rule bookmarks");
        Ok(written)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn store() -> BookmarkStore {
        Database::open_in_memory().unwrap().bookmarks()
    }

    fn names(store: &BookmarkStore) -> Vec<(String, String)> {
        store
            .list()
            .unwrap()
            .into_iter()
            .map(|b| (b.name, b.uuid))
            .collect()
    }

    #[test]
    fn upsert_replaces_name_for_existing_uuid() {
        let store = store();
        let first = store.upsert("WAN-block", "uuid-1").unwrap();
        store.upsert("LAN-allow", "uuid-2").unwrap();
        let renamed = store.upsert("WAN-drop", "uuid-1").unwrap();

        assert_eq!(first.id, renamed.id);
        assert_eq!(
            names(&store),
            vec![
                ("WAN-drop".to_owned(), "uuid-1".to_owned()),
                ("LAN-allow".to_owned(), "uuid-2".to_owned()),
            ]
        );
    }

    #[test]
    fn names_may_repeat() {
        let store = store();
        store.upsert("same", "uuid-1").unwrap();
        store.upsert("same", "uuid-2").unwrap();
        assert_eq!(store.list().unwrap().len(), 2);
    }

    #[test]
    fn remove_reports_existence() {
        let store = store();
        store.upsert("WAN-block", "uuid-1").unwrap();
        assert!(store.remove("uuid-1").unwrap());
        assert!(!store.remove("uuid-1").unwrap());
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn empty_fields_rejected() {
        let store = store();
        assert!(matches!(
            store.upsert("", "uuid-1"),
            Err(CoreError::ValidationError { .. })
        ));
        assert!(matches!(
            store.upsert("name", " "),
            Err(CoreError::ValidationError { .. })
        ));
    }

    #[test]
    fn import_is_an_upsert_batch() {
        let store = store();
        store.upsert("old", "uuid-1").unwrap();
        let written = store
            .import([("new", "uuid-1"), ("b", "uuid-2"), ("", "uuid-3")])
            .unwrap();

        assert_eq!(written, 2);
        assert_eq!(
            names(&store),
            vec![
                ("new".to_owned(), "uuid-1".to_owned()),
                ("b".to_owned(), "uuid-2".to_owned()),
            ]
        );
    }
}
