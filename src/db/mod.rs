//! SQLite store for processed meetings.
//!
//! The database lives at `~/.meetminder/meetminder.db` unless the config
//! names another path. Each row keeps the raw transcript next to the
//! canonical extracted record; lifecycle edits rewrite the record in place.

use std::path::PathBuf;

use rusqlite::Connection;

use crate::config::Config;

pub mod meetings;
pub mod types;
pub use types::*;

pub struct MeetingDb {
    conn: Connection,
}

impl MeetingDb {
    /// Borrow the underlying connection for ad-hoc queries.
    pub fn conn_ref(&self) -> &Connection {
        &self.conn
    }

    /// Execute a closure within a SQLite transaction.
    /// Commits on Ok, rolls back on Err.
    ///
    /// `BEGIN IMMEDIATE` takes the write lock up front, so two processes
    /// editing the same meeting serialise instead of losing an update.
    pub fn with_transaction<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Self) -> Result<T, E>,
        E: From<DbError>,
    {
        self.conn
            .execute_batch("BEGIN IMMEDIATE")
            .map_err(DbError::from)?;
        match f(self) {
            Ok(val) => {
                self.conn.execute_batch("COMMIT").map_err(DbError::from)?;
                Ok(val)
            }
            Err(e) => {
                let _ = self.conn.execute_batch("ROLLBACK");
                Err(e)
            }
        }
    }

    /// Open (or create) the database named by `config` and apply the schema.
    pub fn open(config: &Config) -> Result<Self, DbError> {
        let path = config
            .resolved_db_path()
            .map_err(|_| DbError::HomeDirNotFound)?;
        Self::open_at(path)
    }

    /// Open a database at an explicit path.
    pub fn open_at(path: PathBuf) -> Result<Self, DbError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(DbError::CreateDir)?;
            }
        }

        let conn = Connection::open(&path)?;

        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;

        crate::migrations::run_migrations(&conn).map_err(DbError::Migration)?;

        log::debug!("Opened meeting database at {}", path.display());
        Ok(Self { conn })
    }
}


#[cfg(test)]
mod tests {
    use super::test_utils::test_db;
    use super::*;

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("m.db");
        MeetingDb::open_at(path.clone()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_reopen_keeps_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.db");
        MeetingDb::open_at(path.clone()).unwrap();
        let db = MeetingDb::open_at(path).unwrap();
        let version: i32 = db
            .conn_ref()
            .query_row("SELECT MAX(version) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(version, 2);
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let db = test_db();
        let result: Result<(), DbError> = db.with_transaction(|db| {
            db.conn_ref().execute(
                "INSERT INTO meetings (title, transcript, extracted_json, created_at, updated_at)
                 VALUES ('t', 'x', '{}', 'a', 'a')",
                [],
            )?;
            Err(DbError::NotFound(7))
        });
        assert!(matches!(result, Err(DbError::NotFound(7))));

        let count: i64 = db
            .conn_ref()
            .query_row("SELECT COUNT(*) FROM meetings", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_transaction_commits_on_ok() {
        let db = test_db();
        let id: i64 = db
            .with_transaction(|db| -> Result<i64, DbError> {
                db.conn_ref().execute(
                    "INSERT INTO meetings (title, transcript, extracted_json, created_at, updated_at)
                     VALUES ('t', 'x', '{}', 'a', 'a')",
                    [],
                )?;
                Ok(db.conn_ref().last_insert_rowid())
            })
            .unwrap();
        assert!(id > 0);
    }
}
