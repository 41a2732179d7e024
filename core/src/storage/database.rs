use crate::Result;
use rusqlite::Connection as SqliteConnection;
use std::path::{Path, PathBuf};

pub type Connection = SqliteConnection;

const SCHEMA: &str = include_str!("../../schema.sql");

/// The SQLite file holding flicklist's named slots
pub struct Database {
    db_path: PathBuf,
}

impl Database {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
        }
    }

    /// Open the slot database, creating the file and its directory on first
    /// use. Tables are created when missing, so every open leaves the file
    /// ready for slot reads and writes.
    pub fn open(&self) -> Result<Connection> {
        if let Some(parent) = self.db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = SqliteConnection::open(&self.db_path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn has_slot_table(conn: &Connection) -> bool {
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'kv_slots'",
            [],
            |row| row.get::<_, i64>(0),
        )
        .unwrap()
            == 1
    }

    #[test]
    fn test_open_creates_file_with_slot_table() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        assert!(!db_path.exists());

        let conn = Database::new(&db_path).open().unwrap();
        assert!(db_path.exists());
        assert!(has_slot_table(&conn));
    }

    #[test]
    fn test_open_makes_parent_directories() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("data").join("test.db");

        Database::new(&db_path).open().unwrap();
        assert!(db_path.exists());
    }

    #[test]
    fn test_reopen_keeps_rows() {
        let dir = tempdir().unwrap();
        let db = Database::new(dir.path().join("test.db"));

        let conn = db.open().unwrap();
        conn.execute(
            "INSERT INTO kv_slots (key, value, updated_at) VALUES ('k', 'v', 0)",
            [],
        )
        .unwrap();
        drop(conn);

        let conn = db.open().unwrap();
        let value: String = conn
            .query_row("SELECT value FROM kv_slots WHERE key = 'k'", [], |row| row.get(0))
            .unwrap();
        assert_eq!(value, "v");
    }
}
