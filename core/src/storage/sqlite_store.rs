use super::{Connection, Database, FavoritesStore, SlotRepository, FAVORITES_SLOT};
use crate::Result;
use std::path::Path;

/// Favorites slot kept in the local SQLite database
pub struct SqliteStore {
    conn: Connection,
    slot: String,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `db_path`
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Database::new(db_path).open()?;
        Ok(Self::with_connection(conn))
    }

    /// Use an already initialized connection
    pub fn with_connection(conn: Connection) -> Self {
        Self {
            conn,
            slot: FAVORITES_SLOT.to_string(),
        }
    }
}

impl FavoritesStore for SqliteStore {
    fn read_raw(&self) -> Result<Option<String>> {
        SlotRepository::get(&self.conn, &self.slot)
    }

    fn write_raw(&self, raw: &str) -> Result<()> {
        SlotRepository::put(&self.conn, &self.slot, raw)
    }
}
