use crate::Result;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

pub struct SlotRepository;

impl SlotRepository {
    /// Read a slot's value
    pub fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
        let value = conn
            .query_row(
                "SELECT value FROM kv_slots WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        Ok(value)
    }

    /// Insert or replace a slot's value
    pub fn put(conn: &Connection, key: &str, value: &str) -> Result<()> {
        conn.execute(
            "INSERT INTO kv_slots (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().timestamp()],
        )?;

        Ok(())
    }
}
