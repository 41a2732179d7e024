mod codec;
mod database;
mod memory_store;
mod slot_repository;
mod sqlite_store;

pub use codec::{decode, encode, FORMAT_VERSION};
pub use database::{Connection, Database};
pub use memory_store::MemoryStore;
pub use slot_repository::SlotRepository;
pub use sqlite_store::SqliteStore;

use crate::Result;

/// Slot name under which the favorites document is kept
pub const FAVORITES_SLOT: &str = "movie-favorites";

/// A single durable slot holding one serialized favorites document.
///
/// Both operations may fail (store unavailable, disabled, full). There are no
/// partial updates: every write replaces the whole blob.
pub trait FavoritesStore {
    /// Read the raw blob, `None` when nothing was ever written
    fn read_raw(&self) -> Result<Option<String>>;

    /// Replace the raw blob
    fn write_raw(&self, raw: &str) -> Result<()>;
}
