//! Favorites state manager.
//!
//! Owns the in-memory favorites collection and mirrors it to a
//! [`FavoritesStore`] after every mutation that changes it. Store failures
//! are logged and absorbed: the in-memory collection is the source of truth
//! for the running session.
//!
//! Until [`FavoritesManager::initialize`] has run the collection is
//! provisional and is never written back, so an empty provisional state
//! cannot clobber persisted data that has not been loaded yet.

use crate::models::{FavoriteEntry, FavoriteUpdate, MovieId, MovieRecord};
use crate::storage::{self, FavoritesStore};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Handle returned by [`FavoritesManager::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&[FavoriteEntry]) + Send>;

pub struct FavoritesManager {
    store: Box<dyn FavoritesStore + Send>,
    favorites: Vec<FavoriteEntry>,
    ready: bool,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl FavoritesManager {
    /// Create a provisional manager; call [`initialize`](Self::initialize)
    /// before relying on its contents.
    pub fn new<S>(store: S) -> Self
    where
        S: FavoritesStore + Send + 'static,
    {
        Self {
            store: Box::new(store),
            favorites: Vec::new(),
            ready: false,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Create a manager and load it from the store
    pub fn open<S>(store: S) -> Self
    where
        S: FavoritesStore + Send + 'static,
    {
        let mut manager = Self::new(store);
        manager.initialize();
        manager
    }

    /// Load the persisted collection and mark the manager ready.
    ///
    /// Missing or corrupt data yields an empty collection. Entries added
    /// while provisional are kept after the persisted ones unless their id
    /// was already persisted. Calling this again is a no-op.
    pub fn initialize(&mut self) {
        if self.ready {
            return;
        }

        let mut favorites = self.load_persisted();
        let provisional = std::mem::take(&mut self.favorites);
        let mut appended = 0;
        for entry in provisional {
            if !favorites.iter().any(|f| f.id() == entry.id()) {
                favorites.push(entry);
                appended += 1;
            }
        }

        self.favorites = favorites;
        self.ready = true;
        info!(count = self.favorites.len(), "Favorites loaded");

        if appended > 0 {
            debug!(count = appended, "Keeping favorites added before load");
            self.persist();
        }
        self.notify();
    }

    fn load_persisted(&self) -> Vec<FavoriteEntry> {
        let raw = match self.store.read_raw() {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No stored favorites, starting empty");
                return Vec::new();
            }
            Err(err) => {
                warn!(error = %err, "Failed to read stored favorites, starting empty");
                return Vec::new();
            }
        };

        match storage::decode(&raw) {
            Ok(entries) => dedup_by_id(entries),
            Err(err) => {
                warn!(error = %err, "Stored favorites are unreadable, starting empty");
                Vec::new()
            }
        }
    }

    /// Whether the persisted collection has been loaded
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Current snapshot, in insertion order
    pub fn favorites(&self) -> &[FavoriteEntry] {
        &self.favorites
    }

    pub fn len(&self) -> usize {
        self.favorites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.favorites.is_empty()
    }

    pub fn is_favorite(&self, id: MovieId) -> bool {
        self.position(id).is_some()
    }

    pub fn get_favorite(&self, id: MovieId) -> Option<&FavoriteEntry> {
        self.favorites.iter().find(|f| f.id() == id)
    }

    /// Append `record` as a new favorite. An existing entry with the same id
    /// is left untouched, annotations included. Returns whether it was added.
    pub fn add_favorite(&mut self, record: MovieRecord) -> bool {
        if self.is_favorite(record.id) {
            debug!(movie_id = record.id, "Already a favorite");
            return false;
        }

        debug!(movie_id = record.id, title = %record.title, "Adding favorite");
        self.favorites.push(FavoriteEntry::new(record));
        self.commit();
        true
    }

    /// Remove the favorite with `id`; returns whether one was removed
    pub fn remove_favorite(&mut self, id: MovieId) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };

        debug!(movie_id = id, "Removing favorite");
        self.favorites.remove(index);
        self.commit();
        true
    }

    /// Merge `update` into the favorite with `id`. Absent ids are ignored;
    /// nothing is created. Returns whether the entry changed.
    pub fn update_favorite(&mut self, id: MovieId, update: &FavoriteUpdate) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };

        if !self.favorites[index].apply(update) {
            return false;
        }

        debug!(movie_id = id, "Updated favorite");
        self.commit();
        true
    }

    /// Remove `record` if it is a favorite, add it otherwise. Returns whether
    /// it is a favorite afterwards.
    pub fn toggle_favorite(&mut self, record: MovieRecord) -> bool {
        if self.remove_favorite(record.id) {
            false
        } else {
            self.add_favorite(record)
        }
    }

    /// Register a callback run with the new snapshot after every change
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&[FavoriteEntry]) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns whether the subscription existed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    /// Serialized form of the current snapshot
    pub fn export(&self) -> crate::Result<String> {
        storage::encode(&self.favorites)
    }

    fn position(&self, id: MovieId) -> Option<usize> {
        self.favorites.iter().position(|f| f.id() == id)
    }

    fn commit(&mut self) {
        self.persist();
        self.notify();
    }

    fn persist(&self) {
        if !self.ready {
            return;
        }

        let raw = match storage::encode(&self.favorites) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(error = %err, "Failed to serialize favorites");
                return;
            }
        };

        if let Err(err) = self.store.write_raw(&raw) {
            warn!(error = %err, "Failed to save favorites, keeping in-memory state");
        }
    }

    fn notify(&mut self) {
        let snapshot = self.favorites.as_slice();
        for (_, listener) in self.listeners.iter_mut() {
            listener(snapshot);
        }
    }
}

fn dedup_by_id(entries: Vec<FavoriteEntry>) -> Vec<FavoriteEntry> {
    let mut seen = HashSet::new();
    let total = entries.len();
    let unique: Vec<_> = entries.into_iter().filter(|e| seen.insert(e.id())).collect();
    if unique.len() != total {
        warn!(dropped = total - unique.len(), "Dropped duplicate stored favorites");
    }
    unique
}
