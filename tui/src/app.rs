use crate::config::{load_config, Config};
use anyhow::Result;
use flicklist_core::catalog::{Catalog, CatalogDispatcher, CatalogErrorKind, CatalogReply};
use flicklist_core::models::{FavoriteEntry, FavoriteUpdate, FieldUpdate, MovieRecord, Rating};
use flicklist_core::storage::SqliteStore;
use flicklist_core::FavoritesManager;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Web page for a movie on the catalog site
pub const MOVIE_PAGE_BASE_URL: &str = "https://www.themoviedb.org/movie";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Search,
    Favorites,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Typing into the search box
    Searching,
    /// Typing the note of the movie in the detail overlay
    EditingNote,
}

/// What the search tab is currently showing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchStatus {
    /// Nothing searched yet
    Idle,
    Loading,
    Results,
    /// Valid response with zero matches
    NoResults,
    /// Transient remote failure; the user has to search again
    Failed(String),
    /// Credential missing; searching again will not help
    Misconfigured(String),
}

/// Application state
pub struct App {
    pub should_quit: bool,
    pub config: Config,
    pub favorites: FavoritesManager,
    pub dispatcher: CatalogDispatcher,
    pub active_tab: Tab,
    pub input_mode: InputMode,
    // Search tab
    pub search_query: String,
    pub last_query: Option<String>,
    pub search_results: Vec<MovieRecord>,
    pub search_status: SearchStatus,
    pub results_selected_index: usize,
    // Favorites tab
    pub favorites_selected_index: usize,
    // Detail overlay
    pub selected_movie: Option<MovieRecord>,
    pub note_buffer: String,
    pub help_open: bool,
    pub status_message: Option<String>,
    favorites_changed: Arc<AtomicBool>,
}

impl App {
    /// Create an app backed by the database at `db_path`, reading
    /// `config.toml` from the same directory
    pub fn new<P: AsRef<Path>>(db_path: P, catalog: Arc<dyn Catalog>) -> Result<Self> {
        let db_path = db_path.as_ref();
        let store = SqliteStore::open(db_path)?;
        let config_path = db_path
            .parent()
            .map(|p| p.join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"));
        let config = load_config(&config_path);

        Ok(Self::with_parts(FavoritesManager::open(store), catalog, config))
    }

    /// Assemble an app from already constructed parts
    pub fn with_parts(mut favorites: FavoritesManager, catalog: Arc<dyn Catalog>, config: Config) -> Self {
        let favorites_changed = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&favorites_changed);
        favorites.subscribe(move |_| flag.store(true, Ordering::Relaxed));

        Self {
            should_quit: false,
            config,
            favorites,
            dispatcher: CatalogDispatcher::new(catalog),
            active_tab: Tab::Search,
            input_mode: InputMode::Normal,
            search_query: String::new(),
            last_query: None,
            search_results: Vec::new(),
            search_status: SearchStatus::Idle,
            results_selected_index: 0,
            favorites_selected_index: 0,
            selected_movie: None,
            note_buffer: String::new(),
            help_open: false,
            status_message: None,
            favorites_changed,
        }
    }

    /// Apply finished catalog requests and react to favorites changes
    pub fn tick(&mut self) {
        for reply in self.dispatcher.poll() {
            self.apply_reply(reply);
        }

        if self.favorites_changed.swap(false, Ordering::Relaxed) {
            self.clamp_favorites_selection();
        }
    }

    /// Quit the application
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    // =========================
    // Tabs & selection
    // =========================

    pub fn switch_tab(&mut self) {
        self.active_tab = match self.active_tab {
            Tab::Search => Tab::Favorites,
            Tab::Favorites => Tab::Search,
        };
        self.status_message = None;
    }

    pub fn select_up(&mut self) {
        let index = self.selected_index_mut();
        *index = index.saturating_sub(1);
    }

    pub fn select_down(&mut self) {
        let len = self.visible_len();
        let index = self.selected_index_mut();
        if *index + 1 < len {
            *index += 1;
        }
    }

    fn selected_index_mut(&mut self) -> &mut usize {
        match self.active_tab {
            Tab::Search => &mut self.results_selected_index,
            Tab::Favorites => &mut self.favorites_selected_index,
        }
    }

    fn visible_len(&self) -> usize {
        match self.active_tab {
            Tab::Search => self.search_results.len(),
            Tab::Favorites => self.favorites.len(),
        }
    }

    /// Record highlighted in the active tab's list
    pub fn highlighted_movie(&self) -> Option<&MovieRecord> {
        match self.active_tab {
            Tab::Search => self.search_results.get(self.results_selected_index),
            Tab::Favorites => self
                .favorites
                .favorites()
                .get(self.favorites_selected_index)
                .map(|f| &f.movie),
        }
    }

    fn clamp_favorites_selection(&mut self) {
        let len = self.favorites.len();
        if self.favorites_selected_index >= len {
            self.favorites_selected_index = len.saturating_sub(1);
        }
    }

    // =========================
    // Search
    // =========================

    pub fn open_search(&mut self) {
        self.active_tab = Tab::Search;
        self.input_mode = InputMode::Searching;
    }

    pub fn close_search(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn update_search_query(&mut self, c: char) {
        self.search_query.push(c);
    }

    pub fn backspace_search_query(&mut self) {
        self.search_query.pop();
    }

    /// Dispatch the typed query; a newer search supersedes one in flight
    pub fn submit_search(&mut self) {
        let query = self.search_query.trim().to_string();
        self.input_mode = InputMode::Normal;
        if query.is_empty() {
            self.status_message = Some("Type a movie title to search.".to_string());
            return;
        }

        self.dispatcher.search(query.clone());
        self.last_query = Some(query);
        self.search_status = SearchStatus::Loading;
        self.status_message = None;
    }

    pub fn is_loading(&self) -> bool {
        self.search_status == SearchStatus::Loading
    }

    fn apply_reply(&mut self, reply: CatalogReply) {
        match reply {
            CatalogReply::Search { query, result, .. } => match result {
                Ok(page) if page.is_empty() => {
                    debug!(query = %query, "No results");
                    self.search_results.clear();
                    self.search_status = SearchStatus::NoResults;
                }
                Ok(page) => {
                    self.search_results = page.results;
                    self.results_selected_index = 0;
                    self.search_status = SearchStatus::Results;
                }
                Err(err) => {
                    warn!(query = %query, error = %err, "Search failed");
                    self.search_results.clear();
                    self.search_status = match err.kind() {
                        CatalogErrorKind::Configuration => {
                            SearchStatus::Misconfigured(err.user_message().to_string())
                        }
                        _ => SearchStatus::Failed(err.user_message().to_string()),
                    };
                }
            },
            CatalogReply::Detail { requested, result, .. } => {
                let still_open = self
                    .selected_movie
                    .as_ref()
                    .is_some_and(|m| m.id == requested.id);
                if !still_open {
                    return;
                }
                match result {
                    Ok(detailed) => self.selected_movie = Some(detailed),
                    // keep showing the list record
                    Err(err) => warn!(movie_id = requested.id, error = %err, "Detail fetch failed"),
                }
            }
        }
    }

    // =========================
    // Detail overlay
    // =========================

    /// Open the detail overlay for the highlighted movie and fetch its
    /// full record
    pub fn open_detail(&mut self) {
        let Some(movie) = self.highlighted_movie().cloned() else {
            return;
        };

        self.note_buffer = self
            .favorites
            .get_favorite(movie.id)
            .and_then(|f| f.user_note.clone())
            .unwrap_or_default();
        self.selected_movie = Some(movie.clone());
        self.dispatcher.detail(movie);
    }

    pub fn close_detail(&mut self) {
        self.selected_movie = None;
        self.input_mode = InputMode::Normal;
        self.note_buffer.clear();
    }

    pub fn is_detail_open(&self) -> bool {
        self.selected_movie.is_some()
    }

    pub fn is_detail_loading(&self) -> bool {
        self.is_detail_open() && self.dispatcher.is_detail_pending()
    }

    /// Favorite entry behind the detail overlay, if it is a favorite
    pub fn selected_favorite(&self) -> Option<&FavoriteEntry> {
        self.selected_movie
            .as_ref()
            .and_then(|m| self.favorites.get_favorite(m.id))
    }

    /// Movie the favorite actions apply to: the overlay's, else the
    /// highlighted one
    fn target_movie(&self) -> Option<MovieRecord> {
        self.selected_movie
            .clone()
            .or_else(|| self.highlighted_movie().cloned())
    }

    pub fn toggle_favorite(&mut self) {
        let Some(movie) = self.target_movie() else {
            return;
        };
        let title = movie.title.clone();

        let now_favorite = self.favorites.toggle_favorite(movie);
        self.status_message = Some(if now_favorite {
            format!("★ Added \"{}\" to favorites", title)
        } else {
            format!("Removed \"{}\" from favorites", title)
        });
        if !now_favorite && self.input_mode == InputMode::EditingNote {
            self.input_mode = InputMode::Normal;
        }
    }

    /// Set the rating (1-5) of the selected favorite; 0 clears it
    pub fn rate_selected(&mut self, stars: u8) {
        let Some(id) = self.selected_favorite().map(|f| f.id()) else {
            self.status_message = Some("Add the movie to favorites to rate it.".to_string());
            return;
        };

        let update = if stars == 0 {
            FavoriteUpdate::clear_rating()
        } else {
            match Rating::new(stars) {
                Ok(rating) => FavoriteUpdate::rating(rating),
                Err(err) => {
                    self.status_message = Some(err.to_string());
                    return;
                }
            }
        };
        self.favorites.update_favorite(id, &update);
    }

    pub fn start_note_edit(&mut self) {
        match self.selected_favorite() {
            Some(favorite) => {
                self.note_buffer = favorite.user_note.clone().unwrap_or_default();
                self.input_mode = InputMode::EditingNote;
            }
            None => {
                self.status_message = Some("Add the movie to favorites to write a note.".to_string());
            }
        }
    }

    pub fn update_note(&mut self, c: char) {
        self.note_buffer.push(c);
    }

    pub fn backspace_note(&mut self) {
        self.note_buffer.pop();
    }

    /// Save the buffer as the note; an empty buffer stores an empty note
    pub fn save_note(&mut self) {
        self.input_mode = InputMode::Normal;
        let Some(id) = self.selected_favorite().map(|f| f.id()) else {
            return;
        };
        let update = FavoriteUpdate {
            user_note: FieldUpdate::Set(self.note_buffer.clone()),
            ..FavoriteUpdate::default()
        };
        self.favorites.update_favorite(id, &update);
    }

    pub fn cancel_note_edit(&mut self) {
        self.input_mode = InputMode::Normal;
        self.note_buffer = self
            .selected_favorite()
            .and_then(|f| f.user_note.clone())
            .unwrap_or_default();
    }

    pub fn clear_note(&mut self) {
        let Some(id) = self.selected_favorite().map(|f| f.id()) else {
            return;
        };
        self.favorites.update_favorite(id, &FavoriteUpdate::clear_note());
        self.note_buffer.clear();
    }

    /// Open the movie's catalog page in the default browser
    pub fn open_in_browser(&mut self) {
        let Some(movie) = self.target_movie() else {
            return;
        };
        let url = format!("{}/{}", MOVIE_PAGE_BASE_URL, movie.id);
        if let Err(err) = opener::open(&url) {
            warn!(url = %url, error = %err, "Failed to open browser");
            self.status_message = Some(format!("Could not open {}", url));
        }
    }

    // =========================
    // Help
    // =========================

    pub fn open_help(&mut self) {
        self.help_open = true;
    }

    pub fn close_help(&mut self) {
        self.help_open = false;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use flicklist_core::catalog::CatalogError;
    use flicklist_core::models::{MovieId, SearchResult};
    use flicklist_core::storage::MemoryStore;
    use std::time::{Duration, Instant};

    pub(crate) struct FakeCatalog {
        pub configured: bool,
        pub fail_details: bool,
    }

    impl Default for FakeCatalog {
        fn default() -> Self {
            Self {
                configured: true,
                fail_details: false,
            }
        }
    }

    impl Catalog for FakeCatalog {
        fn search(&self, query: &str) -> std::result::Result<SearchResult, CatalogError> {
            if !self.configured {
                return Err(CatalogError::MissingCredential);
            }
            if query == "offline" {
                return Err(CatalogError::Api {
                    status: 503,
                    body: "unavailable".to_string(),
                });
            }
            let results = if query == "matrix" {
                vec![
                    MovieRecord::new(603, "The Matrix"),
                    MovieRecord::new(604, "The Matrix Reloaded"),
                ]
            } else {
                Vec::new()
            };
            Ok(SearchResult {
                page: 1,
                total_pages: if results.is_empty() { 0 } else { 1 },
                total_results: results.len() as u32,
                results,
            })
        }

        fn detail(&self, id: MovieId) -> std::result::Result<MovieRecord, CatalogError> {
            if self.fail_details {
                return Err(CatalogError::Api {
                    status: 500,
                    body: String::new(),
                });
            }
            let mut record = MovieRecord::new(id, "The Matrix");
            record.runtime_minutes = Some(136);
            Ok(record)
        }
    }

    pub(crate) fn test_app(catalog: FakeCatalog) -> (MemoryStore, App) {
        let store = MemoryStore::new();
        let manager = FavoritesManager::open(store.clone());
        let app = App::with_parts(manager, Arc::new(catalog), Config::default());
        (store, app)
    }

    /// Tick until `done` holds or a few seconds pass
    pub(crate) fn tick_until(app: &mut App, done: impl Fn(&App) -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !done(app) && Instant::now() < deadline {
            app.tick();
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(done(app), "condition not reached in time");
    }

    fn search(app: &mut App, query: &str) {
        app.open_search();
        for c in query.chars() {
            app.update_search_query(c);
        }
        app.submit_search();
        tick_until(app, |a| !a.is_loading());
    }

    #[test]
    fn test_search_populates_results() {
        let (_store, mut app) = test_app(FakeCatalog::default());
        search(&mut app, "matrix");

        assert_eq!(app.search_status, SearchStatus::Results);
        assert_eq!(app.search_results.len(), 2);
        assert_eq!(app.last_query.as_deref(), Some("matrix"));
    }

    #[test]
    fn test_no_results_is_not_an_error() {
        let (_store, mut app) = test_app(FakeCatalog::default());
        search(&mut app, "zzzz");

        assert_eq!(app.search_status, SearchStatus::NoResults);
    }

    #[test]
    fn test_remote_and_configuration_errors_are_distinct() {
        let (_store, mut app) = test_app(FakeCatalog::default());
        search(&mut app, "offline");
        assert!(matches!(app.search_status, SearchStatus::Failed(_)));

        let (_store, mut app) = test_app(FakeCatalog {
            configured: false,
            ..FakeCatalog::default()
        });
        search(&mut app, "matrix");
        assert_eq!(
            app.search_status,
            SearchStatus::Misconfigured("API key not configured".to_string())
        );
    }

    #[test]
    fn test_blank_query_not_dispatched() {
        let (_store, mut app) = test_app(FakeCatalog::default());
        app.open_search();
        app.update_search_query(' ');
        app.submit_search();

        assert_eq!(app.search_status, SearchStatus::Idle);
        assert!(app.status_message.is_some());
    }

    #[test]
    fn test_detail_fetch_enriches_selection() {
        let (_store, mut app) = test_app(FakeCatalog::default());
        search(&mut app, "matrix");

        app.open_detail();
        tick_until(&mut app, |a| !a.is_detail_loading());

        assert_eq!(app.selected_movie.as_ref().unwrap().runtime_minutes, Some(136));
    }

    #[test]
    fn test_failed_detail_keeps_list_record() {
        let (_store, mut app) = test_app(FakeCatalog {
            fail_details: true,
            ..FakeCatalog::default()
        });
        search(&mut app, "matrix");

        app.open_detail();
        tick_until(&mut app, |a| !a.is_detail_loading());

        let selected = app.selected_movie.as_ref().unwrap();
        assert_eq!(selected.id, 603);
        assert_eq!(selected.runtime_minutes, None);
    }

    #[test]
    fn test_detail_reply_for_other_movie_is_ignored() {
        let (_store, mut app) = test_app(FakeCatalog::default());
        search(&mut app, "matrix");

        let late_reply = || {
            let mut detailed = MovieRecord::new(603, "The Matrix (late)");
            detailed.runtime_minutes = Some(999);
            CatalogReply::Detail {
                seq: 1,
                requested: MovieRecord::new(603, "The Matrix"),
                result: Ok(detailed),
            }
        };

        app.open_detail();
        tick_until(&mut app, |a| !a.is_detail_loading());
        app.close_detail();
        app.apply_reply(late_reply());
        assert!(app.selected_movie.is_none());

        app.select_down();
        app.open_detail();
        tick_until(&mut app, |a| !a.is_detail_loading());
        let before = app.selected_movie.clone();
        assert_eq!(before.as_ref().map(|m| m.id), Some(604));

        app.apply_reply(late_reply());
        assert_eq!(app.selected_movie, before);
    }

    #[test]
    fn test_favorite_rate_and_note_persist() {
        let (store, mut app) = test_app(FakeCatalog::default());
        search(&mut app, "matrix");
        app.open_detail();
        tick_until(&mut app, |a| !a.is_detail_loading());

        app.toggle_favorite();
        app.rate_selected(5);
        app.start_note_edit();
        assert_eq!(app.input_mode, InputMode::EditingNote);
        for c in "rewatch".chars() {
            app.update_note(c);
        }
        app.save_note();

        let reloaded = FavoritesManager::open(store);
        let entry = reloaded.get_favorite(603).unwrap();
        assert_eq!(entry.user_rating, Some(Rating::new(5).unwrap()));
        assert_eq!(entry.user_note.as_deref(), Some("rewatch"));
        assert_eq!(entry.movie.runtime_minutes, Some(136));
    }

    #[test]
    fn test_rating_requires_favorite() {
        let (store, mut app) = test_app(FakeCatalog::default());
        search(&mut app, "matrix");
        app.open_detail();

        app.rate_selected(3);
        assert!(app.status_message.is_some());
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn test_clear_rating_and_note() {
        let (_store, mut app) = test_app(FakeCatalog::default());
        search(&mut app, "matrix");
        app.open_detail();
        app.toggle_favorite();
        app.rate_selected(4);
        app.start_note_edit();
        app.update_note('x');
        app.save_note();

        app.rate_selected(0);
        app.clear_note();

        let entry = app.selected_favorite().unwrap();
        assert_eq!(entry.user_rating, None);
        assert_eq!(entry.user_note, None);
    }

    #[test]
    fn test_removing_last_favorite_clamps_selection() {
        let (_store, mut app) = test_app(FakeCatalog::default());
        search(&mut app, "matrix");
        app.toggle_favorite();
        app.select_down();
        app.toggle_favorite();

        app.switch_tab();
        app.select_down();
        assert_eq!(app.favorites_selected_index, 1);

        app.toggle_favorite();
        app.tick();
        assert_eq!(app.favorites_selected_index, 0);
        assert_eq!(app.favorites.len(), 1);
    }
}
