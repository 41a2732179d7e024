mod paths;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use flicklist_core::catalog::{Catalog, CatalogConfig, TmdbCatalog};
use flicklist_core::storage::SqliteStore;
use flicklist_core::FavoritesManager;
use flicklist_tui::{App, EventHandler};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "flicklist", version, about = "Discover and save your favorite movies")]
struct Cli {
    /// Directory holding the database, config and log file
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Search the catalog and print the first page of results
    Search {
        #[arg(required = true)]
        query: Vec<String>,
    },
    /// Print the saved favorites
    Favorites,
    /// Write the favorites document to a file
    Export { path: PathBuf },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let data_dir = paths::resolve_data_dir(cli.data_dir.as_deref())?;
    fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;
    init_tracing(&data_dir)?;

    let catalog_config = CatalogConfig::from_env();
    tracing::info!(data_dir = %data_dir.display(), catalog = ?catalog_config, "Starting flicklist");
    if !catalog_config.has_credential() {
        tracing::warn!("TMDB_API_KEY is not set, catalog requests will fail");
    }

    let db_path = data_dir.join(paths::DB_FILE);
    match cli.command {
        None => run_tui(&db_path, catalog_config),
        Some(Command::Search { query }) => search(catalog_config, &query.join(" ")),
        Some(Command::Favorites) => list_favorites(&db_path),
        Some(Command::Export { path }) => export(&db_path, &path),
    }
}

/// Log to a file in the data directory; the TUI owns the terminal
fn init_tracing(data_dir: &Path) -> Result<()> {
    let log_path = data_dir.join(paths::LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flicklist_core=info,flicklist_tui=info,flicklist=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .init();
    Ok(())
}

fn run_tui(db_path: &Path, catalog_config: CatalogConfig) -> Result<()> {
    let catalog: Arc<dyn Catalog> = Arc::new(TmdbCatalog::new(catalog_config)?);
    let mut app = App::new(db_path, catalog)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create event handler
    let event_handler = EventHandler::new(100);

    // Main loop
    let result = run_app(&mut terminal, &mut app, &event_handler);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        tracing::error!(error = %err, "TUI exited with an error");
    }
    result
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    event_handler: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|f| flicklist_tui::ui::render(f, app))?;

        match event_handler.next()? {
            flicklist_tui::Event::Key(key) => {
                flicklist_tui::event::handle_key_event(key, app);
            }
            flicklist_tui::Event::Tick => {}
        }
        app.tick();

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn search(catalog_config: CatalogConfig, query: &str) -> Result<()> {
    let catalog = TmdbCatalog::new(catalog_config)?;
    let page = match catalog.search(query) {
        Ok(page) => page,
        Err(err) if err.is_configuration() => bail!("{} (set TMDB_API_KEY)", err.user_message()),
        Err(err) => return Err(err).context("Search failed"),
    };

    if page.is_empty() {
        println!("No movies found. Try a different search term.");
        return Ok(());
    }

    for movie in &page.results {
        println!("{:>8}  {} ({})  ⭐ {:.1}", movie.id, movie.title, movie.year_label(), movie.vote_average);
    }
    println!(
        "\npage {} of {} ({} results)",
        page.page, page.total_pages, page.total_results
    );
    Ok(())
}

fn list_favorites(db_path: &Path) -> Result<()> {
    let manager = FavoritesManager::open(SqliteStore::open(db_path)?);
    if manager.is_empty() {
        println!("No favorites yet.");
        return Ok(());
    }

    for favorite in manager.favorites() {
        let rating = favorite
            .user_rating
            .map(|r| r.to_string())
            .unwrap_or_default();
        println!("{:>8}  {} ({})  {}", favorite.id(), favorite.movie.title, favorite.movie.year_label(), rating);
        if let Some(note) = favorite.user_note.as_deref().filter(|n| !n.is_empty()) {
            println!("          {}", note);
        }
    }
    Ok(())
}

fn export(db_path: &Path, out: &Path) -> Result<()> {
    let manager = FavoritesManager::open(SqliteStore::open(db_path)?);
    let document = manager.export()?;
    fs::write(out, document).with_context(|| format!("Failed to write {}", out.display()))?;
    println!("Exported {} favorites to {}", manager.len(), out.display());
    Ok(())
}
