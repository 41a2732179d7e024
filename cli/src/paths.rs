use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};

pub const DB_FILE: &str = "flicklist.db";
pub const LOG_FILE: &str = "flicklist.log";

/// Resolve the data directory based on priority:
/// 1. Explicit path (with tilde expansion)
/// 2. FLICKLIST_PATH environment variable (with tilde expansion)
/// 3. Platform data directory
/// 4. ~/.flicklist
pub fn resolve_data_dir(explicit_path: Option<&Path>) -> Result<PathBuf> {
    resolve_with(explicit_path, std::env::var("FLICKLIST_PATH").ok(), dirs::data_dir())
}

fn resolve_with(
    explicit_path: Option<&Path>,
    env_path: Option<String>,
    data_dir: Option<PathBuf>,
) -> Result<PathBuf> {
    if let Some(path) = explicit_path {
        return Ok(expand_tilde(&path.to_string_lossy()));
    }

    if let Some(env_path) = env_path.filter(|p| !p.trim().is_empty()) {
        return Ok(expand_tilde(&env_path));
    }

    if let Some(data_dir) = data_dir {
        return Ok(data_dir.join("flicklist"));
    }

    if let Some(home) = dirs::home_dir() {
        return Ok(home.join(".flicklist"));
    }

    Err(anyhow!(
        "Could not determine data directory: no home or platform data directory found"
    ))
}

/// Expand a leading `~/` to the user's home directory
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
