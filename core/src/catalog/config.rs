use std::fmt;
use tracing::warn;

pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_LANGUAGE: &str = "en-US";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Catalog access settings.
///
/// The credential is optional here on purpose: its absence is reported per
/// request as a configuration error rather than at startup.
#[derive(Clone)]
pub struct CatalogConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub language: String,
    pub timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl CatalogConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var             | Default                        |
    /// |---------------------|--------------------------------|
    /// | `TMDB_API_KEY`      | unset                          |
    /// | `TMDB_BASE_URL`     | `https://api.themoviedb.org/3` |
    /// | `TMDB_LANGUAGE`     | `en-US`                        |
    /// | `TMDB_TIMEOUT_SECS` | `10`                           |
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let timeout_secs = match non_empty("TMDB_TIMEOUT_SECS") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(value = %raw, "TMDB_TIMEOUT_SECS is not a number, using default");
                DEFAULT_TIMEOUT_SECS
            }),
            None => DEFAULT_TIMEOUT_SECS,
        };

        Self {
            api_key: non_empty("TMDB_API_KEY"),
            base_url: non_empty("TMDB_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            language: non_empty("TMDB_LANGUAGE").unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            timeout_secs,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}

impl fmt::Debug for CatalogConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("language", &self.language)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
