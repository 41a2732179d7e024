//! HTTP client for The Movie Database (TMDB) v3 API.

use super::{Catalog, CatalogConfig, CatalogError};
use crate::models::{MovieId, MovieRecord, SearchResult};
use reqwest::blocking::{Client, Request, Response};
use std::time::Duration;
use tracing::{debug, warn};

/// Catalog backed by TMDB.
///
/// Every request checks for the credential first, so a missing key fails
/// without touching the network.
pub struct TmdbCatalog {
    client: Client,
    config: CatalogConfig,
}

impl TmdbCatalog {
    pub fn new(config: CatalogConfig) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self::with_client(client, config))
    }

    /// Reuse an existing [`Client`]
    pub fn with_client(client: Client, config: CatalogConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    fn api_key(&self) -> Result<&str, CatalogError> {
        self.config
            .api_key
            .as_deref()
            .ok_or(CatalogError::MissingCredential)
    }

    /// Build `GET /search/movie` for the first page of `query`
    pub fn search_request(&self, query: &str) -> Result<Request, CatalogError> {
        let api_key = self.api_key()?;
        let query = query.trim();
        if query.is_empty() {
            return Err(CatalogError::InvalidQuery);
        }

        let request = self
            .client
            .get(format!("{}/search/movie", self.config.base_url))
            .query(&[
                ("api_key", api_key),
                ("query", query),
                ("language", self.config.language.as_str()),
                ("page", "1"),
            ])
            .build()?;
        Ok(request)
    }

    /// Build `GET /movie/{id}`
    pub fn detail_request(&self, id: MovieId) -> Result<Request, CatalogError> {
        let api_key = self.api_key()?;

        let request = self
            .client
            .get(format!("{}/movie/{}", self.config.base_url, id))
            .query(&[("api_key", api_key), ("language", self.config.language.as_str())])
            .build()?;
        Ok(request)
    }

    fn execute<T: serde::de::DeserializeOwned>(&self, request: Request) -> Result<T, CatalogError> {
        let response = self.client.execute(request)?;
        let response = Self::ensure_success(response)?;
        Ok(response.json::<T>()?)
    }

    /// Turn a non-2xx response into [`CatalogError::Api`]
    fn ensure_success(response: Response) -> Result<Response, CatalogError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            warn!(status = status.as_u16(), "Catalog returned an error status");
            return Err(CatalogError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

impl Catalog for TmdbCatalog {
    fn search(&self, query: &str) -> Result<SearchResult, CatalogError> {
        let request = self.search_request(query)?;
        debug!(query = %query.trim(), "Searching catalog");
        let result: SearchResult = self.execute(request)?;
        debug!(count = result.results.len(), total = result.total_results, "Search finished");
        Ok(result)
    }

    fn detail(&self, id: MovieId) -> Result<MovieRecord, CatalogError> {
        let request = self.detail_request(id)?;
        debug!(movie_id = id, "Fetching movie detail");
        self.execute(request)
    }
}
