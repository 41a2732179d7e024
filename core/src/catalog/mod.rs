//! Gateway to the external movie catalog.
//!
//! [`Catalog`] is the request/response contract; [`TmdbCatalog`] implements
//! it over HTTP, and [`CatalogDispatcher`] runs requests off the caller's
//! thread while discarding replies that a newer request has superseded.

mod config;
mod dispatch;
mod tmdb;

pub use config::CatalogConfig;
pub use dispatch::{CatalogDispatcher, CatalogReply, RequestSequencer};
pub use tmdb::TmdbCatalog;

use crate::models::{MovieId, MovieRecord, SearchResult};

/// Stateless movie catalog
pub trait Catalog: Send + Sync {
    /// Free-text search, first page only
    fn search(&self, query: &str) -> Result<SearchResult, CatalogError>;

    /// Full record for `id`, including runtime
    fn detail(&self, id: MovieId) -> Result<MovieRecord, CatalogError>;
}

/// Broad class of a catalog failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogErrorKind {
    /// Required credential missing; never retried
    Configuration,
    /// Caller sent an unusable request
    InvalidRequest,
    /// Catalog unreachable or answered with a failure
    Remote,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// No access credential configured
    #[error("API key not configured")]
    MissingCredential,

    /// Blank search query
    #[error("Missing query parameter")]
    InvalidQuery,

    /// The HTTP request itself failed (network, DNS, TLS, decoding)
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The catalog returned a non-2xx status code
    #[error("Catalog API error ({status}): {body}")]
    Api { status: u16, body: String },
}

impl CatalogError {
    pub fn kind(&self) -> CatalogErrorKind {
        match self {
            CatalogError::MissingCredential => CatalogErrorKind::Configuration,
            CatalogError::InvalidQuery => CatalogErrorKind::InvalidRequest,
            CatalogError::Request(_) | CatalogError::Api { .. } => CatalogErrorKind::Remote,
        }
    }

    pub fn is_configuration(&self) -> bool {
        self.kind() == CatalogErrorKind::Configuration
    }

    /// HTTP-analogous status for this failure
    pub fn status_code(&self) -> u16 {
        match self {
            CatalogError::MissingCredential => 500,
            CatalogError::InvalidQuery => 400,
            CatalogError::Request(_) => 502,
            CatalogError::Api { status, .. } => *status,
        }
    }

    /// Message suitable for showing to the user
    pub fn user_message(&self) -> &'static str {
        match self.kind() {
            CatalogErrorKind::Configuration => "API key not configured",
            CatalogErrorKind::InvalidRequest => "Type a movie title to search.",
            CatalogErrorKind::Remote => "An error occurred while searching. Please try again.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_taxonomy() {
        let missing = CatalogError::MissingCredential;
        assert!(missing.is_configuration());
        assert_eq!(missing.status_code(), 500);
        assert_eq!(missing.user_message(), "API key not configured");

        let api = CatalogError::Api {
            status: 503,
            body: "maintenance".to_string(),
        };
        assert_eq!(api.kind(), CatalogErrorKind::Remote);
        assert_eq!(api.status_code(), 503);
        assert!(!api.is_configuration());

        assert_eq!(CatalogError::InvalidQuery.status_code(), 400);
    }
}
