use super::MovieRecord;
use serde::{Deserialize, Serialize};

/// One page of catalog search results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub page: u32,
    pub results: Vec<MovieRecord>,
    pub total_pages: u32,
    pub total_results: u32,
}

impl SearchResult {
    /// An empty first page
    pub fn empty() -> Self {
        Self {
            page: 1,
            results: Vec::new(),
            total_pages: 0,
            total_results: 0,
        }
    }

    /// A valid response with zero matches
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn has_more_pages(&self) -> bool {
        self.page < self.total_pages
    }
}
