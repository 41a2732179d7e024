use serde::{Deserialize, Serialize};

/// Stable catalog key of a movie
pub type MovieId = u64;

/// Image host for posters; a size segment such as `w500` follows
pub const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p";

/// Poster width used by the detail view
pub const DEFAULT_POSTER_SIZE: &str = "w500";

/// A movie as returned by the catalog.
///
/// Field names on the wire follow the catalog's JSON so search and detail
/// payloads deserialize directly. `runtime` is only present after a detail
/// fetch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieRecord {
    pub id: MovieId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(
        rename = "runtime",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub runtime_minutes: Option<u32>,
}

impl MovieRecord {
    /// Create a record with only identity and title set
    pub fn new(id: MovieId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            poster_path: None,
            overview: String::new(),
            release_date: String::new(),
            vote_average: 0.0,
            runtime_minutes: None,
        }
    }

    /// Full poster URL at `size` (`w92`, `w500`, `original`, ...), if the
    /// catalog provided an image reference
    pub fn poster_url(&self, size: &str) -> Option<String> {
        self.poster_path
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(|p| format!("{}/{}{}", POSTER_BASE_URL, size, p))
    }

    /// Year component of the release date
    pub fn release_year(&self) -> Option<i32> {
        chrono::NaiveDate::parse_from_str(&self.release_date, "%Y-%m-%d")
            .ok()
            .map(|d| chrono::Datelike::year(&d))
    }

    /// Release year for display, `N/A` when unknown
    pub fn year_label(&self) -> String {
        self.release_year()
            .map(|y| y.to_string())
            .unwrap_or_else(|| "N/A".to_string())
    }

    /// Runtime for display, `N/A` until a detail fetch filled it in
    pub fn runtime_label(&self) -> String {
        match self.runtime_minutes {
            Some(minutes) if minutes > 0 => format!("{} min", minutes),
            _ => "N/A".to_string(),
        }
    }

    /// Overview for display
    pub fn overview_or_placeholder(&self) -> &str {
        if self.overview.trim().is_empty() {
            "No description available."
        } else {
            &self.overview
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_catalog_payload() {
        let json = r#"{
            "id": 603,
            "title": "The Matrix",
            "poster_path": "/f89U3ADr1oiB1s9GkdPOEpXUk5H.jpg",
            "overview": "Set in the 22nd century...",
            "release_date": "1999-03-30",
            "vote_average": 8.2,
            "adult": false,
            "genre_ids": [28, 878]
        }"#;

        let movie: MovieRecord = serde_json::from_str(json).unwrap();
        assert_eq!(movie.id, 603);
        assert_eq!(movie.title, "The Matrix");
        assert_eq!(movie.release_year(), Some(1999));
        assert_eq!(movie.runtime_minutes, None);
        assert_eq!(
            movie.poster_url(DEFAULT_POSTER_SIZE).as_deref(),
            Some("https://image.tmdb.org/t/p/w500/f89U3ADr1oiB1s9GkdPOEpXUk5H.jpg")
        );
        assert_eq!(
            movie.poster_url("w92").as_deref(),
            Some("https://image.tmdb.org/t/p/w92/f89U3ADr1oiB1s9GkdPOEpXUk5H.jpg")
        );
    }

    #[test]
    fn test_null_poster_and_missing_date() {
        let json = r#"{"id": 1, "title": "Obscure", "poster_path": null, "overview": "", "vote_average": 0}"#;
        let movie: MovieRecord = serde_json::from_str(json).unwrap();

        assert_eq!(movie.poster_url(DEFAULT_POSTER_SIZE), None);
        assert_eq!(movie.year_label(), "N/A");
        assert_eq!(movie.overview_or_placeholder(), "No description available.");
    }

    #[test]
    fn test_runtime_label() {
        let mut movie = MovieRecord::new(603, "The Matrix");
        assert_eq!(movie.runtime_label(), "N/A");

        movie.runtime_minutes = Some(136);
        assert_eq!(movie.runtime_label(), "136 min");
    }

    #[test]
    fn test_runtime_serialized_under_catalog_name() {
        let mut movie = MovieRecord::new(603, "The Matrix");
        movie.runtime_minutes = Some(136);

        let value = serde_json::to_value(&movie).unwrap();
        assert_eq!(value["runtime"], 136);
        assert!(value.get("poster_path").is_none());
    }
}
