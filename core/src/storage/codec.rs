//! Serialized form of the favorites collection.
//!
//! Written documents are a versioned envelope:
//!
//! ```json
//! {"version": 1, "savedAt": "2024-05-01T12:00:00Z", "favorites": [ ... ]}
//! ```
//!
//! Older stores hold a bare array of entries; those are still read.

use crate::models::FavoriteEntry;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Version written by [`encode`]
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct DocumentRef<'a> {
    version: u32,
    #[serde(rename = "savedAt")]
    saved_at: DateTime<Utc>,
    favorites: &'a [FavoriteEntry],
}

#[derive(Deserialize)]
struct Document {
    favorites: Vec<FavoriteEntry>,
}

/// Serialize the whole collection
pub fn encode(favorites: &[FavoriteEntry]) -> Result<String> {
    let document = DocumentRef {
        version: FORMAT_VERSION,
        saved_at: Utc::now(),
        favorites,
    };
    Ok(serde_json::to_string(&document)?)
}

/// Parse a stored document, accepting the legacy bare-array layout
pub fn decode(raw: &str) -> Result<Vec<FavoriteEntry>> {
    let value: Value = serde_json::from_str(raw)?;

    if value.is_array() {
        return Ok(serde_json::from_value(value)?);
    }

    let Some(fields) = value.as_object() else {
        return Err(Error::InvalidInput(
            "favorites document must be an object or an array".to_string(),
        ));
    };

    let version = fields
        .get("version")
        .and_then(Value::as_u64)
        .ok_or_else(|| Error::InvalidInput("favorites document has no version".to_string()))?;
    if version != u64::from(FORMAT_VERSION) {
        return Err(Error::UnsupportedVersion(
            u32::try_from(version).unwrap_or(u32::MAX),
        ));
    }

    let document: Document = serde_json::from_value(value)?;
    Ok(document.favorites)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FavoriteUpdate, MovieRecord, Rating};

    fn sample() -> Vec<FavoriteEntry> {
        let mut matrix = MovieRecord::new(603, "The Matrix");
        matrix.release_date = "1999-03-30".to_string();
        matrix.vote_average = 8.2;
        matrix.runtime_minutes = Some(136);
        matrix.poster_path = Some("/matrix.jpg".to_string());

        let mut first = FavoriteEntry::new(matrix);
        first.apply(&FavoriteUpdate::rating(Rating::new(5).unwrap()).with_note("rewatch"));

        let second = FavoriteEntry::new(MovieRecord::new(27205, "Inception"));
        let mut third = FavoriteEntry::new(MovieRecord::new(155, "The Dark Knight"));
        third.apply(&FavoriteUpdate::note(""));

        vec![first, second, third]
    }

    #[test]
    fn test_round_trip_preserves_order_and_fields() {
        let favorites = sample();
        let raw = encode(&favorites).unwrap();
        assert_eq!(decode(&raw).unwrap(), favorites);
    }

    #[test]
    fn test_envelope_carries_version() {
        let raw = encode(&sample()).unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();

        assert_eq!(value["version"], 1);
        assert!(value["savedAt"].is_string());
        assert_eq!(value["favorites"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_reads_legacy_array() {
        let raw = r#"[
            {"id": 603, "title": "The Matrix", "poster_path": null, "overview": "",
             "release_date": "1999-03-30", "vote_average": 8.2, "runtime": 136,
             "userRating": 4, "userNote": "great"}
        ]"#;

        let favorites = decode(raw).unwrap();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].user_rating, Some(Rating::new(4).unwrap()));
        assert_eq!(favorites[0].user_note.as_deref(), Some("great"));
        assert_eq!(favorites[0].movie.runtime_minutes, Some(136));
    }

    #[test]
    fn test_legacy_zero_rating_reads_as_unrated() {
        let raw = r#"[
            {"id": 603, "title": "The Matrix", "userRating": 0, "userNote": "rewatch"},
            {"id": 27205, "title": "Inception", "userRating": null},
            {"id": 155, "title": "The Dark Knight", "userRating": 3}
        ]"#;

        let favorites = decode(raw).unwrap();
        assert_eq!(favorites.len(), 3);
        assert_eq!(favorites[0].user_rating, None);
        assert_eq!(favorites[0].user_note.as_deref(), Some("rewatch"));
        assert_eq!(favorites[1].user_rating, None);
        assert_eq!(favorites[2].user_rating, Some(Rating::new(3).unwrap()));
    }

    #[test]
    fn test_rejects_future_version() {
        let raw = r#"{"version": 2, "favorites": []}"#;
        assert!(matches!(decode(raw), Err(Error::UnsupportedVersion(2))));
    }

    #[test]
    fn test_rejects_corrupt_blob() {
        assert!(decode("{not json").is_err());
        assert!(decode("42").is_err());
        assert!(decode(r#"{"favorites": []}"#).is_err());
        assert!(decode(r#"[{"id": 1, "title": "Bad", "userRating": 11}]"#).is_err());
    }
}
