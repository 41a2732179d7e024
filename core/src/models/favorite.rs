use super::{MovieId, MovieRecord, Rating};
use serde::{de, Deserialize, Deserializer, Serialize};

/// A favorited movie with the user's own annotations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FavoriteEntry {
    #[serde(flatten)]
    pub movie: MovieRecord,
    #[serde(
        rename = "userRating",
        default,
        deserialize_with = "deserialize_user_rating",
        skip_serializing_if = "Option::is_none"
    )]
    pub user_rating: Option<Rating>,
    #[serde(rename = "userNote", default, skip_serializing_if = "Option::is_none")]
    pub user_note: Option<String>,
}

impl FavoriteEntry {
    /// Create a new, unannotated favorite
    pub fn new(movie: MovieRecord) -> Self {
        Self {
            movie,
            user_rating: None,
            user_note: None,
        }
    }

    pub fn id(&self) -> MovieId {
        self.movie.id
    }

    /// Merge a partial update; returns whether anything changed
    pub fn apply(&mut self, update: &FavoriteUpdate) -> bool {
        let rating_changed = update.user_rating.apply_to(&mut self.user_rating);
        let note_changed = update.user_note.apply_to(&mut self.user_note);
        rating_changed || note_changed
    }
}

/// Older stores write `0` for "not rated" next to a note.
fn deserialize_user_rating<'de, D>(deserializer: D) -> Result<Option<Rating>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<u8>::deserialize(deserializer)? {
        None | Some(0) => Ok(None),
        Some(stars) => Rating::new(stars).map(Some).map_err(de::Error::custom),
    }
}

impl From<MovieRecord> for FavoriteEntry {
    fn from(movie: MovieRecord) -> Self {
        Self::new(movie)
    }
}

/// Change to a single optional field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate<T> {
    /// Leave the field as it is
    Keep,
    /// Store a value
    Set(T),
    /// Remove the value
    Clear,
}

impl<T> Default for FieldUpdate<T> {
    fn default() -> Self {
        FieldUpdate::Keep
    }
}

impl<T: Clone + PartialEq> FieldUpdate<T> {
    /// Apply to `target`, returning whether it changed
    pub fn apply_to(&self, target: &mut Option<T>) -> bool {
        let next = match self {
            FieldUpdate::Keep => return false,
            FieldUpdate::Set(value) => Some(value.clone()),
            FieldUpdate::Clear => None,
        };
        if *target == next {
            return false;
        }
        *target = next;
        true
    }

    pub fn is_keep(&self) -> bool {
        matches!(self, FieldUpdate::Keep)
    }
}

impl<T> From<Option<T>> for FieldUpdate<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => FieldUpdate::Set(v),
            None => FieldUpdate::Clear,
        }
    }
}

/// Partial update of a favorite's annotations. Fields are independent:
/// unspecified ones are left untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FavoriteUpdate {
    pub user_rating: FieldUpdate<Rating>,
    pub user_note: FieldUpdate<String>,
}

impl FavoriteUpdate {
    pub fn rating(rating: Rating) -> Self {
        Self {
            user_rating: FieldUpdate::Set(rating),
            ..Self::default()
        }
    }

    pub fn note(note: impl Into<String>) -> Self {
        Self {
            user_note: FieldUpdate::Set(note.into()),
            ..Self::default()
        }
    }

    pub fn clear_rating() -> Self {
        Self {
            user_rating: FieldUpdate::Clear,
            ..Self::default()
        }
    }

    pub fn clear_note() -> Self {
        Self {
            user_note: FieldUpdate::Clear,
            ..Self::default()
        }
    }

    pub fn with_rating(mut self, rating: Rating) -> Self {
        self.user_rating = FieldUpdate::Set(rating);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.user_note = FieldUpdate::Set(note.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.user_rating.is_keep() && self.user_note.is_keep()
    }
}
