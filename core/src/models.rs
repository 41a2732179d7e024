mod favorite;
mod movie;
mod rating;
mod search;

pub use favorite::{FavoriteEntry, FavoriteUpdate, FieldUpdate};
pub use movie::{MovieId, MovieRecord, DEFAULT_POSTER_SIZE, POSTER_BASE_URL};
pub use rating::Rating;
pub use search::SearchResult;
