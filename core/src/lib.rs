//! Core of flicklist: movie records, the persisted favorites slot, the
//! favorites state manager and the movie catalog gateway.

pub mod catalog;
pub mod error;
pub mod favorites;
pub mod models;
pub mod storage;

pub use error::{Error, Result};
pub use favorites::{FavoritesManager, SubscriptionId};
