use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A user rating between 1 and 5 stars
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(stars: u8) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&stars) {
            Ok(Self(stars))
        } else {
            Err(Error::InvalidInput(format!(
                "rating must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                stars
            )))
        }
    }

    pub fn stars(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let filled = self.0 as usize;
        let empty = (Self::MAX - self.0) as usize;
        write!(f, "{}{}", "★".repeat(filled), "☆".repeat(empty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        assert!(Rating::new(0).is_err());
        assert!(Rating::new(6).is_err());
        assert_eq!(Rating::new(1).unwrap().stars(), 1);
        assert_eq!(Rating::new(5).unwrap().stars(), 5);
    }

    #[test]
    fn test_rating_rejected_on_deserialize() {
        assert!(serde_json::from_str::<Rating>("9").is_err());
        assert_eq!(serde_json::from_str::<Rating>("4").unwrap().stars(), 4);
    }

    #[test]
    fn test_rating_display() {
        assert_eq!(Rating::new(3).unwrap().to_string(), "★★★☆☆");
    }
}
