use serde::Serialize;

use super::EmotionVector;

/// Highest rating a movie can carry; floors above it can never match
pub const MAX_RATING: f64 = 10.0;

/// A single recommendation request, validated by the engine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationQuery {
    /// Requested weights; only non-zero entries matter
    pub emotions: EmotionVector,
    /// Maximum number of ranked movies to return
    pub limit: i64,
    /// Minimum rating; 0 means unset, which also admits unrated movies
    pub min_rating: f64,
    /// Optional case-insensitive genre restriction
    pub genre: Option<String>,
}

impl RecommendationQuery {
    pub fn new(emotions: EmotionVector, limit: i64) -> Self {
        Self {
            emotions,
            limit,
            min_rating: 0.0,
            genre: None,
        }
    }

    pub fn with_min_rating(mut self, min_rating: f64) -> Self {
        self.min_rating = min_rating;
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }
}
