use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::{EmotionKey, EmotionVector};

/// Stable catalogue identifier (TMDB movie id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieId(pub i64);

impl Display for MovieId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A catalogue entry with its precomputed emotion vector
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    pub overview: Option<String>,
    pub release_date: Option<NaiveDate>,
    /// Runtime in minutes
    pub runtime: Option<u32>,
    /// Average vote, typically 0-10
    pub rating: Option<f64>,
    pub popularity: Option<f64>,
    pub poster_path: Option<String>,
    pub genres: Vec<String>,
    pub emotions: EmotionVector,
}

impl Movie {
    /// Creates a movie with only the fields the ranking path looks at
    pub fn new(id: i64, title: impl Into<String>, emotions: EmotionVector) -> Self {
        Self {
            id: MovieId(id),
            title: title.into(),
            overview: None,
            release_date: None,
            runtime: None,
            rating: None,
            popularity: None,
            poster_path: None,
            genres: Vec::new(),
            emotions,
        }
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn with_release_date(mut self, date: NaiveDate) -> Self {
        self.release_date = Some(date);
        self
    }

    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = genres.into_iter().map(Into::into).collect();
        self
    }

    /// Case-insensitive genre membership
    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g.eq_ignore_ascii_case(genre))
    }
}

/// A movie paired with its similarity to the query that selected it
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMovie {
    pub movie: Movie,
    pub score: f64,
}

/// Movie as returned to clients in ranked lists
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MovieSummary {
    pub id: MovieId,
    pub title: String,
    pub release_date: Option<NaiveDate>,
    pub runtime: Option<u32>,
    pub rating: Option<f64>,
    pub poster_ref: Option<String>,
    pub genres: Vec<String>,
    pub emotion_vector: EmotionVector,
    pub dominant_emotion: Option<EmotionKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_score: Option<f64>,
}

impl From<&Movie> for MovieSummary {
    fn from(movie: &Movie) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            release_date: movie.release_date,
            runtime: movie.runtime,
            rating: movie.rating,
            poster_ref: movie.poster_path.clone(),
            genres: movie.genres.clone(),
            emotion_vector: movie.emotions,
            dominant_emotion: movie.emotions.dominant_base(),
            similarity_score: None,
        }
    }
}

impl From<&ScoredMovie> for MovieSummary {
    fn from(scored: &ScoredMovie) -> Self {
        Self {
            similarity_score: Some(scored.score),
            ..MovieSummary::from(&scored.movie)
        }
    }
}
