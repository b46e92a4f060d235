//! Movie catalogue abstraction
//!
//! The recommendation engine reads movies only through [`MovieCatalogue`], so
//! it never knows whether they come from PostgreSQL or from memory. Both
//! implementations apply [`CandidateFilter`] with the same semantics.

use crate::{
    error::AppResult,
    models::{Movie, MovieId},
};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryCatalogue;
pub use self::postgres::PostgresCatalogue;

/// Which movies are eligible for scoring
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateFilter {
    /// Minimum rating; at or below 0 the floor is unset and unrated movies pass
    pub rating_floor: f64,
    /// Upper bound on the number of candidates returned
    pub limit: usize,
    /// Case-insensitive genre name
    pub genre: Option<String>,
}

impl CandidateFilter {
    fn floor_is_set(&self) -> bool {
        self.rating_floor > 0.0
    }

    /// Whether a movie passes the rating floor and genre restriction
    ///
    /// A missing rating only excludes a movie when a floor is actually set.
    pub fn admits(&self, movie: &Movie) -> bool {
        let rating_ok = match movie.rating {
            Some(rating) => rating >= self.rating_floor,
            None => !self.floor_is_set(),
        };
        let genre_ok = self
            .genre
            .as_deref()
            .map_or(true, |genre| movie.has_genre(genre));

        rating_ok && genre_ok
    }
}

/// Read-only access to the movie catalogue
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MovieCatalogue: Send + Sync {
    /// Returns up to `filter.limit` movies that pass the filter, lowest id first
    ///
    /// The order makes truncation at the limit repeatable. Returning fewer movies than the limit is not an error. Fails with
    /// `CatalogueUnavailable` when the backing store cannot be read.
    async fn fetch_candidates(&self, filter: &CandidateFilter) -> AppResult<Vec<Movie>>;

    /// Looks up a single movie, failing with `NotFound` when it is absent
    async fn fetch_movie(&self, id: MovieId) -> AppResult<Movie>;

    /// Catalogue name for logging and debugging
    fn name(&self) -> &'static str;
}
