use std::collections::BTreeMap;

use crate::{
    error::{AppError, AppResult},
    models::{Movie, MovieId},
    services::catalogue::{CandidateFilter, MovieCatalogue},
};

/// Catalogue held entirely in memory
///
/// Used for tests and for serving a fixed set of movies without a database.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalogue {
    movies: BTreeMap<MovieId, Movie>,
}

impl InMemoryCatalogue {
    pub fn new(movies: impl IntoIterator<Item = Movie>) -> Self {
        Self {
            movies: movies.into_iter().map(|m| (m.id, m)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }
}

#[async_trait::async_trait]
impl MovieCatalogue for InMemoryCatalogue {
    async fn fetch_candidates(&self, filter: &CandidateFilter) -> AppResult<Vec<Movie>> {
        Ok(self
            .movies
            .values()
            .filter(|movie| filter.admits(movie))
            .take(filter.limit)
            .cloned()
            .collect())
    }

    async fn fetch_movie(&self, id: MovieId) -> AppResult<Movie> {
        self.movies
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Movie {} not found", id)))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
