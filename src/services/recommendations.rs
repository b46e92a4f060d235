use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;

use crate::{
    error::{AppError, AppResult},
    models::{
        EmotionKey, EmotionVector, Movie, MovieId, RecommendationQuery, ScoredMovie, MAX_RATING,
    },
    services::{
        catalogue::{CandidateFilter, MovieCatalogue},
        matcher, moods,
    },
};

/// Limits the engine enforces on every request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Largest `limit` a query may ask for
    pub max_result_cap: usize,
    /// How many candidates to pull from the catalogue per query
    pub candidate_pool_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_result_cap: 50,
            candidate_pool_size: 5000,
        }
    }
}

/// Ranks catalogue movies against emotion queries
///
/// Holds no mutable state; one engine serves any number of concurrent
/// requests. Persisting the resulting analysis is left to the caller.
#[derive(Clone)]
pub struct RecommendationEngine {
    catalogue: Arc<dyn MovieCatalogue>,
    config: EngineConfig,
}

impl RecommendationEngine {
    pub fn new(catalogue: Arc<dyn MovieCatalogue>, config: EngineConfig) -> Self {
        Self { catalogue, config }
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Returns the best-matching movies for a query, best first
    ///
    /// Invalid queries are rejected before the catalogue is touched.
    /// Catalogue failures are propagated unchanged and never retried.
    pub async fn recommend(&self, query: &RecommendationQuery) -> AppResult<Vec<ScoredMovie>> {
        let limit = self.validate(query)?;
        let start = Instant::now();

        let filter = self.candidate_filter(query.min_rating, query.genre.clone());
        let mut ranked = self.rank_candidates(&query.emotions, &filter).await?;
        ranked.truncate(limit);

        tracing::info!(
            catalogue = self.catalogue.name(),
            returned = ranked.len(),
            top_score = ranked.first().map(|s| s.score),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Recommendations ranked"
        );

        Ok(ranked)
    }

    /// The query a mood keyword such as "happy" or "scary" stands for
    pub fn mood_query(mood: &str, limit: i64, min_rating: f64) -> RecommendationQuery {
        RecommendationQuery::new(moods::mood_emotions(mood), limit).with_min_rating(min_rating)
    }

    /// Recommendations for a mood keyword, see [`Self::mood_query`]
    pub async fn recommend_by_mood(
        &self,
        mood: &str,
        limit: i64,
        min_rating: f64,
    ) -> AppResult<Vec<ScoredMovie>> {
        self.recommend(&Self::mood_query(mood, limit, min_rating)).await
    }

    /// Movies that feel like a given movie, excluding the movie itself
    ///
    /// Matches on the reference movie's extended emotions, or on its full
    /// vector when it carries none.
    pub async fn similar_to(&self, id: MovieId, limit: i64) -> AppResult<Vec<ScoredMovie>> {
        let limit = self.validate_limit(limit)?;
        let reference = self.catalogue.fetch_movie(id).await?;

        let extended = reference.emotions.extended_only();
        let emotions = if extended.is_empty() {
            reference.emotions
        } else {
            extended
        };

        if emotions.is_empty() {
            return Err(AppError::NotFound(format!(
                "Movie {} has no emotion data",
                id
            )));
        }

        let filter = self.candidate_filter(0.0, None);
        let mut similar: Vec<ScoredMovie> = self
            .rank_candidates(&emotions, &filter)
            .await?
            .into_iter()
            .filter(|scored| scored.movie.id != id)
            .collect();
        similar.truncate(limit);

        tracing::info!(movie_id = %id, returned = similar.len(), "Similar movies ranked");

        Ok(similar)
    }

    /// Single-movie lookup
    pub async fn movie(&self, id: MovieId) -> AppResult<Movie> {
        self.catalogue.fetch_movie(id).await
    }

    /// Movies whose strongest base emotion is `emotion`, highest rated first
    ///
    /// Each result's score is the movie's own value for that emotion.
    pub async fn by_dominant_emotion(
        &self,
        emotion: &str,
        limit: i64,
    ) -> AppResult<Vec<ScoredMovie>> {
        let key: EmotionKey = emotion.parse()?;
        if !key.is_base() {
            return Err(AppError::InvalidQuery(format!(
                "'{}' is not a base emotion; choose one of {}",
                key,
                EmotionKey::BASE.map(|k| k.as_str()).join(", ")
            )));
        }
        let limit = self.validate_limit(limit)?;

        let filter = self.candidate_filter(0.0, None);
        let candidates = self.fetch_pool(&filter).await?;

        let mut matching: Vec<ScoredMovie> = candidates
            .into_iter()
            .filter(|movie| movie.emotions.dominant_base() == Some(key))
            .map(|movie| ScoredMovie {
                score: movie.emotions.get(key),
                movie,
            })
            .collect();
        matching.sort_by(|a, b| by_rating(&a.movie, &b.movie));
        matching.truncate(limit);

        tracing::info!(emotion = %key, returned = matching.len(), "Dominant-emotion movies listed");

        Ok(matching)
    }

    /// Highest rated movies, optionally within one genre
    ///
    /// Unrated movies never appear.
    pub async fn top_rated(&self, limit: i64, genre: Option<String>) -> AppResult<Vec<Movie>> {
        let limit = self.validate_limit(limit)?;

        let filter = self.candidate_filter(0.0, genre);
        let mut rated: Vec<Movie> = self
            .fetch_pool(&filter)
            .await?
            .into_iter()
            .filter(|movie| movie.rating.is_some())
            .collect();
        rated.sort_by(by_rating);
        rated.truncate(limit);

        tracing::info!(genre = ?filter.genre, returned = rated.len(), "Top rated movies listed");

        Ok(rated)
    }

    fn candidate_filter(&self, rating_floor: f64, genre: Option<String>) -> CandidateFilter {
        CandidateFilter {
            rating_floor,
            limit: self.config.candidate_pool_size,
            genre,
        }
    }

    /// Fetches candidates, noting when the pool bound cut the catalogue short
    async fn fetch_pool(&self, filter: &CandidateFilter) -> AppResult<Vec<Movie>> {
        let candidates = self.catalogue.fetch_candidates(filter).await?;

        if candidates.len() >= filter.limit {
            tracing::warn!(
                catalogue = self.catalogue.name(),
                pool_size = filter.limit,
                "Candidate pool is full; movies beyond it were not considered"
            );
        }

        Ok(candidates)
    }

    async fn rank_candidates(
        &self,
        emotions: &EmotionVector,
        filter: &CandidateFilter,
    ) -> AppResult<Vec<ScoredMovie>> {
        let candidates = self.fetch_pool(filter).await?;
        tracing::debug!(candidates = candidates.len(), "Scoring candidates");
        Ok(matcher::rank(emotions, candidates))
    }

    /// Checks a query and returns its limit as a usable count
    fn validate(&self, query: &RecommendationQuery) -> AppResult<usize> {
        if query.emotions.is_empty() {
            return Err(AppError::InvalidQuery(
                "Select at least one emotion".to_string(),
            ));
        }

        if !(0.0..=MAX_RATING).contains(&query.min_rating) {
            return Err(AppError::InvalidQuery(format!(
                "min_rating must be between 0 and {}, got {}",
                MAX_RATING, query.min_rating
            )));
        }

        self.validate_limit(query.limit)
    }

    fn validate_limit(&self, limit: i64) -> AppResult<usize> {
        match usize::try_from(limit) {
            Ok(n) if n >= 1 && n <= self.config.max_result_cap => Ok(n),
            _ => Err(AppError::InvalidQuery(format!(
                "limit must be between 1 and {}, got {}",
                self.config.max_result_cap, limit
            ))),
        }
    }
}

/// Rating descending with unrated movies last, then id ascending
fn by_rating(a: &Movie, b: &Movie) -> Ordering {
    matcher::compare_rating(b, a).then_with(|| a.id.cmp(&b.id))
}
