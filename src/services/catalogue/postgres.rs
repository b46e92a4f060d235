use chrono::NaiveDate;
use sqlx::{types::Json, PgPool};
use serde_json::Value;
use std::collections::HashMap;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{EmotionVector, Movie, MovieId},
    services::{
        catalogue::{CandidateFilter, MovieCatalogue},
        genre_emotions::emotions_from_genres,
    },
};

const MOVIE_COLUMNS: &str = "id, title, overview, release_date, runtime, rating, popularity, \
                             poster_path, genres, emotions";

/// Catalogue backed by the `movies` table, with single-movie lookups cached in Redis
#[derive(Clone)]
pub struct PostgresCatalogue {
    db_pool: PgPool,
    cache: Cache,
    movie_cache_ttl: u64,
}

/// Raw `movies` row
#[derive(Debug, sqlx::FromRow)]
struct MovieRow {
    id: i64,
    title: String,
    overview: Option<String>,
    release_date: Option<NaiveDate>,
    runtime: Option<i32>,
    rating: Option<f64>,
    popularity: Option<f64>,
    poster_path: Option<String>,
    genres: Vec<String>,
    /// Analysis output; may carry non-numeric entries such as a dominant label
    emotions: Option<Json<HashMap<String, Value>>>,
}

impl From<MovieRow> for Movie {
    fn from(row: MovieRow) -> Self {
        let analyzed = row
            .emotions
            .map(|Json(scores)| {
                EmotionVector::from_scores_clamped(
                    scores
                        .into_iter()
                        .filter_map(|(key, value)| value.as_f64().map(|score| (key, score))),
                )
            })
            .filter(|vector| !vector.is_empty());

        // Movies that were never analyzed get a genre-derived estimate
        let emotions = analyzed.unwrap_or_else(|| emotions_from_genres(&row.genres));

        Movie {
            id: MovieId(row.id),
            title: row.title,
            overview: row.overview,
            release_date: row.release_date,
            runtime: row.runtime.and_then(|r| u32::try_from(r).ok()),
            rating: row.rating,
            popularity: row.popularity,
            poster_path: row.poster_path,
            genres: row.genres,
            emotions,
        }
    }
}

impl PostgresCatalogue {
    pub fn new(db_pool: PgPool, cache: Cache, movie_cache_ttl: u64) -> Self {
        Self {
            db_pool,
            cache,
            movie_cache_ttl,
        }
    }

    async fn load_movie(&self, id: MovieId) -> AppResult<Movie> {
        let query = format!("SELECT {} FROM movies WHERE id = $1", MOVIE_COLUMNS);
        let row: Option<MovieRow> = sqlx::query_as(&query)
            .bind(id.0)
            .fetch_optional(&self.db_pool)
            .await
            .map_err(unavailable)?;

        row.map(Movie::from)
            .ok_or_else(|| AppError::NotFound(format!("Movie {} not found", id)))
    }
}

/// Candidate selection for a [`CandidateFilter`]
///
/// An unset floor (<= 0) admits unrated movies; a set floor excludes them.
/// Rows come back in id order so a pool bound always keeps the same movies.
fn candidates_query() -> String {
    format!(
        r#"
        SELECT {}
        FROM movies
        WHERE (rating >= $1 OR ($1 <= 0 AND rating IS NULL))
          AND ($2::TEXT IS NULL OR EXISTS (
                SELECT 1 FROM unnest(genres) AS g WHERE lower(g) = lower($2)))
        ORDER BY id
        LIMIT $3
        "#,
        MOVIE_COLUMNS
    )
}

fn unavailable(e: sqlx::Error) -> AppError {
    tracing::error!(error = %e, "Catalogue query failed");
    AppError::CatalogueUnavailable(e.to_string())
}

#[async_trait::async_trait]
impl MovieCatalogue for PostgresCatalogue {
    async fn fetch_candidates(&self, filter: &CandidateFilter) -> AppResult<Vec<Movie>> {
        let query = candidates_query();
        let limit = i64::try_from(filter.limit).unwrap_or(i64::MAX);
        let rows: Vec<MovieRow> = sqlx::query_as(&query)
            .bind(filter.rating_floor)
            .bind(filter.genre.as_deref())
            .bind(limit)
            .fetch_all(&self.db_pool)
            .await
            .map_err(unavailable)?;

        tracing::debug!(
            candidates = rows.len(),
            rating_floor = filter.rating_floor,
            genre = ?filter.genre,
            "Fetched candidates from PostgreSQL"
        );

        Ok(rows.into_iter().map(Movie::from).collect())
    }

    async fn fetch_movie(&self, id: MovieId) -> AppResult<Movie> {
        cached!(self.cache, CacheKey::Movie(id), self.movie_cache_ttl, self.load_movie(id))
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
