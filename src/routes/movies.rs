use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{EmotionKey, EmotionVector, Movie, MovieId, MovieSummary},
};

use super::{
    extract::{AppPath, AppQuery},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct SimilarParams {
    limit: Option<i64>,
}

/// Full movie view: the list summary plus detail-only fields
#[derive(Debug, Serialize)]
pub struct MovieDetail {
    #[serde(flatten)]
    pub summary: MovieSummary,
    pub overview: Option<String>,
    pub popularity: Option<f64>,
}

impl From<&Movie> for MovieDetail {
    fn from(movie: &Movie) -> Self {
        Self {
            summary: MovieSummary::from(movie),
            overview: movie.overview.clone(),
            popularity: movie.popularity,
        }
    }
}

/// A movie's full emotion vector
#[derive(Debug, Serialize)]
pub struct MovieEmotions {
    pub movie_id: MovieId,
    pub title: String,
    pub emotions: EmotionVector,
    pub dominant_emotion: Option<EmotionKey>,
}

impl From<Movie> for MovieEmotions {
    fn from(movie: Movie) -> Self {
        Self {
            movie_id: movie.id,
            dominant_emotion: movie.emotions.dominant_base(),
            emotions: movie.emotions,
            title: movie.title,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SimilarResponse {
    pub movie_id: MovieId,
    pub movies: Vec<MovieSummary>,
    pub total: usize,
}

/// Handler for single-movie lookup
pub async fn movie_detail(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<MovieDetail>> {
    let movie = state.engine.movie(MovieId(id)).await?;
    Ok(Json(MovieDetail::from(&movie)))
}

/// Handler for a movie's emotion breakdown
pub async fn movie_emotions(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<MovieEmotions>> {
    let movie = state.engine.movie(MovieId(id)).await?;
    Ok(Json(MovieEmotions::from(movie)))
}

/// Handler for movies that feel like a given one
pub async fn similar_movies(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    AppPath(id): AppPath<i64>,
    AppQuery(params): AppQuery<SimilarParams>,
) -> AppResult<Json<SimilarResponse>> {
    let movie_id = MovieId(id);
    let similar = state
        .engine
        .similar_to(movie_id, params.limit.unwrap_or(10))
        .await?;

    tracing::info!(
        request_id = %request_id,
        movie_id = %movie_id,
        result_count = similar.len(),
        "Similar movies served"
    );

    Ok(Json(SimilarResponse {
        movie_id,
        total: similar.len(),
        movies: similar.iter().map(MovieSummary::from).collect(),
    }))
}
