use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{AnalysisRecord, EmotionVector, MovieSummary, RecommendationQuery, ScoredMovie, UserId},
    services::{moods, RecommendationEngine},
};

use super::{
    extract::{AppJson, AppPath, AppQuery},
    AppState,
};

fn default_limit() -> i64 {
    10
}

fn default_mood_min_rating() -> f64 {
    6.0
}

/// Emotion-slider request
///
/// Weights arrive either as fractions (`emotions`) or as slider percentages
/// (`percentages`), never both.
#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    #[serde(default)]
    pub emotions: HashMap<String, f64>,
    #[serde(default)]
    pub percentages: HashMap<String, u32>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub min_rating: f64,
    pub genre: Option<String>,
    /// When set, the query is recorded in this user's history
    pub user_id: Option<String>,
}

impl RecommendationRequest {
    fn emotion_vector(&self) -> AppResult<EmotionVector> {
        match (self.emotions.is_empty(), self.percentages.is_empty()) {
            (false, false) => Err(AppError::InvalidQuery(
                "Send either emotions or percentages, not both".to_string(),
            )),
            (true, false) => EmotionVector::from_percentages(&self.percentages),
            _ => EmotionVector::from_fractions(&self.emotions),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MoodRequest {
    pub mood: String,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default = "default_mood_min_rating")]
    pub min_rating: f64,
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub movies: Vec<MovieSummary>,
    pub total: usize,
    pub query: RecommendationQuery,
}

impl RecommendationResponse {
    fn new(ranked: &[ScoredMovie], query: RecommendationQuery) -> Self {
        Self {
            movies: ranked.iter().map(MovieSummary::from).collect(),
            total: ranked.len(),
            query,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub genre: Option<String>,
}

/// Movies grouped under one dominant emotion
#[derive(Debug, Serialize)]
pub struct EmotionMoviesResponse {
    pub emotion: String,
    pub movies: Vec<MovieSummary>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct TopRatedResponse {
    pub genre: Option<String>,
    pub movies: Vec<MovieSummary>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct MoodsResponse {
    pub moods: Vec<&'static str>,
}

/// Records a successful query in the user's history
///
/// The recommendations are already computed, so a failed write is logged and
/// the response still goes out.
async fn record_analysis(
    state: &AppState,
    request_id: RequestId,
    user: &UserId,
    emotions: EmotionVector,
    movie_count: usize,
) {
    let record = AnalysisRecord::new(emotions, u32::try_from(movie_count).unwrap_or(u32::MAX));

    if let Err(e) = state.history.append(user, &record).await {
        tracing::warn!(
            request_id = %request_id,
            user = %user,
            error = %e,
            "Failed to record analysis"
        );
    }
}

fn parse_user(raw: Option<&str>) -> AppResult<Option<UserId>> {
    raw.map(UserId::parse).transpose()
}

/// Handler for emotion-slider recommendations
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    AppJson(request): AppJson<RecommendationRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    let user = parse_user(request.user_id.as_deref())?;

    let mut query = RecommendationQuery::new(request.emotion_vector()?, request.limit)
        .with_min_rating(request.min_rating);
    if let Some(genre) = request.genre.filter(|g| !g.trim().is_empty()) {
        query = query.with_genre(genre.trim());
    }

    let ranked = state.engine.recommend(&query).await?;

    tracing::info!(
        request_id = %request_id,
        result_count = ranked.len(),
        "Recommendations served"
    );

    if let Some(user) = user {
        record_analysis(&state, request_id, &user, query.emotions, ranked.len()).await;
    }

    Ok(Json(RecommendationResponse::new(&ranked, query)))
}

/// Handler for mood-keyword recommendations
pub async fn recommend_by_mood(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    AppJson(request): AppJson<MoodRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    let user = parse_user(request.user_id.as_deref())?;

    let query = RecommendationEngine::mood_query(&request.mood, request.limit, request.min_rating);
    let ranked = state.engine.recommend(&query).await?;

    if ranked.is_empty() {
        return Err(AppError::NotFound(format!(
            "No movies found for mood '{}'",
            request.mood.trim()
        )));
    }

    tracing::info!(
        request_id = %request_id,
        mood = %request.mood,
        result_count = ranked.len(),
        "Mood recommendations served"
    );

    if let Some(user) = user {
        record_analysis(&state, request_id, &user, query.emotions, ranked.len()).await;
    }

    Ok(Json(RecommendationResponse::new(&ranked, query)))
}

/// Handler for movies whose strongest base emotion is the one in the path
pub async fn by_emotion(
    State(state): State<AppState>,
    AppPath(emotion): AppPath<String>,
    AppQuery(params): AppQuery<ListParams>,
) -> AppResult<Json<EmotionMoviesResponse>> {
    let movies = state.engine.by_dominant_emotion(&emotion, params.limit).await?;

    if movies.is_empty() {
        return Err(AppError::NotFound(format!(
            "No movies found where '{}' dominates",
            emotion.trim()
        )));
    }

    Ok(Json(EmotionMoviesResponse {
        emotion: emotion.trim().to_lowercase(),
        total: movies.len(),
        movies: movies.iter().map(MovieSummary::from).collect(),
    }))
}

/// Handler for the highest rated movies, optionally within a genre
pub async fn top_rated(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<ListParams>,
) -> AppResult<Json<TopRatedResponse>> {
    let genre = params
        .genre
        .map(|g| g.trim().to_string())
        .filter(|g| !g.is_empty());
    let movies = state.engine.top_rated(params.limit, genre.clone()).await?;

    Ok(Json(TopRatedResponse {
        genre,
        total: movies.len(),
        movies: movies.iter().map(MovieSummary::from).collect(),
    }))
}

/// Lists the mood keywords the by-mood endpoint understands
pub async fn list_moods() -> Json<MoodsResponse> {
    Json(MoodsResponse {
        moods: moods::known_moods().collect(),
    })
}
