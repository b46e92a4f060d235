use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{AnalysisRecord, EmotionVector, UserEmotionProfile, UserId, UserStats},
    services::profile,
};

use super::{
    extract::{AppJson, AppPath},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct AppendHistoryRequest {
    pub emotions: HashMap<String, f64>,
    #[serde(default)]
    pub movie_count: u32,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub user_id: UserId,
    pub analyses: Vec<AnalysisRecord>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user_id: UserId,
    pub analysis_count: usize,
    pub profile: UserEmotionProfile,
}

/// Handler for recording an analysis directly
pub async fn append_history(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    AppPath(user_id): AppPath<String>,
    AppJson(request): AppJson<AppendHistoryRequest>,
) -> AppResult<(StatusCode, Json<AnalysisRecord>)> {
    let user = UserId::parse(&user_id)?;
    let emotions = EmotionVector::from_fractions(&request.emotions)?;
    if emotions.is_empty() {
        return Err(AppError::InvalidQuery(
            "Select at least one emotion".to_string(),
        ));
    }

    let record = AnalysisRecord::new(emotions, request.movie_count);
    state.history.append(&user, &record).await?;

    tracing::info!(
        request_id = %request_id,
        user = %user,
        analysis_id = %record.id,
        "Analysis recorded"
    );

    Ok((StatusCode::CREATED, Json(record)))
}

/// Handler for a user's retained history, most recent first
pub async fn read_history(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<String>,
) -> AppResult<Json<HistoryResponse>> {
    let user = UserId::parse(&user_id)?;
    let analyses = state.history.read(&user).await?;

    Ok(Json(HistoryResponse {
        user_id: user,
        analyses,
    }))
}

/// Handler for the aggregated emotion profile
pub async fn emotion_profile(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    AppPath(user_id): AppPath<String>,
) -> AppResult<Json<ProfileResponse>> {
    let user = UserId::parse(&user_id)?;
    let history = state.history.read(&user).await?;
    let aggregated = profile::aggregate(&history);

    tracing::debug!(
        request_id = %request_id,
        user = %user,
        analyses = history.len(),
        "Profile aggregated"
    );

    Ok(Json(ProfileResponse {
        user_id: user,
        analysis_count: history.len(),
        profile: aggregated,
    }))
}

/// Handler for history statistics
pub async fn stats(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<String>,
) -> AppResult<Json<UserStats>> {
    let user = UserId::parse(&user_id)?;
    let history = state.history.read(&user).await?;
    Ok(Json(profile::stats(&history)))
}
