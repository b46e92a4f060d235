use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    middleware::{make_span_with_request_id, request_id_middleware},
    services::{history::HistoryStore, RecommendationEngine},
};

pub mod extract;
pub mod movies;
pub mod recommendations;
pub mod users;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RecommendationEngine>,
    pub history: Arc<dyn HistoryStore>,
}

impl AppState {
    pub fn new(engine: RecommendationEngine, history: Arc<dyn HistoryStore>) -> Self {
        Self {
            engine: Arc::new(engine),
            history,
        }
    }
}

/// Creates the application router with all routes and layers
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/recommendations", post(recommendations::recommend))
        .route("/recommendations/by-mood", post(recommendations::recommend_by_mood))
        .route(
            "/recommendations/by-emotion/:emotion",
            get(recommendations::by_emotion),
        )
        .route("/recommendations/top-rated", get(recommendations::top_rated))
        .route("/moods", get(recommendations::list_moods))
        .route("/movies/:id", get(movies::movie_detail))
        .route("/movies/:id/emotions", get(movies::movie_emotions))
        .route("/movies/:id/similar", get(movies::similar_movies))
        .route(
            "/users/:user_id/history",
            get(users::read_history).post(users::append_history),
        )
        .route("/users/:user_id/profile", get(users::emotion_profile))
        .route("/users/:user_id/stats", get(users::stats))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
