use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use cinefeels_api::{
    error::{AppError, AppResult},
    models::{AnalysisRecord, EmotionKey, EmotionVector, Movie, UserId},
    routes::{create_router, AppState},
    services::{
        catalogue::InMemoryCatalogue,
        history::{HistoryStore, InMemoryHistoryStore},
        EngineConfig, RecommendationEngine,
    },
};

fn vector(pairs: &[(EmotionKey, f64)]) -> EmotionVector {
    pairs
        .iter()
        .fold(EmotionVector::empty(), |v, &(key, value)| v.with(key, value))
}

fn scenario_movies() -> Vec<Movie> {
    vec![
        Movie::new(
            1,
            "A",
            vector(&[(EmotionKey::Joy, 0.9), (EmotionKey::Sadness, 0.1)]),
        )
        .with_rating(7.5),
        Movie::new(
            2,
            "B",
            vector(&[(EmotionKey::Joy, 0.2), (EmotionKey::Thrill, 0.9)]),
        )
        .with_rating(7.5),
    ]
}

fn thriller_movies() -> Vec<Movie> {
    vec![
        Movie::new(10, "Heat", vector(&[(EmotionKey::Thrill, 0.9), (EmotionKey::Fear, 0.3)]))
            .with_rating(8.3)
            .with_genres(["Crime", "Thriller"]),
        Movie::new(11, "Ronin", vector(&[(EmotionKey::Thrill, 0.8)]))
            .with_rating(7.2)
            .with_genres(["Action", "Thriller"]),
        Movie::new(12, "Alien", vector(&[(EmotionKey::Fear, 0.95), (EmotionKey::Thrill, 0.6)]))
            .with_rating(8.5)
            .with_genres(["Horror", "Science Fiction"]),
        Movie::new(13, "Paddington 2", vector(&[(EmotionKey::Joy, 0.9), (EmotionKey::Humor, 0.7)]))
            .with_rating(7.8)
            .with_genres(["Comedy", "Family"]),
    ]
}

fn create_test_server_with(movies: Vec<Movie>, history: Arc<dyn HistoryStore>) -> TestServer {
    let engine = RecommendationEngine::new(
        Arc::new(InMemoryCatalogue::new(movies)),
        EngineConfig::default(),
    );
    let app = create_router(AppState::new(engine, history));
    TestServer::new(app).unwrap()
}

fn create_test_server(movies: Vec<Movie>) -> TestServer {
    create_test_server_with(movies, Arc::new(InMemoryHistoryStore::new(20)))
}

/// History store whose backends are all down
struct UnavailableHistory;

#[async_trait::async_trait]
impl HistoryStore for UnavailableHistory {
    async fn append(&self, _user: &UserId, _record: &AnalysisRecord) -> AppResult<()> {
        Err(AppError::StoreUnavailable("offline".to_string()))
    }

    async fn read(&self, _user: &UserId) -> AppResult<Vec<AnalysisRecord>> {
        Err(AppError::StoreUnavailable("offline".to_string()))
    }

    fn name(&self) -> &'static str {
        "unavailable"
    }
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server(Vec::new());
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_recommendations_rank_by_emotional_fit() {
    let server = create_test_server(scenario_movies());

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({
            "emotions": { "joy": 0.8, "thrill": 0.5 },
            "limit": 10
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["total"], 2);
    assert_eq!(body["movies"][0]["title"], "A");
    assert_eq!(body["movies"][1]["title"], "B");

    let top = body["movies"][0]["similarityScore"].as_f64().unwrap();
    let second = body["movies"][1]["similarityScore"].as_f64().unwrap();
    assert!((top - 0.9).abs() < 1e-9);
    assert!((second - 0.4692).abs() < 1e-4);
    assert_eq!(body["movies"][0]["dominantEmotion"], "joy");
}

#[tokio::test]
async fn test_recommendations_accept_percentages() {
    let server = create_test_server(scenario_movies());

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "percentages": { "joy": 80, "thrill": 50 } }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["movies"][0]["title"], "A");
    assert_eq!(body["query"]["emotions"]["joy"], 0.8);
}

#[tokio::test]
async fn test_empty_query_is_bad_request() {
    let server = create_test_server(scenario_movies());

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "emotions": {} }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["retryable"], false);
    assert!(body["error"].as_str().unwrap().contains("at least one emotion"));
}

#[tokio::test]
async fn test_invalid_limits_and_weights_are_bad_requests() {
    let server = create_test_server(scenario_movies());

    for payload in [
        json!({ "emotions": { "joy": 0.5 }, "limit": 0 }),
        json!({ "emotions": { "joy": 0.5 }, "limit": 51 }),
        json!({ "emotions": { "joy": 1.5 } }),
        json!({ "emotions": { "nostalgia": 0.5 } }),
        json!({ "percentages": { "joy": 150 } }),
        json!({ "emotions": { "joy": 0.5 }, "min_rating": 11.0 }),
    ] {
        let response = server.post("/api/v1/recommendations").json(&payload).await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_undecodable_input_gets_json_error_body() {
    let server = create_test_server(scenario_movies());

    for payload in [
        json!({ "percentages": { "joy": -10 } }),
        json!({ "emotions": { "joy": 0.5 }, "limit": 2.5 }),
        json!({ "emotions": "joy" }),
    ] {
        let response = server.post("/api/v1/recommendations").json(&payload).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["retryable"], false, "{}", payload);
        assert!(body["error"].is_string());
    }

    for path in ["/api/v1/movies/10/similar?limit=many", "/api/v1/movies/heat"] {
        let response = server.get(path).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["retryable"], false, "{}", path);
    }

    let response = server
        .post("/api/v1/users/alice/history")
        .json(&json!({ "emotions": { "joy": 0.5 }, "movie_count": -1 }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["retryable"], false);
}

#[tokio::test]
async fn test_genre_and_rating_filters() {
    let server = create_test_server(thriller_movies());

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({
            "emotions": { "fear": 0.7 },
            "genre": "horror",
            "min_rating": 8.0
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["total"], 1);
    assert_eq!(body["movies"][0]["title"], "Alien");
}

#[tokio::test]
async fn test_recommendations_by_mood() {
    let server = create_test_server(thriller_movies());

    let response = server
        .post("/api/v1/recommendations/by-mood")
        .json(&json!({ "mood": "  Funny " }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["movies"][0]["title"], "Paddington 2");
}

#[tokio::test]
async fn test_mood_without_matches_is_not_found() {
    let server = create_test_server(Vec::new());

    let response = server
        .post("/api/v1/recommendations/by-mood")
        .json(&json!({ "mood": "happy" }))
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn test_list_moods() {
    let server = create_test_server(Vec::new());

    let body: Value = server.get("/api/v1/moods").await.json();
    let moods = body["moods"].as_array().unwrap();
    assert!(moods.contains(&json!("happy")));
    assert!(moods.contains(&json!("scary")));
}

#[tokio::test]
async fn test_movie_detail_and_not_found() {
    let server = create_test_server(thriller_movies());

    let response = server.get("/api/v1/movies/12").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["title"], "Alien");
    assert_eq!(body["genres"][0], "Horror");
    assert_eq!(body["emotionVector"]["fear"], 0.95);

    server.get("/api/v1/movies/999").await.assert_status_not_found();
}

#[tokio::test]
async fn test_movie_emotions() {
    let server = create_test_server(thriller_movies());

    let response = server.get("/api/v1/movies/10/emotions").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["movie_id"], 10);
    assert_eq!(body["title"], "Heat");
    assert_eq!(body["emotions"]["thrill"], 0.9);
    assert_eq!(body["emotions"]["sadness"], 0.0);
    // Thrill is an extended emotion, so fear dominates
    assert_eq!(body["dominant_emotion"], "fear");

    server.get("/api/v1/movies/999/emotions").await.assert_status_not_found();
}

#[tokio::test]
async fn test_movies_by_dominant_emotion() {
    let server = create_test_server(thriller_movies());

    let response = server.get("/api/v1/recommendations/by-emotion/Fear").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["emotion"], "fear");
    assert_eq!(body["total"], 2);
    assert_eq!(body["movies"][0]["title"], "Alien");
    assert_eq!(body["movies"][1]["title"], "Heat");

    let limited: Value = server
        .get("/api/v1/recommendations/by-emotion/fear?limit=1")
        .await
        .json();
    assert_eq!(limited["total"], 1);

    server
        .get("/api/v1/recommendations/by-emotion/anger")
        .await
        .assert_status_not_found();
    server
        .get("/api/v1/recommendations/by-emotion/thrill")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_top_rated_movies() {
    let server = create_test_server(thriller_movies());

    let body: Value = server
        .get("/api/v1/recommendations/top-rated?limit=2")
        .await
        .json();
    assert_eq!(body["total"], 2);
    assert_eq!(body["movies"][0]["title"], "Alien");
    assert_eq!(body["movies"][1]["title"], "Heat");

    let thrillers: Value = server
        .get("/api/v1/recommendations/top-rated?genre=thriller")
        .await
        .json();
    let titles: Vec<&str> = thrillers["movies"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Heat", "Ronin"]);
    assert_eq!(thrillers["genre"], "thriller");

    server
        .get("/api/v1/recommendations/top-rated?limit=0")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_mood_response_echoes_mood_query() {
    let server = create_test_server(thriller_movies());

    let body: Value = server
        .post("/api/v1/recommendations/by-mood")
        .json(&json!({ "mood": "scary", "limit": 3 }))
        .await
        .json();
    assert_eq!(body["query"]["limit"], 3);
    assert_eq!(body["query"]["min_rating"], 6.0);
    assert!(body["query"]["emotions"]["fear"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn test_similar_movies_exclude_reference() {
    let server = create_test_server(thriller_movies());

    let response = server.get("/api/v1/movies/10/similar?limit=2").await;
    response.assert_status_ok();
    let body: Value = response.json();

    let ids: Vec<i64> = body["movies"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids.len(), 2);
    assert!(!ids.contains(&10));
    assert_eq!(ids[0], 11);
}

#[tokio::test]
async fn test_history_and_profile_flow() {
    let server = create_test_server(Vec::new());

    for joy in [0.2, 0.4, 0.6] {
        server
            .post("/api/v1/users/alice/history")
            .json(&json!({ "emotions": { "joy": joy, "thrill": 0.9 }, "movie_count": 5 }))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let history: Value = server.get("/api/v1/users/alice/history").await.json();
    let analyses = history["analyses"].as_array().unwrap();
    assert_eq!(analyses.len(), 3);
    assert_eq!(analyses[0]["emotions"]["joy"], 0.6);

    let profile: Value = server.get("/api/v1/users/alice/profile").await.json();
    assert_eq!(profile["analysis_count"], 3);
    assert!((profile["profile"]["joy"].as_f64().unwrap() - 0.4).abs() < 1e-9);
    assert_eq!(profile["profile"]["sadness"], 0.0);
    assert!(profile["profile"].get("thrill").is_none());

    let stats: Value = server.get("/api/v1/users/alice/stats").await.json();
    assert_eq!(stats["total_analyses"], 3);
    assert_eq!(stats["total_movies"], 15);
}

#[tokio::test]
async fn test_recommendation_with_user_is_recorded() {
    let server = create_test_server(scenario_movies());

    server
        .post("/api/v1/recommendations")
        .json(&json!({ "emotions": { "joy": 0.8 }, "user_id": "bob" }))
        .await
        .assert_status_ok();

    let history: Value = server.get("/api/v1/users/bob/history").await.json();
    let analyses = history["analyses"].as_array().unwrap();
    assert_eq!(analyses.len(), 1);
    assert_eq!(analyses[0]["movieCount"], 2);
}

#[tokio::test]
async fn test_unknown_user_has_empty_profile() {
    let server = create_test_server(Vec::new());

    let profile: Value = server.get("/api/v1/users/nobody/profile").await.json();
    assert_eq!(profile["analysis_count"], 0);
    assert_eq!(profile["profile"]["joy"], 0.0);
}

#[tokio::test]
async fn test_unavailable_history_is_retryable() {
    let server = create_test_server_with(scenario_movies(), Arc::new(UnavailableHistory));

    let response = server.get("/api/v1/users/alice/profile").await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json();
    assert_eq!(body["retryable"], true);

    // Recommendations still succeed when recording the analysis fails
    server
        .post("/api/v1/recommendations")
        .json(&json!({ "emotions": { "joy": 0.8 }, "user_id": "alice" }))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = create_test_server(Vec::new());
    let id = "8d5b6f0e-3c55-4a4b-9d3e-6a1f5e2c7b90";

    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static(id),
        )
        .await;
    assert_eq!(response.header("x-request-id"), id);

    let generated = server.get("/health").await.header("x-request-id");
    assert!(uuid::Uuid::parse_str(generated.to_str().unwrap()).is_ok());
}
