use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::State,
    http::{HeaderValue, Method, StatusCode, header::CONTENT_TYPE},
    response::Json,
    routing::{get, post},
};
use reqwest::Client;
use serde_json::{Value, json};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;

use crate::config::AppConfig;
use crate::models::{GenerateRequest, RecommendationBundle};
use crate::tasks::{ImageRequester, MoodAnalyzer, RecommendationGenerator};

type ApiResult<T> = Result<Json<T>, ApiError>;
type ApiError = (StatusCode, Json<Value>);

fn bad_request_error(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

#[derive(Clone)]
pub struct AppState {
    pub mood: Arc<MoodAnalyzer>,
    pub images: Arc<ImageRequester>,
    pub recommendations: Arc<RecommendationGenerator>,
}

pub fn create_app(config: Arc<AppConfig>) -> Router {
    let client = Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .expect("failed to build HTTP client");

    let state = AppState {
        mood: Arc::new(MoodAnalyzer::new(client.clone(), config.clone())),
        images: Arc::new(ImageRequester::new(client.clone(), config.clone())),
        recommendations: Arc::new(RecommendationGenerator::new(client, config.clone())),
    };

    build_router(state, &config)
}

fn build_router(state: AppState, config: &AppConfig) -> Router {
    let origin = config
        .allowed_origin
        .parse::<HeaderValue>()
        .expect("ALLOWED_ORIGIN is not a valid header value");

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_check))
        .route("/generate", post(generate))
        .nest_service("/images", ServeDir::new(&config.images_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// Runs mood analysis, image generation and recommendation generation in
/// sequence, threading the mood label into the later calls.
async fn generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> ApiResult<Value> {
    let prompt = match request.prompt.as_deref().map(str::trim) {
        Some(p) if !p.is_empty() => p.to_string(),
        _ => return Err(bad_request_error("Prompt is required")),
    };

    info!(%prompt, city = ?request.city, "processing generate request");

    let mood_data = state.mood.analyze(&prompt).await;
    let image_url = state.images.request(&prompt, mood_data.mood).await;
    let bundle = state
        .recommendations
        .generate(&prompt, mood_data.mood, request.city.as_deref())
        .await;

    let recommendations = match &bundle {
        RecommendationBundle::Basic(b) => json!({
            "book": b.book,
            "tv": b.tv,
            "podcast": b.podcast,
            "food": b.food,
        }),
        RecommendationBundle::Extended(b) => {
            serde_json::to_value(b).unwrap_or(Value::Null)
        }
    };

    Ok(Json(json!({
        "imageUrl": image_url,
        "soundtrackUrl": bundle.soundtrack_url(),
        "mood": mood_data.mood,
        "intensity": mood_data.intensity,
        "moodExplanation": bundle.mood_explanation(),
        "recommendations": recommendations,
    })))
}
