//! HTTP surface: symptom list, prediction and assistant chat.
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use healthai_chat::GeminiChat;
use healthai_core::types::PredictionResult;
use healthai_pipeline::DiseasePredictor;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<DiseasePredictor>,
    pub chat: Arc<GeminiChat>,
}

impl AppState {
    pub fn new(predictor: DiseasePredictor, chat: GeminiChat) -> Self {
        Self { predictor: Arc::new(predictor), chat: Arc::new(chat) }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/symptoms", get(symptoms))
        .route("/predict", post(predict))
        .route("/chat", post(chat))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub symptoms: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    #[serde(flatten)]
    pub result: PredictionResult,
    /// Confidence as `"87.00%"`.
    pub score: String,
    /// Precision as `"50.00%"`.
    pub precision_percent: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

async fn symptoms(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "symptoms": state.predictor.available_symptoms(),
        "catalog": state.predictor.catalog().entries(),
    }))
}

async fn predict(State(state): State<AppState>, payload: Option<Json<PredictRequest>>) -> Response {
    let Some(Json(request)) = payload else {
        return bad_request("Symptoms required");
    };
    if request.symptoms.is_empty() {
        return bad_request("Select at least one symptom");
    }
    let result = state.predictor.predict(request.symptoms.as_slice());
    info!(disease = %result.disease, "prediction served");
    Json(PredictResponse { score: result.confidence_percent(), precision_percent: result.precision_percent(), result })
        .into_response()
}

async fn chat(State(state): State<AppState>, payload: Option<Json<ChatRequest>>) -> Response {
    let message = payload.and_then(|Json(r)| r.message).filter(|m| !m.trim().is_empty());
    let Some(message) = message else {
        return bad_request("Message required");
    };
    let response = state.chat.reply(&message).await;
    Json(json!({ "response": response })).into_response()
}
