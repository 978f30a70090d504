//! HTTP routes and handlers

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::{debug, info};

use diapredict_core::{InputRecord, PredictionResult};
use diapredict_model::predict_outcome;

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/predict", post(predict))
        .route("/features", get(features))
        .route("/test", post(test_prediction))
        .fallback(not_found)
        // The browser dashboards consuming this API are served from
        // other origins
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Report whether the schema and classifier are loaded
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let model_loaded = state.model_loaded();
    let status = if model_loaded { "healthy" } else { "degraded" };

    Json(json!({
        "status": status,
        "model_loaded": model_loaded,
        "model_name": state.classifier.as_ref().map(|c| c.name().to_string()),
        "num_features": state.schema.num_features(),
        "classes": state.schema.target_names,
    }))
}

async fn metrics(State(state): State<AppState>) -> String {
    state.metrics_handle.render()
}

/// Main prediction handler
async fn predict(
    State(state): State<AppState>,
    Json(record): Json<InputRecord>,
) -> Json<PredictionResult> {
    metrics::counter!("diapredict_requests_total").increment(1);
    debug!("Received prediction request with {} fields", record.len());

    Json(run_prediction(&state, &record))
}

/// Echo the schema registry: feature order, classes, and categorical
/// encodings, verbatim
async fn features(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "feature_names": state.schema.feature_names,
        "target_names": state.schema.target_names,
        "categorical_mapping": state.schema.categorical_mapping,
    }))
}

/// Run a canned example record through the normal prediction path
async fn test_prediction(State(state): State<AppState>) -> Json<PredictionResult> {
    let sample = json!({
        "edad": 45,
        "niveles_glucosa": 180,
        "niveles_insulina": 35,
        "indice_masa_corporal": 28.5,
        "autoanticuerpos": "Negative",
        "antecedentes_familiares": "Yes",
        "marcadores_geneticos": "Positive",
        "presion_arterial": 130,
        "niveles_colesterol": 220,
        "actividad_fisica": "Low"
    });
    let record = sample.as_object().cloned().unwrap_or_default();

    info!("Running sample prediction");
    Json(run_prediction(&state, &record))
}

fn run_prediction(state: &AppState, record: &InputRecord) -> PredictionResult {
    let start = std::time::Instant::now();

    let outcome = predict_outcome(
        record,
        &state.schema,
        state.classifier.as_deref(),
        &state.config.fallback,
    );

    metrics::histogram!("diapredict_prediction_latency_us")
        .record(start.elapsed().as_micros() as f64);

    let path = if outcome.fallback_used { "fallback" } else { "model" };
    metrics::counter!("diapredict_predictions_total", "path" => path).increment(1);

    info!(
        path,
        class = %outcome.result.predicted_class,
        probability = outcome.result.probability,
        "Prediction complete"
    );

    outcome.result
}

async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "not found" })),
    )
        .into_response()
}
