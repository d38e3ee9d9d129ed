// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! HTTP request handlers module
//!
//! This module provides HTTP request handlers for the spam detection server:
//! the service descriptor, health checks and text classification.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{INVALID_TEXT_MESSAGE, ServerError},
    extractors::{JsonBody, JsonExtractor},
    health::HealthReport,
    service::PredictionOutcome,
    state::ServerState,
};

/// Service descriptor returned by the root endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// Service name
    #[schema(example = "spam-detection-api")]
    pub name: String,
    /// Always `running` while the process serves requests
    #[schema(example = "running")]
    pub status: String,
    /// Crate version
    pub version: String,
    /// Available endpoints
    pub endpoints: Vec<String>,
}

/// Service descriptor endpoint handler
#[utoipa::path(
    get,
    path = "/",
    tag = "service",
    summary = "Service descriptor",
    description = "Reports that the service is running and lists its endpoints. POST text to /predict to classify it.",
    responses(
        (status = 200, description = "Service is running", body = ServiceInfo)
    )
)]
pub async fn root_handler() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: "spam-detection-api".to_string(),
        status: "running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints: ["GET /", "GET /health", "POST /predict", "GET /metrics"]
            .into_iter()
            .map(str::to_string)
            .collect(),
    })
}

/// Health check endpoint handler
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    summary = "Health check endpoint",
    description = "Pings the prediction store and reports it together with the classifier load status. Returns 503 when either is unavailable.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthReport),
        (status = 503, description = "Classifier not loaded or prediction store unreachable", body = HealthReport)
    )
)]
pub async fn health_handler(State(state): State<ServerState>) -> impl IntoResponse {
    let report = state.service().check_health().await;
    let status = if report.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report))
}

/// Text classification request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PredictRequest {
    /// Raw message text; may be empty
    #[schema(example = "WIN A FREE PRIZE NOW!!!")]
    pub text: String,
}

impl JsonBody for PredictRequest {
    fn invalid_input_message(_err: &serde_json::Error) -> String {
        INVALID_TEXT_MESSAGE.to_string()
    }
}

/// Error body returned for 4xx and 5xx responses
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Error description
    #[schema(example = "Invalid input, \"text\" key is required.")]
    pub error: String,
}

/// Text classification
///
/// Normalizes the text, classifies it and records the outcome. A prediction
/// store outage never changes the response.
///
/// # Errors
///
/// Returns `ServerError::Prediction` if the classifier fails.
#[utoipa::path(
    post,
    path = "/predict",
    tag = "prediction",
    summary = "Classify text as spam or ham",
    description = "Classifies the given text. Confidence and processing time are rounded to 4 decimal places.",
    request_body = PredictRequest,
    responses(
        (status = 200, description = "Text classified", body = PredictionOutcome),
        (status = 400, description = "Body is not JSON or has no string `text` field", body = ErrorBody),
        (status = 500, description = "Classifier failed", body = ErrorBody)
    )
)]
pub async fn predict_handler(
    State(state): State<ServerState>,
    JsonExtractor(request): JsonExtractor<PredictRequest>,
) -> Result<Json<PredictionOutcome>, ServerError> {
    let outcome = state.service().predict(&request.text).await?;
    Ok(Json(outcome))
}
