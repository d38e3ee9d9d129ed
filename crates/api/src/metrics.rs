// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Prometheus metrics module
//!
//! Provides global metrics using the default Prometheus registry via macros and
//! an Axum-compatible metrics handler.

use std::sync::LazyLock;

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use prometheus::{
    HistogramVec, IntCounterVec, TEXT_FORMAT, TextEncoder, register_histogram_vec,
    register_int_counter_vec,
};
use shared_types::SpamLabel;
use tracing::error;

/// Total number of classification attempts, labeled by predicted label and result.
pub static PREDICTIONS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "spam_api_predictions_total",
        "Total number of classification attempts, labeled by label and result",
        &["label", "result"]
    )
    .expect("Failed to create spam_api_predictions_total counter vec")
});

/// Histogram for end-to-end prediction durations in seconds.
pub static PREDICTION_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    register_histogram_vec!(
        "spam_api_prediction_duration_seconds",
        "Prediction durations in seconds",
        &["result"],
        vec![0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .expect("Failed to create prediction duration histogram")
});

/// Prediction records that could not be persisted, labeled by reason.
pub static PERSISTENCE_FAILURES: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "spam_api_persistence_failures_total",
        "Total number of prediction records that were not persisted",
        &["reason"]
    )
    .expect("Failed to create persistence failures counter vec")
});

/// Health checks served, labeled by resulting status.
pub static HEALTH_CHECKS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "spam_api_health_checks_total",
        "Total number of health checks, labeled by status",
        &["status"]
    )
    .expect("Failed to create health checks counter vec")
});

/// Record a classification attempt
///
/// # Arguments
/// * `label` - The predicted label, `None` when the classifier failed
/// * `result` - `success` or `error`
/// * `duration_secs` - Time from request receipt to outcome
pub fn record_prediction(label: Option<SpamLabel>, result: &str, duration_secs: f64) {
    let label = label.map_or("none", SpamLabel::as_str);
    PREDICTIONS.with_label_values(&[label, result]).inc();
    PREDICTION_DURATION
        .with_label_values(&[result])
        .observe(duration_secs);
}

/// Record a prediction record that was not persisted
pub fn record_persistence_failure(reason: &str) {
    PERSISTENCE_FAILURES.with_label_values(&[reason]).inc();
}

/// Record a served health check
pub fn record_health_check(status: &str) {
    HEALTH_CHECKS.with_label_values(&[status]).inc();
}

/// Axum handler that exports metrics in Prometheus text format
pub async fn metrics_handler() -> Response {
    let encoder = TextEncoder::new();
    let mut buffer = String::new();

    match encoder.encode_utf8(&prometheus::gather(), &mut buffer) {
        Ok(()) => ([(header::CONTENT_TYPE, TEXT_FORMAT)], buffer).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    #[test]
    fn prediction_counters_increment() {
        let counter = PREDICTIONS.with_label_values(&["spam", "success"]);
        let before = counter.get();

        record_prediction(Some(SpamLabel::Spam), "success", 0.002);

        assert!(counter.get() > before);
    }

    #[test]
    fn failed_predictions_have_no_label() {
        let counter = PREDICTIONS.with_label_values(&["none", "error"]);
        let before = counter.get();

        record_prediction(None, "error", 0.001);

        assert!(counter.get() > before);
    }

    #[tokio::test]
    async fn handler_exports_text_format() {
        record_persistence_failure("write");
        record_health_check("ok");

        let response = metrics_handler().await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("spam_api_persistence_failures_total"));
        assert!(text.contains("spam_api_health_checks_total"));
    }
}
