// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Inference service
//!
//! Drives a single request through normalization, classification and
//! persistence. Persistence is awaited before the outcome is returned, but a
//! failed write never changes that outcome.

use prediction_store::{PendingPrediction, PredictionLogger, PredictionRecord, RecordOutcome};
use serde::{Deserialize, Serialize};
use spam_predictor::{SpamPredictor, SpamPredictorError};
use thiserror::Error;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

use crate::{
    health::{HealthMonitor, HealthReport},
    metrics,
};

/// Errors surfaced by the inference service
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The classifier failed on the request text
    #[error(transparent)]
    Prediction(#[from] SpamPredictorError),
}

/// Successful classification as returned to clients
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PredictionOutcome {
    /// Whether the text was classified as spam
    #[schema(example = true)]
    pub is_spam: bool,
    /// Probability of the predicted label, rounded to 4 decimals
    #[schema(example = 0.9731)]
    pub confidence: f64,
    /// Seconds spent on the request, rounded to 4 decimals
    #[schema(example = 0.0012)]
    pub processing_time: f64,
}

/// Round to 4 decimal places
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Request pipeline over the shared classifier, logger and health monitor
#[derive(Debug, Clone)]
pub struct InferenceService {
    predictor: SpamPredictor,
    logger: PredictionLogger,
    health: HealthMonitor,
}

impl InferenceService {
    /// Create a service from its components
    pub fn new(predictor: SpamPredictor, logger: PredictionLogger, health: HealthMonitor) -> Self {
        Self {
            predictor,
            logger,
            health,
        }
    }

    /// Classify a raw text and persist the outcome
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Prediction` if the classifier fails; the failure
    /// is still recorded
    #[instrument(skip_all, fields(text_length = text.len()))]
    pub async fn predict(&self, text: &str) -> Result<PredictionOutcome, ServiceError> {
        let pending = PendingPrediction::start(text);

        match self.predictor.predict(text) {
            Ok(result) => {
                let confidence = result.confidence().as_f64();
                let record = pending.finish_success(result.label(), confidence);
                let outcome = PredictionOutcome {
                    // Taken from the label, so rounding cannot flip it
                    is_spam: result.is_spam(),
                    confidence: round4(confidence),
                    processing_time: round4(record.processing_time_seconds),
                };

                metrics::record_prediction(
                    Some(result.label()),
                    "success",
                    record.processing_time_seconds,
                );
                info!(
                    record_id = %record.id,
                    is_spam = outcome.is_spam,
                    confidence = outcome.confidence,
                    processing_time = outcome.processing_time,
                    "Prediction completed"
                );

                self.persist(record).await;
                Ok(outcome)
            }
            Err(e) => {
                let record = pending.finish_error(&e);

                metrics::record_prediction(None, "error", record.processing_time_seconds);
                warn!(record_id = %record.id, error = %e, "Prediction failed");

                self.persist(record).await;
                Err(e.into())
            }
        }
    }

    /// Compute a fresh health report
    pub async fn check_health(&self) -> HealthReport {
        let report = self.health.check().await;
        metrics::record_health_check(report.status.as_str());
        report
    }

    async fn persist(&self, record: PredictionRecord) {
        match self.logger.record(record).await {
            RecordOutcome::Stored => {}
            RecordOutcome::Refused => metrics::record_persistence_failure("refused"),
            RecordOutcome::Failed { reason } => metrics::record_persistence_failure(reason),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{
        sync::Arc,
        time::{Duration, Instant},
    };

    use prediction_store::{RecordStatus, StoreConfig, StoreConnection, StoreConnector};
    use spam_predictor::{
        Classifier, ClassifierOutput, ConfidenceScore, NormalizedText, SpamLabel,
        SpamPredictorResult,
    };
    use sqlx::{Connection, SqliteConnection};
    use tempfile::TempDir;

    use super::*;
    use crate::health::ModelLoadStatus;

    /// Classifier returning a fixed answer
    #[derive(Debug)]
    pub(crate) struct FixedClassifier {
        pub(crate) label: SpamLabel,
        pub(crate) confidence: f64,
    }

    impl Classifier for FixedClassifier {
        fn predict(&self, _text: &NormalizedText) -> SpamPredictorResult<ClassifierOutput> {
            Ok(ClassifierOutput::new(
                self.label,
                ConfidenceScore::new(self.confidence)?,
            ))
        }
    }

    /// Classifier that always fails
    #[derive(Debug)]
    pub(crate) struct BrokenClassifier;

    impl Classifier for BrokenClassifier {
        fn predict(&self, _text: &NormalizedText) -> SpamPredictorResult<ClassifierOutput> {
            Err(SpamPredictorError::prediction("model weights unavailable"))
        }
    }

    pub(crate) async fn memory_store() -> StoreConnection {
        let config = StoreConfig {
            max_connections: 1,
            ..StoreConfig::for_testing("sqlite::memory:")
        };
        StoreConnector::connect(&config).await.unwrap()
    }

    /// File-backed store, returned with its URI so tests can open side connections
    async fn file_store(
        dir: &TempDir,
        operation_timeout_ms: u64,
        max_connections: u32,
    ) -> (StoreConnection, String) {
        let uri = format!("sqlite://{}", dir.path().join("predictions.db").display());
        let config = StoreConfig {
            operation_timeout_ms,
            max_connections,
            ..StoreConfig::for_testing(uri.as_str())
        };
        (StoreConnector::connect(&config).await.unwrap(), uri)
    }

    pub(crate) fn service_with(
        classifier: Arc<dyn Classifier>,
        store: StoreConnection,
    ) -> InferenceService {
        InferenceService::new(
            SpamPredictor::new(classifier),
            PredictionLogger::new(store.clone()),
            HealthMonitor::new(ModelLoadStatus::Loaded, store),
        )
    }

    #[test]
    fn rounding() {
        assert!((round4(0.973_149) - 0.9731).abs() < 1e-12);
        assert!((round4(0.999_96) - 1.0).abs() < 1e-12);
        assert!((round4(0.000_04) - 0.0).abs() < 1e-12);
    }

    #[tokio::test]
    async fn successful_prediction_is_persisted() {
        let store = memory_store().await;
        let service = service_with(
            Arc::new(FixedClassifier {
                label: SpamLabel::Spam,
                confidence: 0.973_149,
            }),
            store.clone(),
        );

        let outcome = service.predict("WIN A FREE PRIZE NOW!!!").await.unwrap();

        assert!(outcome.is_spam);
        assert!((outcome.confidence - 0.9731).abs() < 1e-12);
        assert!(outcome.processing_time >= 0.0);

        let records = store.recent(10).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, RecordStatus::Success);
        assert_eq!(records[0].prediction, Some(SpamLabel::Spam));
        assert_eq!(records[0].input_text, "WIN A FREE PRIZE NOW!!!");
    }

    #[tokio::test]
    async fn rounding_never_flips_the_label() {
        let service = service_with(
            Arc::new(FixedClassifier {
                label: SpamLabel::Ham,
                confidence: 0.500_04,
            }),
            memory_store().await,
        );

        let outcome = service.predict("see you at lunch").await.unwrap();

        assert!(!outcome.is_spam);
        assert!((outcome.confidence - 0.5).abs() < 1e-12);
    }

    #[tokio::test]
    async fn failed_prediction_is_recorded_as_error() {
        let store = memory_store().await;
        let service = service_with(Arc::new(BrokenClassifier), store.clone());

        let err = service.predict("hello").await.unwrap_err();
        assert_eq!(err.to_string(), "Prediction failed: model weights unavailable");

        let records = store.recent(10).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, RecordStatus::Error);
        assert_eq!(
            records[0].error.as_deref(),
            Some("Prediction failed: model weights unavailable")
        );
    }

    #[tokio::test]
    async fn store_outage_does_not_affect_predictions() {
        let store = memory_store().await;
        let service = service_with(
            Arc::new(FixedClassifier {
                label: SpamLabel::Spam,
                confidence: 0.99,
            }),
            store.clone(),
        );
        store.close().await;

        let failures = metrics::PERSISTENCE_FAILURES.with_label_values(&["write"]);
        let before = failures.get();

        let outcome = service.predict("free cash prize").await.unwrap();

        assert!(outcome.is_spam);
        assert!(failures.get() > before);
        assert!(!service.check_health().await.is_ok());
    }

    #[tokio::test]
    async fn locked_store_delays_prediction_by_at_most_the_timeout() {
        let dir = TempDir::new().unwrap();
        let (store, uri) = file_store(&dir, 300, 2).await;
        let service = service_with(
            Arc::new(FixedClassifier {
                label: SpamLabel::Spam,
                confidence: 0.97,
            }),
            store.clone(),
        );

        let mut holder = SqliteConnection::connect(&uri).await.unwrap();
        sqlx::query("BEGIN EXCLUSIVE")
            .execute(&mut holder)
            .await
            .unwrap();

        let timeouts = metrics::PERSISTENCE_FAILURES.with_label_values(&["timeout"]);
        let before = timeouts.get();

        let start = Instant::now();
        let outcome = service.predict("WIN A FREE PRIZE").await.unwrap();
        let elapsed = start.elapsed();

        assert!(outcome.is_spam);
        assert!((outcome.confidence - 0.97).abs() < 1e-12);
        assert!(elapsed >= Duration::from_millis(300));
        assert!(elapsed < Duration::from_secs(2), "took {elapsed:?}");
        assert!(timeouts.get() > before);

        sqlx::query("ROLLBACK").execute(&mut holder).await.unwrap();
        holder.close().await.unwrap();
        assert!(store.recent(10).await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_predictions_are_all_persisted() {
        const REQUESTS: usize = 64;

        let dir = TempDir::new().unwrap();
        let (store, _) = file_store(&dir, 5_000, 4).await;
        let service = service_with(
            Arc::new(FixedClassifier {
                label: SpamLabel::Ham,
                confidence: 0.8,
            }),
            store.clone(),
        );

        let handles: Vec<_> = (0..REQUESTS)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move { service.predict(&format!("lunch at {i}")).await })
            })
            .collect();

        for handle in handles {
            assert!(!handle.await.unwrap().unwrap().is_spam);
        }

        let records = store.recent(1_000).await.unwrap();
        assert_eq!(records.len(), REQUESTS);
        assert!(records.iter().all(|r| r.status == RecordStatus::Success));
    }
}
