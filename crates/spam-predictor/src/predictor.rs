// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Main spam prediction orchestrator
//!
//! This module provides the `SpamPredictor` struct that runs a raw text through
//! the normalization pipeline and the loaded classifier.

use std::{path::Path, sync::Arc, time::Instant};

use tracing::{debug, info, instrument};

use crate::{
    classifier::{Classifier, NaiveBayesClassifier},
    error::SpamPredictorResult,
    normalizer::TextNormalizer,
    types::SpamPredictionResult,
};

/// Main spam prediction orchestrator
///
/// Cheap to clone; the normalizer and classifier are shared read-only.
#[derive(Debug, Clone)]
pub struct SpamPredictor {
    normalizer: Arc<TextNormalizer>,
    classifier: Arc<dyn Classifier>,
}

impl SpamPredictor {
    /// Create a predictor around an already loaded classifier
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self {
            normalizer: Arc::new(TextNormalizer::english()),
            classifier,
        }
    }

    /// Load the naive Bayes artifact at `path` and build a predictor around it
    ///
    /// # Errors
    ///
    /// Returns `SpamPredictorError::ArtifactLoad` if the artifact is missing or invalid
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn from_artifact<P: AsRef<Path>>(path: P) -> SpamPredictorResult<Self> {
        let classifier = NaiveBayesClassifier::from_file(path).await?;
        info!("SpamPredictor initialized with {:?}", classifier);
        Ok(Self::new(Arc::new(classifier)))
    }

    /// Normalize and classify a raw text
    ///
    /// # Errors
    ///
    /// Returns `SpamPredictorError::Prediction` if the classifier fails
    #[instrument(skip_all, fields(text_length = text.len()))]
    pub fn predict(&self, text: &str) -> SpamPredictorResult<SpamPredictionResult> {
        let start_time = Instant::now();

        let normalized = self.normalizer.normalize(text);
        let output = self.classifier.predict(&normalized)?;
        let elapsed = start_time.elapsed();

        debug!(
            label = %output.label,
            confidence = output.confidence.as_f64(),
            tokens = normalized.tokens().count(),
            duration_us = elapsed.as_micros(),
            "Classified text"
        );

        Ok(SpamPredictionResult::new(normalized, output, elapsed))
    }
}

#[cfg(test)]
mod tests {
    use shared_types::SpamLabel;
    use tempfile::TempDir;

    use super::*;
    use crate::{
        classifier::{MockClassifier, tests::sample_artifact},
        error::SpamPredictorError,
        types::{ClassifierOutput, ConfidenceScore, NormalizedText},
    };

    #[test]
    fn classifier_receives_normalized_text() {
        let mut classifier = MockClassifier::new();
        classifier
            .expect_predict()
            .withf(|text| text.as_str() == "win free prize")
            .times(1)
            .returning(|_| {
                Ok(ClassifierOutput::new(
                    SpamLabel::Spam,
                    ConfidenceScore::new(0.97)?,
                ))
            });

        let predictor = SpamPredictor::new(Arc::new(classifier));
        let result = predictor.predict("WIN A FREE PRIZE NOW!!!").unwrap();

        assert!(result.is_spam());
        assert!((result.confidence().as_f64() - 0.97).abs() < f64::EPSILON);
        assert_eq!(result.normalized_text().as_str(), "win free prize");
    }

    #[test]
    fn empty_text_is_still_classified() {
        let mut classifier = MockClassifier::new();
        classifier
            .expect_predict()
            .withf(NormalizedText::is_empty)
            .times(1)
            .returning(|_| {
                Ok(ClassifierOutput::new(
                    SpamLabel::Ham,
                    ConfidenceScore::new(0.87)?,
                ))
            });

        let predictor = SpamPredictor::new(Arc::new(classifier));
        let result = predictor.predict("").unwrap();

        assert!(!result.is_spam());
    }

    #[test]
    fn classifier_failure_is_propagated() {
        let mut classifier = MockClassifier::new();
        classifier
            .expect_predict()
            .returning(|_| Err(SpamPredictorError::prediction("corrupt weights")));

        let predictor = SpamPredictor::new(Arc::new(classifier));
        let err = predictor.predict("hello there").unwrap_err();

        assert!(err.is_prediction_error());
        assert_eq!(err.to_string(), "Prediction failed: corrupt weights");
    }

    #[tokio::test]
    async fn from_artifact_end_to_end() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("spam_model.json");
        tokio::fs::write(&path, serde_json::to_vec(&sample_artifact()).unwrap())
            .await
            .unwrap();

        let predictor = SpamPredictor::from_artifact(&path).await.unwrap();

        let spam = predictor.predict("Claim your FREE cash prize!").unwrap();
        assert_eq!(spam.label(), SpamLabel::Spam);

        let ham = predictor.predict("Call me when you get home").unwrap();
        assert_eq!(ham.label(), SpamLabel::Ham);
    }

    #[tokio::test]
    async fn from_artifact_missing_file() {
        let err = SpamPredictor::from_artifact("/nonexistent/spam_model.json")
            .await
            .unwrap_err();
        assert!(err.is_load_error());
    }
}
