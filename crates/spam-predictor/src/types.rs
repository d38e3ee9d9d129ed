// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Type-safe domain models for spam prediction
//!
//! This module provides strongly-typed wrappers that encode business invariants
//! in the type system, making invalid states irrepresentable.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use shared_types::SpamLabel;

use crate::error::{SpamPredictorError, SpamPredictorResult};

/// Text produced by the normalization pipeline
///
/// Only [`crate::TextNormalizer`] constructs values of this type, so a
/// classifier receiving a `NormalizedText` can rely on it being lowercase,
/// letters-only, stopword-free, stemmed and single-space separated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct NormalizedText(String);

impl NormalizedText {
    pub(crate) fn new(value: String) -> Self {
        Self(value)
    }

    /// Get the string value
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if normalization removed every token
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the stemmed tokens
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.0.split(' ').filter(|token| !token.is_empty())
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Confidence score with validation (0.0 to 1.0)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct ConfidenceScore(f64);

impl ConfidenceScore {
    /// Create a new confidence score with validation
    ///
    /// # Errors
    ///
    /// Returns an error if the score is NaN or not between 0.0 and 1.0
    pub fn new(score: f64) -> SpamPredictorResult<Self> {
        if score.is_nan() {
            return Err(SpamPredictorError::validation(
                "Confidence score cannot be NaN",
            ));
        }

        if !(0.0..=1.0).contains(&score) {
            return Err(SpamPredictorError::validation(format!(
                "Confidence score must be between 0.0 and 1.0, got {score}"
            )));
        }

        Ok(Self(score))
    }

    /// Get the score at full precision
    pub fn as_f64(self) -> f64 {
        self.0
    }
}

/// Label and confidence returned by a classifier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierOutput {
    /// Predicted class
    pub label: SpamLabel,
    /// Maximum class-membership probability
    pub confidence: ConfidenceScore,
}

impl ClassifierOutput {
    /// Create a new classifier output
    pub fn new(label: SpamLabel, confidence: ConfidenceScore) -> Self {
        Self { label, confidence }
    }
}

/// Result of running the full normalize-then-classify pipeline on a text
#[derive(Debug, Clone)]
pub struct SpamPredictionResult {
    normalized_text: NormalizedText,
    output: ClassifierOutput,
    processing_time: Duration,
}

impl SpamPredictionResult {
    /// Create a new prediction result
    pub fn new(
        normalized_text: NormalizedText,
        output: ClassifierOutput,
        processing_time: Duration,
    ) -> Self {
        Self {
            normalized_text,
            output,
            processing_time,
        }
    }

    /// Get the predicted label
    pub fn label(&self) -> SpamLabel {
        self.output.label
    }

    /// Check if result indicates spam
    pub fn is_spam(&self) -> bool {
        self.output.label.is_spam()
    }

    /// Get confidence score
    pub fn confidence(&self) -> ConfidenceScore {
        self.output.confidence
    }

    /// Get the text that was fed to the classifier
    pub fn normalized_text(&self) -> &NormalizedText {
        &self.normalized_text
    }

    /// Get the time spent normalizing and classifying
    pub fn processing_time(&self) -> Duration {
        self.processing_time
    }
}
