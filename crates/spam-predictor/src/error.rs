// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for spam prediction operations
//!
//! This module provides error handling for artifact loading, classifier
//! invocation and validation of prediction values.

use std::path::Path;

use thiserror::Error;

/// Result type alias for spam prediction operations
pub type SpamPredictorResult<T> = Result<T, SpamPredictorError>;

/// Error types for spam prediction operations
#[derive(Debug, Error)]
pub enum SpamPredictorError {
    /// Classifier artifact could not be read, parsed or validated
    #[error("Failed to load classifier artifact from {path}: {message}")]
    ArtifactLoad {
        /// Path of the artifact file
        path: String,
        /// Description of the failure
        message: String,
    },

    /// Classifier failed while scoring a text
    #[error("Prediction failed: {message}")]
    Prediction {
        /// Description of the failure
        message: String,
    },

    /// A value violated a domain invariant
    #[error("Validation error: {message}")]
    Validation {
        /// Description of the violated invariant
        message: String,
    },
}

impl SpamPredictorError {
    /// Create an artifact load error for the given path
    pub fn artifact_load<T: ToString>(path: &Path, message: T) -> Self {
        Self::ArtifactLoad {
            path: path.display().to_string(),
            message: message.to_string(),
        }
    }

    /// Create a prediction error
    pub fn prediction<T: ToString>(message: T) -> Self {
        Self::Prediction {
            message: message.to_string(),
        }
    }

    /// Create a validation error
    pub fn validation<T: ToString>(message: T) -> Self {
        Self::Validation {
            message: message.to_string(),
        }
    }

    /// Check if this error happened while loading the artifact
    pub fn is_load_error(&self) -> bool {
        matches!(self, SpamPredictorError::ArtifactLoad { .. })
    }

    /// Check if this error happened while scoring a text
    pub fn is_prediction_error(&self) -> bool {
        matches!(
            self,
            SpamPredictorError::Prediction { .. } | SpamPredictorError::Validation { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_constructors() {
        let load_err = SpamPredictorError::artifact_load(Path::new("/tmp/model.json"), "missing");
        assert!(matches!(
            load_err,
            SpamPredictorError::ArtifactLoad { ref path, .. } if path == "/tmp/model.json"
        ));

        let predict_err = SpamPredictorError::prediction("non-finite score");
        assert!(matches!(predict_err, SpamPredictorError::Prediction { .. }));
    }

    #[test]
    fn error_classification() {
        let load_err = SpamPredictorError::artifact_load(Path::new("model.json"), "bad json");
        assert!(load_err.is_load_error());
        assert!(!load_err.is_prediction_error());

        let predict_err = SpamPredictorError::prediction("boom");
        assert!(predict_err.is_prediction_error());
        assert!(!predict_err.is_load_error());

        let validation_err = SpamPredictorError::validation("confidence out of range");
        assert!(validation_err.is_prediction_error());
    }

    #[test]
    fn error_display() {
        let error = SpamPredictorError::prediction("classifier exploded");
        assert_eq!(error.to_string(), "Prediction failed: classifier exploded");

        let error = SpamPredictorError::artifact_load(Path::new("a.json"), "not found");
        let display = error.to_string();
        assert!(display.contains("a.json"));
        assert!(display.contains("not found"));
    }
}
