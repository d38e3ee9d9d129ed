// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Text spam prediction
//!
//! This crate turns raw message text into a spam/ham label with a confidence
//! score. It is split into a deterministic normalization pipeline and a
//! classifier loaded once from a trained artifact.
//!
//! # Architecture
//!
//! - [`normalizer`]: letters-only, lowercase, stopword-free, stemmed feature text
//! - [`classifier`]: the [`Classifier`] seam and the TF-IDF naive Bayes artifact
//! - [`predictor`]: orchestration of normalize-then-classify
//! - [`types`]: validated domain values
//! - [`error`]: error types
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use spam_predictor::SpamPredictor;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let predictor = SpamPredictor::from_artifact("assets/models/spam_model.json").await?;
//!
//! let result = predictor.predict("WIN A FREE PRIZE NOW!!!")?;
//! println!("spam: {} ({:.4})", result.is_spam(), result.confidence().as_f64());
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod error;
pub mod normalizer;
pub mod predictor;
pub mod stopwords;
pub mod types;

// Re-export main types for convenience
pub use classifier::{Classifier, FeatureNorm, NaiveBayesArtifact, NaiveBayesClassifier};
pub use error::{SpamPredictorError, SpamPredictorResult};
pub use normalizer::TextNormalizer;
pub use predictor::SpamPredictor;
pub use shared_types::SpamLabel;
pub use types::{ClassifierOutput, ConfidenceScore, NormalizedText, SpamPredictionResult};
