// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Classifier abstraction and the naive Bayes artifact implementation
//!
//! The serving layer only depends on the [`Classifier`] trait. The concrete
//! [`NaiveBayesClassifier`] is a TF-IDF vectorizer followed by a multinomial
//! naive Bayes model, deserialized from a JSON artifact produced by the
//! offline training pipeline. Once loaded it is never mutated, so it can be
//! shared behind an `Arc` by every in-flight request.

use std::{collections::HashMap, fmt, path::Path};

use serde::{Deserialize, Serialize};
use shared_types::SpamLabel;
use tokio::fs;
use tracing::{debug, info};

use crate::{
    error::{SpamPredictorError, SpamPredictorResult},
    types::{ClassifierOutput, ConfidenceScore, NormalizedText},
};

/// Artifact layout version understood by this crate
pub const SUPPORTED_FORMAT_VERSION: u32 = 1;

/// Tokens shorter than this are ignored by the vectorizer
const MIN_TOKEN_CHARS: usize = 2;

/// Read-only text classifier
///
/// Implementations must not mutate shared state in [`Classifier::predict`];
/// the server calls it concurrently from many request tasks without locking.
#[cfg_attr(test, mockall::automock)]
pub trait Classifier: Send + Sync + fmt::Debug {
    /// Score a normalized text, returning the predicted label and the
    /// probability of that label
    ///
    /// # Errors
    ///
    /// Returns `SpamPredictorError::Prediction` if the text cannot be scored
    fn predict(&self, text: &NormalizedText) -> SpamPredictorResult<ClassifierOutput>;
}

/// Vector normalization applied to TF-IDF features
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureNorm {
    /// Euclidean normalization
    #[default]
    L2,
    /// Manhattan normalization
    L1,
    /// Raw TF-IDF weights
    None,
}

/// Serialized form of a trained TF-IDF + multinomial naive Bayes model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NaiveBayesArtifact {
    /// Layout version of this file
    pub format_version: u32,
    /// Class names in model order
    pub classes: Vec<String>,
    /// Term to feature index mapping
    pub vocabulary: HashMap<String, usize>,
    /// Inverse document frequency per feature index
    pub idf: Vec<f64>,
    /// Log prior probability per class
    pub class_log_prior: Vec<f64>,
    /// Log probability of each feature given each class, `[class][feature]`
    pub feature_log_prob: Vec<Vec<f64>>,
    /// Whether term frequencies were replaced by `1 + ln(tf)` during training
    #[serde(default)]
    pub sublinear_tf: bool,
    /// Normalization applied to TF-IDF vectors
    #[serde(default)]
    pub norm: FeatureNorm,
}

impl NaiveBayesArtifact {
    /// Check shapes and values, returning the class labels in model order
    fn validate(&self) -> Result<Vec<SpamLabel>, String> {
        if self.format_version != SUPPORTED_FORMAT_VERSION {
            return Err(format!(
                "unsupported format_version {} (expected {SUPPORTED_FORMAT_VERSION})",
                self.format_version
            ));
        }

        let labels = self
            .classes
            .iter()
            .map(|class| class.parse::<SpamLabel>().map_err(|e| e.to_string()))
            .collect::<Result<Vec<_>, _>>()?;

        if labels.len() != 2 || labels[0] == labels[1] {
            return Err(format!(
                "expected exactly the classes 'spam' and 'ham', got {:?}",
                self.classes
            ));
        }

        let n_features = self.vocabulary.len();
        if n_features == 0 {
            return Err("vocabulary is empty".to_string());
        }

        let mut seen = vec![false; n_features];
        for (term, &index) in &self.vocabulary {
            match seen.get_mut(index) {
                Some(slot) if !*slot => *slot = true,
                Some(_) => return Err(format!("duplicate feature index {index} for '{term}'")),
                None => {
                    return Err(format!(
                        "feature index {index} for '{term}' exceeds vocabulary size {n_features}"
                    ));
                }
            }
        }

        if self.idf.len() != n_features {
            return Err(format!(
                "idf has {} entries, vocabulary has {n_features}",
                self.idf.len()
            ));
        }

        if self.class_log_prior.len() != labels.len() {
            return Err(format!(
                "class_log_prior has {} entries for {} classes",
                self.class_log_prior.len(),
                labels.len()
            ));
        }

        if self.feature_log_prob.len() != labels.len() {
            return Err(format!(
                "feature_log_prob has {} rows for {} classes",
                self.feature_log_prob.len(),
                labels.len()
            ));
        }

        if let Some(row) = self
            .feature_log_prob
            .iter()
            .find(|row| row.len() != n_features)
        {
            return Err(format!(
                "feature_log_prob row has {} entries, vocabulary has {n_features}",
                row.len()
            ));
        }

        let all_finite = self
            .idf
            .iter()
            .chain(&self.class_log_prior)
            .chain(self.feature_log_prob.iter().flatten())
            .all(|value| value.is_finite());
        if !all_finite {
            return Err("model parameters contain NaN or infinite values".to_string());
        }

        Ok(labels)
    }
}

/// TF-IDF + multinomial naive Bayes text classifier
pub struct NaiveBayesClassifier {
    labels: Vec<SpamLabel>,
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    class_log_prior: Vec<f64>,
    feature_log_prob: Vec<Vec<f64>>,
    sublinear_tf: bool,
    norm: FeatureNorm,
}

impl NaiveBayesClassifier {
    /// Load the classifier from a JSON artifact file
    ///
    /// # Errors
    ///
    /// Returns `SpamPredictorError::ArtifactLoad` if the file cannot be read,
    /// is not a valid artifact, or fails validation
    pub async fn from_file<P: AsRef<Path>>(path: P) -> SpamPredictorResult<Self> {
        let path = path.as_ref();
        debug!("Loading classifier artifact from: {}", path.display());

        let content = fs::read_to_string(path)
            .await
            .map_err(|e| SpamPredictorError::artifact_load(path, e))?;

        let artifact: NaiveBayesArtifact = serde_json::from_str(&content)
            .map_err(|e| SpamPredictorError::artifact_load(path, e))?;

        let classifier = Self::from_artifact(artifact)
            .map_err(|e| SpamPredictorError::artifact_load(path, e))?;

        info!(
            vocabulary_size = classifier.vocabulary_size(),
            classes = ?classifier.labels,
            "Loaded classifier artifact from {}",
            path.display()
        );

        Ok(classifier)
    }

    /// Build the classifier from an in-memory artifact
    ///
    /// # Errors
    ///
    /// Returns a description of the first validation failure
    pub fn from_artifact(artifact: NaiveBayesArtifact) -> Result<Self, String> {
        let labels = artifact.validate()?;

        Ok(Self {
            labels,
            vocabulary: artifact.vocabulary,
            idf: artifact.idf,
            class_log_prior: artifact.class_log_prior,
            feature_log_prob: artifact.feature_log_prob,
            sublinear_tf: artifact.sublinear_tf,
            norm: artifact.norm,
        })
    }

    /// Number of known terms
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Sparse TF-IDF vector for a text, as `(feature index, weight)` pairs
    fn vectorize(&self, text: &NormalizedText) -> Vec<(usize, f64)> {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for token in text
            .tokens()
            .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
        {
            if let Some(&index) = self.vocabulary.get(token) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut features: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(index, count)| {
                let tf = if self.sublinear_tf {
                    1.0 + count.ln()
                } else {
                    count
                };
                (index, tf * self.idf[index])
            })
            .collect();

        let magnitude = match self.norm {
            FeatureNorm::L2 => features.iter().map(|(_, w)| w * w).sum::<f64>().sqrt(),
            FeatureNorm::L1 => features.iter().map(|(_, w)| w.abs()).sum::<f64>(),
            FeatureNorm::None => 1.0,
        };
        if magnitude > 0.0 {
            for (_, weight) in &mut features {
                *weight /= magnitude;
            }
        }

        features
    }

    /// Posterior probability of each class, in model order
    fn class_probabilities(&self, text: &NormalizedText) -> SpamPredictorResult<Vec<f64>> {
        let features = self.vectorize(text);

        let joint_log_likelihood: Vec<f64> = self
            .class_log_prior
            .iter()
            .zip(&self.feature_log_prob)
            .map(|(prior, log_probs)| {
                prior
                    + features
                        .iter()
                        .map(|&(index, weight)| weight * log_probs[index])
                        .sum::<f64>()
            })
            .collect();

        let max = joint_log_likelihood
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        if !max.is_finite() {
            return Err(SpamPredictorError::prediction(
                "joint log likelihood is not finite",
            ));
        }

        let exps: Vec<f64> = joint_log_likelihood
            .iter()
            .map(|jll| (jll - max).exp())
            .collect();
        let total: f64 = exps.iter().sum();

        Ok(exps.into_iter().map(|e| e / total).collect())
    }
}

impl Classifier for NaiveBayesClassifier {
    fn predict(&self, text: &NormalizedText) -> SpamPredictorResult<ClassifierOutput> {
        let probabilities = self.class_probabilities(text)?;

        // First maximum wins on ties
        let (best, probability) = probabilities.iter().copied().enumerate().fold(
            (0, f64::NEG_INFINITY),
            |(best, best_p), (i, p)| if p > best_p { (i, p) } else { (best, best_p) },
        );

        let confidence = ConfidenceScore::new(probability)
            .map_err(|e| SpamPredictorError::prediction(e.to_string()))?;

        Ok(ClassifierOutput::new(self.labels[best], confidence))
    }
}

impl fmt::Debug for NaiveBayesClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NaiveBayesClassifier")
            .field("labels", &self.labels)
            .field("vocabulary_size", &self.vocabulary.len())
            .field("sublinear_tf", &self.sublinear_tf)
            .field("norm", &self.norm)
            .finish_non_exhaustive()
    }
}
