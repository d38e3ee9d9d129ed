// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Prediction log records
//!
//! A [`PendingPrediction`] is opened when a request enters the pipeline and is
//! consumed into a terminal [`PredictionRecord`] exactly once, so a record can
//! never be finalized twice or updated after it is written.

use std::{
    fmt,
    str::FromStr,
    time::{Duration, Instant},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::SpamLabel;
use uuid::Uuid;

/// Lifecycle status of a prediction record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    /// Request received, outcome not yet known
    Pending,
    /// Classifier returned a label
    Success,
    /// Classifier failed
    Error,
}

impl RecordStatus {
    /// Column value for this status
    pub fn as_str(self) -> &'static str {
        match self {
            RecordStatus::Pending => "pending",
            RecordStatus::Success => "success",
            RecordStatus::Error => "error",
        }
    }

    /// Whether the record may be persisted
    pub fn is_terminal(self) -> bool {
        !matches!(self, RecordStatus::Pending)
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RecordStatus::Pending),
            "success" => Ok(RecordStatus::Success),
            "error" => Ok(RecordStatus::Error),
            other => Err(format!("unknown record status '{other}'")),
        }
    }
}

/// One classification attempt as written to the prediction log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    /// Unique record identifier
    pub id: Uuid,
    /// When the request was received
    pub timestamp: DateTime<Utc>,
    /// Raw request text
    pub input_text: String,
    /// Outcome status
    pub status: RecordStatus,
    /// Predicted label, success only
    pub prediction: Option<SpamLabel>,
    /// Probability of the predicted label, success only
    pub confidence: Option<f64>,
    /// Seconds from request receipt to outcome
    pub processing_time_seconds: f64,
    /// Failure description, error only
    pub error: Option<String>,
}

/// A classification attempt whose outcome is not yet known
#[derive(Debug)]
pub struct PendingPrediction {
    id: Uuid,
    timestamp: DateTime<Utc>,
    input_text: String,
    started: Instant,
}

impl PendingPrediction {
    /// Open a record for a request received now
    pub fn start(input_text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            input_text: input_text.into(),
            started: Instant::now(),
        }
    }

    /// Record identifier
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Time since the request was received
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Current state as a pending record
    pub fn snapshot(&self) -> PredictionRecord {
        self.to_record(RecordStatus::Pending, None, None, None)
    }

    /// Finalize as a successful classification
    pub fn finish_success(self, label: SpamLabel, confidence: f64) -> PredictionRecord {
        self.to_record(RecordStatus::Success, Some(label), Some(confidence), None)
    }

    /// Finalize as a failed classification
    pub fn finish_error(self, error: impl ToString) -> PredictionRecord {
        self.to_record(RecordStatus::Error, None, None, Some(error.to_string()))
    }

    fn to_record(
        &self,
        status: RecordStatus,
        prediction: Option<SpamLabel>,
        confidence: Option<f64>,
        error: Option<String>,
    ) -> PredictionRecord {
        PredictionRecord {
            id: self.id,
            timestamp: self.timestamp,
            input_text: self.input_text.clone(),
            status,
            prediction,
            confidence,
            processing_time_seconds: self.elapsed().as_secs_f64(),
            error,
        }
    }
}
