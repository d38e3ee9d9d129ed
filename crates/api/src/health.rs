// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Service health reporting
//!
//! Health is recomputed on every call: the store is pinged afresh and combined
//! with the classifier status recorded at startup.

use std::fmt;

use chrono::Utc;
use prediction_store::StoreConnection;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use utoipa::ToSchema;

/// Outcome of loading the classifier artifact at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelLoadStatus {
    /// Artifact loaded and validated
    Loaded,
    /// Artifact could not be loaded
    Failed {
        /// Load error description
        reason: String,
    },
}

impl ModelLoadStatus {
    /// Whether the classifier is usable
    pub fn is_loaded(&self) -> bool {
        matches!(self, ModelLoadStatus::Loaded)
    }
}

impl fmt::Display for ModelLoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelLoadStatus::Loaded => f.write_str("Loaded successfully"),
            ModelLoadStatus::Failed { reason } => write!(f, "Load failed: {reason}"),
        }
    }
}

/// Overall service status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthState {
    /// Classifier loaded and store reachable
    Ok,
    /// At least one dependency unavailable
    Error,
}

impl HealthState {
    /// Lowercase label for metrics
    pub fn as_str(self) -> &'static str {
        match self {
            HealthState::Ok => "ok",
            HealthState::Error => "error",
        }
    }
}

/// Reachability of the prediction store at check time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum StoreStatus {
    /// Ping succeeded
    Connected,
    /// Ping failed or timed out
    Unreachable,
}

/// Point-in-time health of the service
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    /// Overall status
    pub status: HealthState,
    /// Human-readable summary
    #[schema(example = "Service is operational")]
    pub message: String,
    /// Failure detail, present only when status is `ERROR`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Classifier load status
    #[schema(example = "Loaded successfully")]
    pub model_status: String,
    /// Prediction store reachability
    pub store_status: StoreStatus,
    /// RFC 3339 time the report was produced
    pub timestamp: String,
}

impl HealthReport {
    /// Whether the service is fully operational
    pub fn is_ok(&self) -> bool {
        self.status == HealthState::Ok
    }
}

/// Computes [`HealthReport`]s from the classifier status and a live store ping
#[derive(Debug, Clone)]
pub struct HealthMonitor {
    model_status: ModelLoadStatus,
    connection: StoreConnection,
}

impl HealthMonitor {
    /// Create a monitor for the given classifier status and store
    pub fn new(model_status: ModelLoadStatus, connection: StoreConnection) -> Self {
        Self {
            model_status,
            connection,
        }
    }

    /// Check dependencies and build a fresh report
    pub async fn check(&self) -> HealthReport {
        let ping = self.connection.ping().await;
        let store_status = if ping.is_ok() {
            StoreStatus::Connected
        } else {
            StoreStatus::Unreachable
        };

        let (status, message, error) = match (&self.model_status, ping) {
            (ModelLoadStatus::Failed { reason }, _) => (
                HealthState::Error,
                "Classifier is not loaded",
                Some(reason.clone()),
            ),
            (ModelLoadStatus::Loaded, Err(e)) => {
                warn!(error = %e, "Health check could not reach the prediction store");
                (
                    HealthState::Error,
                    "Prediction store is unreachable",
                    Some(e.to_string()),
                )
            }
            (ModelLoadStatus::Loaded, Ok(())) => (HealthState::Ok, "Service is operational", None),
        };

        debug!(status = status.as_str(), ?store_status, "Health check completed");

        HealthReport {
            status,
            message: message.to_string(),
            error,
            model_status: self.model_status.to_string(),
            store_status,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}
