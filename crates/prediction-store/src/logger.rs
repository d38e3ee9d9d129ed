// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Best-effort prediction logging
//!
//! A write is attempted once. Failures and timeouts are logged and reported
//! back as a [`RecordOutcome`], never as an error, so callers have nothing to
//! propagate into a response.

use tracing::{debug, warn};

use crate::{connector::StoreConnection, error::StoreError, record::PredictionRecord};

/// What happened to a record handed to [`PredictionLogger::record`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Written to the store
    Stored,
    /// Not written because it was still pending
    Refused,
    /// The write failed; `reason` is a short kind such as `write` or `timeout`
    Failed {
        /// Failure kind
        reason: &'static str,
    },
}

impl RecordOutcome {
    /// Whether the record reached the store
    pub fn is_stored(self) -> bool {
        matches!(self, RecordOutcome::Stored)
    }
}

/// Writes terminal prediction records to the store
#[derive(Debug, Clone)]
pub struct PredictionLogger {
    connection: StoreConnection,
}

impl PredictionLogger {
    /// Create a logger writing through `connection`
    pub fn new(connection: StoreConnection) -> Self {
        Self { connection }
    }

    /// Underlying store connection
    pub fn connection(&self) -> &StoreConnection {
        &self.connection
    }

    /// Persist a record, absorbing any failure
    pub async fn record(&self, record: PredictionRecord) -> RecordOutcome {
        match self.connection.insert(&record).await {
            Ok(()) => {
                debug!(record_id = %record.id, status = %record.status, "Prediction record stored");
                RecordOutcome::Stored
            }
            Err(StoreError::NonTerminal { id }) => {
                warn!(record_id = %id, "Refusing to persist a pending prediction record");
                RecordOutcome::Refused
            }
            Err(e) => {
                warn!(
                    record_id = %record.id,
                    status = %record.status,
                    error = %e,
                    "Failed to persist prediction record"
                );
                RecordOutcome::Failed { reason: e.reason() }
            }
        }
    }
}
