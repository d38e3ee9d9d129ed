// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Store connection settings

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Connection, retry and timeout settings for the prediction store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite connection URI, e.g. `sqlite://spam_detector.db`
    pub uri: String,
    /// Total connection attempts at startup, including the first
    pub max_retries: u32,
    /// Fixed delay between startup connection attempts, in milliseconds
    pub retry_delay_ms: u64,
    /// Upper bound on any single store operation, in milliseconds
    pub operation_timeout_ms: u64,
    /// Maximum pooled connections
    pub max_connections: u32,
    /// Create the database file if it does not exist
    pub create_if_missing: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            uri: "sqlite://spam_detector.db".to_string(),
            max_retries: 5,
            retry_delay_ms: 2000,
            operation_timeout_ms: 5000,
            max_connections: 5,
            create_if_missing: true,
        }
    }
}

impl StoreConfig {
    /// Settings for tests: the given URI with fast retries and short timeouts
    pub fn for_testing(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            max_retries: 2,
            retry_delay_ms: 10,
            operation_timeout_ms: 1000,
            max_connections: 2,
            create_if_missing: true,
        }
    }

    /// Delay between startup connection attempts
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Bound applied to each store operation
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }

    /// Check the settings are usable
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Config` describing the first invalid field
    pub fn validate(&self) -> StoreResult<()> {
        if self.uri.trim().is_empty() {
            return Err(StoreError::config("store uri cannot be empty"));
        }
        if self.max_retries == 0 {
            return Err(StoreError::config("max_retries must be at least 1"));
        }
        if self.operation_timeout_ms == 0 {
            return Err(StoreError::config(
                "operation_timeout_ms must be greater than 0",
            ));
        }
        if self.max_connections == 0 {
            return Err(StoreError::config("max_connections must be at least 1"));
        }
        Ok(())
    }
}
