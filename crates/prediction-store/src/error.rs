// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for store operations

use thiserror::Error;
use uuid::Uuid;

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Error types for store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// Invalid store settings
    #[error("Invalid store configuration: {message}")]
    Config {
        /// Description of the invalid setting
        message: String,
    },

    /// Every startup connection attempt failed
    #[error("Failed to connect to store after {attempts} attempt(s): {source}")]
    Connect {
        /// Number of attempts made
        attempts: u32,
        /// Cause of the last failed attempt
        #[source]
        source: sqlx::Error,
    },

    /// A read or ping against the store failed
    #[error("Store query failed: {source}")]
    Query {
        /// Underlying database error
        #[source]
        source: sqlx::Error,
    },

    /// Writing a record failed
    #[error("Store write failed: {source}")]
    Write {
        /// Underlying database error
        #[source]
        source: sqlx::Error,
    },

    /// An operation did not complete within the configured bound
    #[error("Store operation '{operation}' timed out after {timeout_ms} ms")]
    Timeout {
        /// Name of the operation
        operation: &'static str,
        /// Bound that was exceeded
        timeout_ms: u64,
    },

    /// A record was handed over before reaching a terminal status
    #[error("Refusing to persist non-terminal record {id}")]
    NonTerminal {
        /// Record identifier
        id: Uuid,
    },

    /// A stored row could not be decoded
    #[error("Failed to decode stored record: {message}")]
    Decode {
        /// Description of the bad column
        message: String,
    },
}

impl StoreError {
    /// Create a configuration error
    pub fn config<T: ToString>(message: T) -> Self {
        Self::Config {
            message: message.to_string(),
        }
    }

    /// Create a decode error
    pub fn decode<T: ToString>(message: T) -> Self {
        Self::Decode {
            message: message.to_string(),
        }
    }

    /// Short machine-readable kind, used as a metrics label
    pub fn reason(&self) -> &'static str {
        match self {
            StoreError::Config { .. } => "config",
            StoreError::Connect { .. } => "connect",
            StoreError::Query { .. } => "query",
            StoreError::Write { .. } => "write",
            StoreError::Timeout { .. } => "timeout",
            StoreError::NonTerminal { .. } => "non_terminal",
            StoreError::Decode { .. } => "decode",
        }
    }
}
