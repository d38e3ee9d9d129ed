// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Error handling module
//!
//! This module provides error types for server operations and the single
//! translation of those errors into HTTP responses.

use std::net::SocketAddr;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use prediction_store::StoreError;
use spam_predictor::SpamPredictorError;
use thiserror::Error;

use crate::service::ServiceError;

/// Message returned when the request body has no usable `text` field
pub const INVALID_TEXT_MESSAGE: &str = r#"Invalid input, "text" key is required."#;

/// Error types for server operations
#[derive(Error, Debug)]
pub enum ServerError {
    /// Configuration validation errors
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// The classifier artifact could not be loaded at startup
    #[error("Classifier unavailable: {source}")]
    ArtifactLoad {
        /// Underlying load error
        #[source]
        source: SpamPredictorError,
    },

    /// The prediction store could not be reached at startup
    #[error("Prediction store unavailable: {source}")]
    StoreConnect {
        /// Underlying connection error
        #[source]
        source: StoreError,
    },

    /// Network binding errors
    #[error("Failed to bind to {address}: {source}")]
    Bind {
        /// Socket address that failed to bind
        address: SocketAddr,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Server startup errors
    #[error("Server startup failed: {source}")]
    Startup {
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Server shutdown errors
    #[error("Server shutdown failed: {source}")]
    Shutdown {
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Request body parsed but does not carry a usable `text` field
    #[error("{message}")]
    InvalidInput {
        /// Error message
        message: String,
    },

    /// JSON parsing errors with detailed context
    #[error("Invalid JSON request: {message}")]
    JsonError {
        /// Detailed error message
        message: String,
    },

    /// The request exceeded the configured timeout
    #[error("Request timed out")]
    RequestTimeout,

    /// The classifier failed on a valid request
    #[error("{message}")]
    Prediction {
        /// Error message, `Prediction failed: <cause>`
        message: String,
    },
}

/// Result type for server operations
pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    /// HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::InvalidInput { .. } | ServerError::JsonError { .. } => {
                StatusCode::BAD_REQUEST
            }
            ServerError::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            ServerError::Config { .. }
            | ServerError::ArtifactLoad { .. }
            | ServerError::StoreConnect { .. }
            | ServerError::Bind { .. }
            | ServerError::Startup { .. }
            | ServerError::Shutdown { .. }
            | ServerError::Prediction { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ServiceError> for ServerError {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::Prediction(_) => Self::Prediction {
                message: error.to_string(),
            },
        }
    }
}
