// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Spam Detection API Server Implementation
//!
//! This crate provides the HTTP server for real-time spam/ham text
//! classification, built with Axum around a classifier loaded once at startup
//! and a best-effort prediction log.
//!
//! # Module Structure
//!
//! - [`config`]: Server configuration and environment management with hierarchical loading
//! - [`error`]: Error types and HTTP response handling with proper status codes
//! - [`service`]: The request pipeline: normalize, classify, persist
//! - [`health`]: Fresh health reports from the classifier status and a store ping
//! - [`state`]: Shared application state with cancellation token support
//! - [`server`]: Startup, lifecycle and coordinated shutdown
//! - [`routes`]: Route configuration and HTTP request handlers
//! - [`metrics`]: Prometheus counters and histograms
//! - [`openapi`]: `OpenAPI` specification and Swagger UI endpoints
//!
//! # Startup
//!
//! [`Server::new`] loads the classifier artifact and connects to the
//! prediction store with bounded retry. Either failure is returned before a
//! listener is bound.

pub mod config;
pub mod docs;
pub mod error;
pub mod extractors;
pub mod health;
pub mod metrics;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod service;
pub mod state;

pub use config::{Environment, ModelConfig, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use health::{HealthMonitor, HealthReport, HealthState, ModelLoadStatus, StoreStatus};
pub use server::{Server, ShutdownConfig};
pub use service::{InferenceService, PredictionOutcome, ServiceError};
pub use state::ServerState;
