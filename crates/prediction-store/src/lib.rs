// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Prediction outcome persistence
//!
//! Connects to the SQLite-backed prediction log with a bounded, fixed-delay
//! retry at startup, and writes one record per classification attempt on a
//! best-effort basis. Nothing in this crate can fail an inference request:
//! the [`PredictionLogger`] absorbs every write error and reports it as a
//! [`RecordOutcome`].

pub mod config;
pub mod connector;
pub mod error;
pub mod logger;
pub mod record;

pub use config::StoreConfig;
pub use connector::{StoreConnection, StoreConnector};
pub use error::{StoreError, StoreResult};
pub use logger::{PredictionLogger, RecordOutcome};
pub use record::{PendingPrediction, PredictionRecord, RecordStatus};
