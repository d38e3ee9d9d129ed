// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Store connection establishment and operations
//!
//! [`StoreConnector::connect`] opens the SQLite pool with a bounded number of
//! fixed-delay attempts, each verified with a `SELECT 1` ping, and makes sure
//! the `prediction_logs` table exists. The resulting [`StoreConnection`] wraps
//! every operation in the configured timeout.

use std::{
    future::Future,
    str::FromStr,
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
    time::Duration,
};

use chrono::{DateTime, SecondsFormat, Utc};
use shared_types::SpamLabel;
use sqlx::{
    Row, SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
};
use tokio_retry::{Retry, strategy::FixedInterval};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::{
    config::StoreConfig,
    error::{StoreError, StoreResult},
    record::{PredictionRecord, RecordStatus},
};

const CREATE_PREDICTION_LOGS: &str = r"
    CREATE TABLE IF NOT EXISTS prediction_logs (
        id TEXT PRIMARY KEY,
        timestamp TEXT NOT NULL,
        input_text TEXT NOT NULL,
        status TEXT NOT NULL,
        prediction TEXT,
        confidence REAL,
        processing_time REAL NOT NULL,
        error TEXT
    )
";

const INSERT_PREDICTION_LOG: &str = r"
    INSERT INTO prediction_logs
        (id, timestamp, input_text, status, prediction, confidence, processing_time, error)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?)
";

const SELECT_RECENT_PREDICTION_LOGS: &str = r"
    SELECT id, timestamp, input_text, status, prediction, confidence, processing_time, error
    FROM prediction_logs
    ORDER BY timestamp DESC
    LIMIT ?
";

/// Opens store connections with startup retry
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreConnector;

impl StoreConnector {
    /// Connect to the store described by `config`
    ///
    /// Makes at most `config.max_retries` attempts with `config.retry_delay()`
    /// between them. Each failed attempt is logged at warn level.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Config` for unusable settings, or
    /// `StoreError::Connect` carrying the last cause once all attempts fail
    #[instrument(skip_all, fields(uri = %config.uri, max_attempts = config.max_retries))]
    pub async fn connect(config: &StoreConfig) -> StoreResult<StoreConnection> {
        config.validate()?;

        let options = SqliteConnectOptions::from_str(&config.uri)
            .map_err(|e| StoreError::config(format!("invalid store uri '{}': {e}", config.uri)))?
            .create_if_missing(config.create_if_missing);

        let max_attempts = config.max_retries;
        let max_connections = config.max_connections;
        let acquire_timeout = config.operation_timeout();

        // The first attempt is immediate, the strategy only yields the delays
        let strategy =
            FixedInterval::new(config.retry_delay()).take(max_attempts.saturating_sub(1) as usize);
        let attempts = Arc::new(AtomicU32::new(0));

        let pool = Retry::spawn(strategy, || {
            let options = options.clone();
            let attempts = Arc::clone(&attempts);

            async move {
                let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                debug!(attempt, max_attempts, "Connecting to prediction store");

                Self::open(options, max_connections, acquire_timeout)
                    .await
                    .inspect_err(|e| {
                        warn!(
                            attempt,
                            max_attempts,
                            error = %e,
                            "Prediction store connection attempt failed"
                        );
                    })
            }
        })
        .await
        .map_err(|source| StoreError::Connect {
            attempts: attempts.load(Ordering::SeqCst),
            source,
        })?;

        info!(
            attempts = attempts.load(Ordering::SeqCst),
            "Connected to prediction store"
        );

        Ok(StoreConnection::new(pool, config.operation_timeout()))
    }

    /// One connection attempt: open, ping, ensure schema
    async fn open(
        options: SqliteConnectOptions,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<SqlitePool, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect_with(options)
            .await?;

        let prepared = async {
            sqlx::query("SELECT 1").execute(&pool).await?;
            sqlx::query(CREATE_PREDICTION_LOGS).execute(&pool).await?;
            Ok::<_, sqlx::Error>(())
        }
        .await;

        if let Err(e) = prepared {
            pool.close().await;
            return Err(e);
        }

        Ok(pool)
    }
}

/// Live handle to the prediction store
///
/// Cloning is cheap and shares the underlying pool.
#[derive(Debug, Clone)]
pub struct StoreConnection {
    pool: SqlitePool,
    operation_timeout: Duration,
}

impl StoreConnection {
    /// Wrap an existing pool
    pub fn new(pool: SqlitePool, operation_timeout: Duration) -> Self {
        Self {
            pool,
            operation_timeout,
        }
    }

    /// Bound applied to each operation
    pub fn operation_timeout(&self) -> Duration {
        self.operation_timeout
    }

    /// Ping the store with `SELECT 1`
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Query` if the ping fails or `StoreError::Timeout`
    /// if it does not finish in time
    #[instrument(skip(self))]
    pub async fn ping(&self) -> StoreResult<()> {
        self.bounded(
            "ping",
            async { sqlx::query("SELECT 1").execute(&self.pool).await.map(|_| ()) },
            |source| StoreError::Query { source },
        )
        .await
    }

    /// Append a record to the prediction log
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NonTerminal` for pending records,
    /// `StoreError::Write` if the insert fails or `StoreError::Timeout`
    #[instrument(skip_all, fields(record_id = %record.id, status = %record.status))]
    pub async fn insert(&self, record: &PredictionRecord) -> StoreResult<()> {
        if !record.status.is_terminal() {
            return Err(StoreError::NonTerminal { id: record.id });
        }

        let id = record.id.to_string();
        let timestamp = record.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true);

        self.bounded(
            "insert",
            async {
                sqlx::query(INSERT_PREDICTION_LOG)
                    .bind(id.as_str())
                    .bind(timestamp.as_str())
                    .bind(record.input_text.as_str())
                    .bind(record.status.as_str())
                    .bind(record.prediction.map(SpamLabel::as_str))
                    .bind(record.confidence)
                    .bind(record.processing_time_seconds)
                    .bind(record.error.as_deref())
                    .execute(&self.pool)
                    .await
                    .map(|_| ())
            },
            |source| StoreError::Write { source },
        )
        .await
    }

    /// Most recent records, newest first
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Query`, `StoreError::Timeout` or
    /// `StoreError::Decode` if a stored row is malformed
    pub async fn recent(&self, limit: u32) -> StoreResult<Vec<PredictionRecord>> {
        let rows = self
            .bounded(
                "recent",
                sqlx::query(SELECT_RECENT_PREDICTION_LOGS)
                    .bind(i64::from(limit))
                    .fetch_all(&self.pool),
                |source| StoreError::Query { source },
            )
            .await?;

        rows.iter().map(decode_record).collect()
    }

    /// Close the pool; later operations fail
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Whether [`StoreConnection::close`] has been called
    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    async fn bounded<T, F>(
        &self,
        operation: &'static str,
        future: F,
        on_error: fn(sqlx::Error) -> StoreError,
    ) -> StoreResult<T>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.operation_timeout, future).await {
            Ok(result) => result.map_err(on_error),
            Err(_) => Err(StoreError::Timeout {
                operation,
                timeout_ms: u64::try_from(self.operation_timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }
}

fn decode_record(row: &SqliteRow) -> StoreResult<PredictionRecord> {
    let id: String = row.try_get("id").map_err(StoreError::decode)?;
    let timestamp: String = row.try_get("timestamp").map_err(StoreError::decode)?;
    let status: String = row.try_get("status").map_err(StoreError::decode)?;
    let prediction: Option<String> = row.try_get("prediction").map_err(StoreError::decode)?;

    Ok(PredictionRecord {
        id: Uuid::parse_str(&id).map_err(StoreError::decode)?,
        timestamp: DateTime::parse_from_rfc3339(&timestamp)
            .map_err(StoreError::decode)?
            .with_timezone(&Utc),
        input_text: row.try_get("input_text").map_err(StoreError::decode)?,
        status: status.parse::<RecordStatus>().map_err(StoreError::decode)?,
        prediction: prediction
            .map(|label| label.parse::<SpamLabel>())
            .transpose()
            .map_err(StoreError::decode)?,
        confidence: row.try_get("confidence").map_err(StoreError::decode)?,
        processing_time_seconds: row.try_get("processing_time").map_err(StoreError::decode)?,
        error: row.try_get("error").map_err(StoreError::decode)?,
    })
}
