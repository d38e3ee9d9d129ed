// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! HTTP server lifecycle
//!
//! This module provides the main server struct for the spam detection API,
//! including startup of the classifier and prediction store, router
//! configuration, and coordinated graceful shutdown using `CancellationToken`.

use std::{net::SocketAddr, time::Duration};

use axum::{
    Router,
    http::{HeaderName, StatusCode},
    middleware::map_response,
    response::{IntoResponse, Response},
};
use hyper::Request;
use prediction_store::{PredictionLogger, StoreConnection, StoreConnector};
use spam_predictor::SpamPredictor;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{debug, error, info, info_span, warn};

use crate::{
    config::ServerConfig,
    error::{ServerError, ServerResult},
    health::{HealthMonitor, ModelLoadStatus},
    routes::create_routes,
    service::InferenceService,
    state::ServerState,
};

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");
const DEFAULT_GRACEFUL_SHUTDOWN_TIMEOUT_SECONDS: u64 = 30;

/// Shutdown tuning
#[derive(Debug, Clone)]
pub struct ShutdownConfig {
    /// Maximum time to wait for in-flight requests after cancellation
    pub graceful_timeout: Duration,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            graceful_timeout: Duration::from_secs(DEFAULT_GRACEFUL_SHUTDOWN_TIMEOUT_SECONDS),
        }
    }
}

/// Spam detection HTTP server
#[derive(Debug)]
pub struct Server {
    config: ServerConfig,
    router: Router,
    state: ServerState,
    // Closed once the listener has stopped
    store: StoreConnection,
    cancellation_token: CancellationToken,
    graceful_shutdown_config: ShutdownConfig,
}

impl Server {
    /// Start the classifier and the prediction store, then build the server
    ///
    /// Loads the classifier artifact, then connects to the prediction store
    /// with bounded retry.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::ArtifactLoad` if the artifact cannot be loaded, or
    /// `ServerError::StoreConnect` once every store connection attempt failed.
    pub async fn new(config: ServerConfig, shutdown_config: ShutdownConfig) -> ServerResult<Self> {
        info!(
            path = %config.model.artifact_path.display(),
            "Loading classifier artifact"
        );
        let predictor = SpamPredictor::from_artifact(&config.model.artifact_path)
            .await
            .map_err(|source| ServerError::ArtifactLoad { source })?;

        let store = StoreConnector::connect(&config.store)
            .await
            .map_err(|source| ServerError::StoreConnect { source })?;

        Ok(Self::with_components(
            config,
            shutdown_config,
            predictor,
            store,
        ))
    }

    /// Create server from already initialized components for dependency injection
    pub fn with_components(
        config: ServerConfig,
        graceful_shutdown_config: ShutdownConfig,
        predictor: SpamPredictor,
        store: StoreConnection,
    ) -> Self {
        let service = InferenceService::new(
            predictor,
            PredictionLogger::new(store.clone()),
            HealthMonitor::new(ModelLoadStatus::Loaded, store.clone()),
        );

        let cancellation_token = CancellationToken::new();
        let state = ServerState::new(config.clone(), service, cancellation_token.child_token());
        let router = Self::create_router(state.clone());

        Self {
            config,
            router,
            state,
            store,
            cancellation_token,
            graceful_shutdown_config,
        }
    }

    /// Routes wrapped in request-id, tracing, CORS and timeout middleware
    fn create_router(state: ServerState) -> Router {
        let timeout_duration = state.config().timeout_seconds.value();

        let middleware = ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeRequestUuid))
            .layer(
                TraceLayer::new_for_http().make_span_with(|req: &Request<_>| {
                    if let Some(request_id) = req.headers().get(REQUEST_ID_HEADER) {
                        info_span!("http_request", method = %req.method(), uri = %req.uri(), ?request_id)
                    } else {
                        error!("failed to extract id from request");
                        info_span!("http_request", method = %req.method(), uri = %req.uri(), request_id = "unknown")
                    }
                }),
            )
            .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER))
            .layer(CorsLayer::permissive())
            .layer(map_response(json_timeout_body))
            .layer(TimeoutLayer::new(timeout_duration));

        create_routes().layer(middleware).with_state(state)
    }

    /// Serve until SIGINT, SIGTERM or [`Server::shutdown`]
    ///
    /// In-flight requests get `graceful_timeout` to finish, then the
    /// prediction store is closed.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Bind` or `ServerError::Startup` if the listener
    /// cannot be set up, and `ServerError::Shutdown` if serving fails.
    pub async fn run(self) -> ServerResult<()> {
        let (listener, actual_addr) = self.bind().await?;

        info!(
            address = %actual_addr,
            environment = %self.config.environment,
            "Spam detection server starting",
        );

        let signal_token = self.cancellation_token.clone();
        tokio::spawn(async move {
            tokio::select! {
                name = termination_signal() => {
                    warn!(signal = name, "Shutdown signal received, draining requests");
                    signal_token.cancel();
                }
                () = signal_token.cancelled() => {
                    debug!("Shutdown already requested, signal listener exiting");
                }
            }
        });

        let serve_token = self.cancellation_token.clone();
        let serve = axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                serve_token.cancelled().await;
                info!("Draining in-flight requests");
            })
            .into_future();

        let graceful_timeout = self.graceful_shutdown_config.graceful_timeout;
        let drain_deadline = async {
            self.cancellation_token.cancelled().await;
            tokio::time::sleep(graceful_timeout).await;
        };

        let server_result = tokio::select! {
            result = serve => result,
            () = drain_deadline => {
                warn!(
                    timeout_secs = graceful_timeout.as_secs(),
                    "Graceful shutdown timed out, abandoning in-flight requests"
                );
                Ok(())
            }
        };

        self.store.close().await;

        match server_result {
            Ok(()) => {
                info!("Spam detection server stopped");
                Ok(())
            }
            Err(source) => {
                error!(error = %source, "Server stopped with an error");
                Err(ServerError::Shutdown { source })
            }
        }
    }

    /// Bind the configured address, returning the listener and the bound address
    async fn bind(&self) -> ServerResult<(TcpListener, SocketAddr)> {
        let address = self.config.socket_addr();
        let listener = TcpListener::bind(address)
            .await
            .map_err(|source| ServerError::Bind { address, source })?;
        let bound = listener
            .local_addr()
            .map_err(|source| ServerError::Startup { source })?;
        Ok((listener, bound))
    }

    /// Token that stops the server when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    /// Request a graceful shutdown
    pub fn shutdown(&self) {
        info!("Shutdown requested");
        self.cancellation_token.cancel();
    }

    /// Serve in a background task without signal handling
    ///
    /// Returns the bound address and a token that stops the task.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Bind` or `ServerError::Startup` if the listener
    /// cannot be set up.
    pub async fn run_for_testing(self) -> ServerResult<(SocketAddr, CancellationToken)> {
        let (listener, actual_addr) = self.bind().await?;

        let token = self.cancellation_token.child_token();
        let task = token.child_token();
        tokio::spawn(async move {
            let _ = axum::serve(listener, self.router)
                .with_graceful_shutdown(async move { task.cancelled().await })
                .await;
        });

        Ok((actual_addr, token))
    }

    /// Configuration the server was built with
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Shared handler state
    pub fn state(&self) -> &ServerState {
        &self.state
    }

    /// Handle to the prediction store
    pub fn store(&self) -> &StoreConnection {
        &self.store
    }
}

/// Resolves with the name of the first termination signal received
///
/// Never resolves if the handlers cannot be installed; the server can then
/// only be stopped through its cancellation token.
async fn termination_signal() -> &'static str {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => tokio::select! {
                _ = sigterm.recv() => "SIGTERM",
                _ = sigint.recv() => "SIGINT",
            },
            (Err(e), _) | (_, Err(e)) => {
                error!(error = %e, "Failed to install signal handlers");
                std::future::pending().await
            }
        }
    }

    #[cfg(not(unix))]
    {
        match tokio::signal::ctrl_c().await {
            Ok(()) => "CTRL+C",
            Err(e) => {
                error!(error = %e, "Failed to install CTRL+C handler");
                std::future::pending().await
            }
        }
    }
}

/// Give the timeout layer's bare 408 the same JSON error body as other failures
async fn json_timeout_body(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        warn!("request exceeded the configured timeout");
        ServerError::RequestTimeout.into_response()
    } else {
        response
    }
}
