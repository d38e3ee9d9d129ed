// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Spam Detection API Server
//!
//! Real-time spam/ham text classification over HTTP.

use anyhow::Result;
use api::{Server, ServerConfig, ShutdownConfig};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting spam detection server");

    let config = ServerConfig::from_env()?;

    let server = Server::new(config, ShutdownConfig::default())
        .await
        .inspect_err(|e| error!(error = %e, "Startup failed"))?;

    // NOTE: the `#[tokio::main]` task does not run a worker future, we must spawn
    tokio::spawn(async move { server.run().await }).await??;

    Ok(())
}
