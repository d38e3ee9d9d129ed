// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Test fixtures for end-to-end server tests
//!
//! Provides a small trained classifier artifact and helpers that start a real
//! server on an ephemeral port.

use std::net::SocketAddr;

use api::{Server, ServerConfig, ShutdownConfig};
use prediction_store::StoreConnection;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

/// Two-class artifact over ten stemmed terms.
///
/// Spam terms carry 0.18 of the spam class mass and 0.02 of the ham class
/// mass, ham terms the reverse. Priors are 0.6 ham and 0.4 spam.
pub const SAMPLE_ARTIFACT: &str = r#"{
    "format_version": 1,
    "classes": ["ham", "spam"],
    "vocabulary": {
        "win": 0, "free": 1, "prize": 2, "cash": 3, "claim": 4,
        "meet": 5, "lunch": 6, "tomorrow": 7, "call": 8, "home": 9
    },
    "idf": [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
    "class_log_prior": [-0.5108256237659907, -0.916290731874155],
    "feature_log_prob": [
        [-3.912023005428146, -3.912023005428146, -3.912023005428146, -3.912023005428146, -3.912023005428146,
         -1.7147984280919266, -1.7147984280919266, -1.7147984280919266, -1.7147984280919266, -1.7147984280919266],
        [-1.7147984280919266, -1.7147984280919266, -1.7147984280919266, -1.7147984280919266, -1.7147984280919266,
         -3.912023005428146, -3.912023005428146, -3.912023005428146, -3.912023005428146, -3.912023005428146]
    ],
    "sublinear_tf": false,
    "norm": "l2"
}"#;

/// A running test server and the resources it borrows
pub struct TestServer {
    pub addr: SocketAddr,
    pub store: StoreConnection,
    pub token: CancellationToken,
    // Holds the artifact directory for the lifetime of the server
    _dir: TempDir,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Writes [`SAMPLE_ARTIFACT`] into a fresh directory and points a testing
/// configuration at it
pub async fn config_with_artifact() -> (ServerConfig, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("spam_model.json");
    tokio::fs::write(&path, SAMPLE_ARTIFACT)
        .await
        .expect("Failed to write artifact");

    let mut config = ServerConfig::for_testing();
    config.model.artifact_path = path;
    (config, dir)
}

/// Start a server with the sample artifact and an in-memory store
pub async fn start_server() -> TestServer {
    let (config, dir) = config_with_artifact().await;

    let server = Server::new(config, ShutdownConfig::default())
        .await
        .expect("Failed to create server");
    let store = server.store().clone();

    let (addr, token) = server
        .run_for_testing()
        .await
        .expect("Failed to start test server");

    TestServer {
        addr,
        store,
        token,
        _dir: dir,
    }
}
