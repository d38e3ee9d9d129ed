// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Server configuration
//!
//! Settings are layered with the `config` crate. Later sources win:
//!
//! 1. built-in defaults
//! 2. `config.json`
//! 3. `config.{environment}.json`
//! 4. `SERVER_*` environment variables, nested keys joined with `__`
//!    (`SERVER_STORE__URI`, `SERVER_MODEL__ARTIFACT_PATH`)
//!
//! The environment is taken from `ENVIRONMENT` when set.

use std::{
    fmt,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
    time::Duration,
};

use anyhow::{Result, anyhow, ensure};
use config::{
    Config, ConfigBuilder, ConfigError, Environment as ConfigEnv, File, builder::DefaultState,
};
use prediction_store::StoreConfig;
use serde::{Deserialize, Deserializer, Serialize, de};

use crate::error::{ServerError, ServerResult};

const ENV_PREFIX: &str = "SERVER";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5001;
const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
const MAX_TIMEOUT_SECONDS: u64 = 300;
const DEFAULT_ARTIFACT_PATH: &str = "assets/models/spam_model.json";

/// Listening port
///
/// Port 0 asks the OS for an ephemeral port and is only accepted in
/// [`Environment::Testing`]; see [`ServerConfig::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerPort(u16);

impl ServerPort {
    /// Wrap a port number
    pub const fn new(port: u16) -> Self {
        Self(port)
    }

    /// Ephemeral port for tests
    pub const fn testing() -> Self {
        Self(0)
    }

    /// Port number
    pub fn value(self) -> u16 {
        self.0
    }

    fn check(self, environment: Environment) -> Result<()> {
        ensure!(
            self.0 != 0 || environment == Environment::Testing,
            "port 0 is only allowed in the testing environment"
        );
        Ok(())
    }
}

impl Default for ServerPort {
    fn default() -> Self {
        Self(DEFAULT_PORT)
    }
}

/// Hard limit on a single request, between 1 and 300 seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeoutSeconds(Duration);

impl TimeoutSeconds {
    /// Validate a timeout given in whole seconds
    ///
    /// # Errors
    ///
    /// Returns an error for 0 or for more than 300 seconds
    pub fn new(seconds: u64) -> Result<Self> {
        ensure!(seconds > 0, "timeout must be at least 1 second");
        ensure!(
            seconds <= MAX_TIMEOUT_SECONDS,
            "timeout cannot exceed {MAX_TIMEOUT_SECONDS} seconds"
        );
        Ok(Self(Duration::from_secs(seconds)))
    }

    /// Short timeout for tests
    pub const fn testing() -> Self {
        Self(Duration::from_secs(5))
    }

    /// Timeout as a duration
    pub fn value(&self) -> Duration {
        self.0
    }
}

impl Default for TimeoutSeconds {
    fn default() -> Self {
        Self(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS))
    }
}

impl<'de> Deserialize<'de> for TimeoutSeconds {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let seconds = u64::deserialize(deserializer)?;
        Self::new(seconds).map_err(|e| de::Error::custom(e.to_string()))
    }
}

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Production deployment
    Production,
    /// Local development
    #[default]
    Development,
    /// Automated tests
    Testing,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Environment::Production => "production",
            Environment::Development => "development",
            Environment::Testing => "testing",
        })
    }
}

/// Location of the trained classifier artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to the JSON classifier artifact
    pub artifact_path: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            artifact_path: PathBuf::from(DEFAULT_ARTIFACT_PATH),
        }
    }
}

/// Complete server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind
    pub host: IpAddr,
    /// Port to bind
    pub port: ServerPort,
    /// Per-request timeout
    pub timeout_seconds: TimeoutSeconds,
    /// Deployment environment
    pub environment: Environment,
    /// Classifier artifact settings
    #[serde(default)]
    pub model: ModelConfig,
    /// Prediction store settings
    #[serde(default)]
    pub store: StoreConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: ServerPort::default(),
            timeout_seconds: TimeoutSeconds::default(),
            environment: Environment::default(),
            model: ModelConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load and validate configuration from files and the environment
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Config` if a source cannot be read or a setting
    /// is invalid.
    pub fn from_env() -> ServerResult<Self> {
        let config = Self::load().map_err(|e| ServerError::Config {
            message: format!("failed to load configuration: {e}"),
        })?;
        config.validate().map_err(|e| ServerError::Config {
            message: format!("invalid configuration: {e}"),
        })?;
        Ok(config)
    }

    /// Merge every configuration source without cross-field validation
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source is malformed or a value has the
    /// wrong type.
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("ENVIRONMENT")
            .ok()
            .map(|name| name.to_lowercase());
        let profile = environment.as_deref().unwrap_or("development");

        let mut builder = Self::with_defaults(Config::builder())?
            .add_source(File::with_name("config.json").required(false))
            .add_source(File::with_name(&format!("config.{profile}.json")).required(false))
            .add_source(
                ConfigEnv::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        if let Some(environment) = environment {
            builder = builder.set_override("environment", environment)?;
        }

        builder.build()?.try_deserialize()
    }

    fn with_defaults(
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let store = StoreConfig::default();

        builder
            .set_default("host", DEFAULT_HOST)?
            .set_default("port", i64::from(DEFAULT_PORT))?
            .set_default("timeout_seconds", DEFAULT_TIMEOUT_SECONDS)?
            .set_default("environment", Environment::default().to_string())?
            .set_default("model.artifact_path", DEFAULT_ARTIFACT_PATH)?
            .set_default("store.uri", store.uri)?
            .set_default("store.max_retries", i64::from(store.max_retries))?
            .set_default("store.retry_delay_ms", store.retry_delay_ms)?
            .set_default("store.operation_timeout_ms", store.operation_timeout_ms)?
            .set_default("store.max_connections", i64::from(store.max_connections))?
            .set_default("store.create_if_missing", store.create_if_missing)
    }

    /// Check constraints that span fields or sections
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid setting
    pub fn validate(&self) -> Result<()> {
        self.port.check(self.environment)?;
        ensure!(
            !self.model.artifact_path.as_os_str().is_empty(),
            "model.artifact_path cannot be empty"
        );
        self.store.validate().map_err(|e| anyhow!(e))
    }

    /// Configuration for tests
    ///
    /// Binds an ephemeral loopback port and uses a single-connection
    /// in-memory store. Point `model.artifact_path` at a test artifact before
    /// starting a server.
    pub fn for_testing() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: ServerPort::testing(),
            timeout_seconds: TimeoutSeconds::testing(),
            environment: Environment::Testing,
            model: ModelConfig::default(),
            store: StoreConfig {
                max_connections: 1,
                ..StoreConfig::for_testing("sqlite::memory:")
            },
        }
    }

    /// Address to bind
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port.value())
    }
}
