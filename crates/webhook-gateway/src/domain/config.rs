//! Gateway configuration with validation.
//!
//! Loaded once from the environment at startup and never mutated.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use meeting_ingest::{EnvelopeFormat, PipelineConfig, PostgresSettings};

/// Main gateway configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// HTTP server configuration
    pub http: HttpConfig,
    /// Request limits
    pub limits: LimitsConfig,
    /// Persistence backend
    pub storage: StorageConfig,
    /// Pipeline secrets and envelope settings
    pub pipeline: PipelineConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Bind address
    pub host: IpAddr,
    /// Bind port
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
        }
    }
}

/// Request limits
#[derive(Debug, Clone)]
pub struct LimitsConfig {
    /// Deadline for one webhook delivery
    pub request_timeout: Duration,
    /// Maximum accepted body size
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_millis(10_000),
            max_body_bytes: 64 * 1024,
        }
    }
}

/// Which store implementation to wire in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// PostgreSQL tables
    Postgres,
    /// Process memory; lost on restart
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" | "in-memory" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

/// Persistence configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Selected backend
    pub backend: StorageBackend,
    /// Connection settings when `backend` is PostgreSQL
    pub postgres: PostgresSettings,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Postgres,
            postgres: PostgresSettings::default(),
        }
    }
}

impl GatewayConfig {
    /// Load from process environment and validate.
    ///
    /// # Environment Variables
    ///
    /// - `WEBHOOK_SECRET`: sender secret (required)
    /// - `SHARED_SECRET` or `AUDIT_SMS_KEY`: key-derivation secret (required)
    /// - `KNOWN_GROUPS`: comma-separated group ids
    /// - `ROOT_KEY_FALLBACK`: also try the root key (default: false)
    /// - `ENVELOPE_FORMATS`: `compact`, `addressed` (default: compact)
    /// - `HTTP_HOST` / `PORT`: bind address (default: 0.0.0.0:8080)
    /// - `REQUEST_TIMEOUT_MS`: per-request deadline (default: 10000)
    /// - `MAX_BODY_BYTES`: body limit (default: 65536)
    /// - `STORAGE_BACKEND`: `postgres` or `memory` (default: postgres)
    /// - `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASS`, `DB_NAME`, `DB_POOL_SIZE`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup and validate.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let webhook_secret = var("WEBHOOK_SECRET").ok_or(ConfigError::Missing("WEBHOOK_SECRET"))?;
        let shared_secret = var("SHARED_SECRET")
            .or_else(|| var("AUDIT_SMS_KEY"))
            .ok_or(ConfigError::Missing("SHARED_SECRET"))?;

        let known_groups = var("KNOWN_GROUPS")
            .map(|v| split_list(&v))
            .unwrap_or_default();

        let envelope_formats = match var("ENVELOPE_FORMATS") {
            Some(v) => split_list(&v)
                .iter()
                .map(|f| f.parse::<EnvelopeFormat>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| ConfigError::InvalidValue {
                    name: "ENVELOPE_FORMATS",
                    value: v.clone(),
                })?,
            None => vec![EnvelopeFormat::Compact],
        };

        let pipeline = PipelineConfig {
            webhook_secret,
            shared_secret,
            known_groups,
            root_key_fallback: parse_var(&var, "ROOT_KEY_FALLBACK", false)?,
            envelope_formats,
        };

        let defaults = PostgresSettings::default();
        let postgres = PostgresSettings {
            host: var("DB_HOST").unwrap_or(defaults.host),
            port: parse_var(&var, "DB_PORT", defaults.port)?,
            database: var("DB_NAME").unwrap_or(defaults.database),
            username: var("DB_USER").unwrap_or(defaults.username),
            password: lookup("DB_PASS").unwrap_or(defaults.password),
            max_pool_size: parse_var(&var, "DB_POOL_SIZE", defaults.max_pool_size)?,
        };

        let config = Self {
            http: HttpConfig {
                host: parse_var(&var, "HTTP_HOST", HttpConfig::default().host)?,
                port: parse_var(&var, "PORT", HttpConfig::default().port)?,
            },
            limits: LimitsConfig {
                request_timeout: Duration::from_millis(parse_var(
                    &var,
                    "REQUEST_TIMEOUT_MS",
                    10_000u64,
                )?),
                max_body_bytes: parse_var(
                    &var,
                    "MAX_BODY_BYTES",
                    LimitsConfig::default().max_body_bytes,
                )?,
            },
            storage: StorageConfig {
                backend: parse_var(&var, "STORAGE_BACKEND", StorageBackend::Postgres)?,
                postgres,
            },
            pipeline,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pipeline.validate()?;

        if self.limits.request_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "request timeout cannot be 0".into(),
            ));
        }

        if self.limits.max_body_bytes == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_body_bytes cannot be 0".into(),
            ));
        }

        if self.storage.backend == StorageBackend::Postgres
            && self.storage.postgres.max_pool_size == 0
        {
            return Err(ConfigError::InvalidLimit("DB pool size cannot be 0".into()));
        }

        Ok(())
    }

    /// Get HTTP server bind address
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http.host, self.http.port)
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_var<T, V>(var: &V, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    V: Fn(&str) -> Option<String>,
{
    match var(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value: raw }),
        None => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Required variable not set
    #[error("{0} is required")]
    Missing(&'static str),
    /// Variable set to something unparseable
    #[error("invalid value for {name}: '{value}'")]
    InvalidValue {
        /// Variable name
        name: &'static str,
        /// Offending value
        value: String,
    },
    /// Invalid size or count limit
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    /// Invalid timeout value
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    /// Pipeline settings rejected
    #[error(transparent)]
    Pipeline(#[from] meeting_ingest::ConfigError),
}
