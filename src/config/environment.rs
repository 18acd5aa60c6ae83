// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Parses server, database, session, USDA, and label rendering settings from env vars
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration management

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use nutrilog_core::constants::{defaults, ports};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Default USDA `FoodData` Central endpoint
pub const DEFAULT_USDA_BASE_URL: &str = "https://api.nal.usda.gov/fdc/v1";

/// Deployment environment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback to development
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }

    /// Check if this is a development environment
    #[must_use]
    pub const fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Type-safe database location
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseUrl {
    /// `SQLite` database file
    SQLite {
        /// Path of the database file
        path: PathBuf,
    },
    /// In-memory `SQLite` database
    Memory,
}

impl DatabaseUrl {
    /// Parse from a `DATABASE_URL` value
    ///
    /// Bare paths are treated as `SQLite` files.
    ///
    /// # Errors
    ///
    /// Returns an error for non-`SQLite` schemes
    pub fn parse_url(s: &str) -> Result<Self> {
        if s == "sqlite::memory:" || s == ":memory:" {
            return Ok(Self::Memory);
        }
        if let Some(path) = s.strip_prefix("sqlite://").or_else(|| s.strip_prefix("sqlite:")) {
            return Ok(Self::SQLite {
                path: PathBuf::from(path),
            });
        }
        if s.contains("://") {
            bail!("Unsupported database URL scheme: {s}");
        }
        Ok(Self::SQLite {
            path: PathBuf::from(s),
        })
    }

    /// Connection string for `sqlx`
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".into(),
        }
    }

    /// Check if this is an in-memory database
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::SQLite {
            path: PathBuf::from("./data/nutrilog.db"),
        }
    }
}

impl fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_connection_string())
    }
}

/// Session and password settings
#[derive(Clone)]
pub struct AuthConfig {
    /// HS256 signing secret for session tokens
    pub jwt_secret: String,
    /// Session lifetime in hours
    pub session_expiry_hours: i64,
    /// Whether the secret was generated for this process only
    pub ephemeral_secret: bool,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("session_expiry_hours", &self.session_expiry_hours)
            .field("ephemeral_secret", &self.ephemeral_secret)
            .finish()
    }
}

/// USDA `FoodData` Central settings
#[derive(Clone)]
pub struct UsdaConfig {
    /// API key; import and live search are disabled without it
    pub api_key: Option<String>,
    /// Base URL of the API
    pub base_url: String,
}

impl fmt::Debug for UsdaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UsdaConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Nutrition label rendering settings
#[derive(Debug, Clone)]
pub struct LabelConfig {
    /// Typst executable used for PDF output
    pub typst_bin: String,
    /// Upper bound on one render
    pub render_timeout: Duration,
}

/// HTTP layer settings
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,
    /// Request timeout
    pub request_timeout: Duration,
    /// Maximum request body size in bytes
    pub max_body_bytes: usize,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// HTTP port
    pub http_port: u16,
    /// Deployment environment
    pub environment: Environment,
    /// Database location
    pub database_url: DatabaseUrl,
    /// Session settings
    pub auth: AuthConfig,
    /// USDA client settings
    pub usda: UsdaConfig,
    /// Label rendering settings
    pub labels: LabelConfig,
    /// HTTP layer settings
    pub http: HttpConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable has an invalid value, or if `JWT_SECRET`
    /// is missing outside development
    pub fn from_env() -> Result<Self> {
        let environment = Environment::from_str_or_default(&env_var_or("ENVIRONMENT", "development"));

        let (jwt_secret, ephemeral_secret) = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => (secret, false),
            _ if environment.is_production() => {
                bail!("JWT_SECRET must be set in production");
            }
            _ => {
                warn!("JWT_SECRET not set; generated a per-process secret, sessions will not survive a restart");
                (generate_secret(), true)
            }
        };

        let config = Self {
            host: env_var_or("HOST", "0.0.0.0"),
            http_port: env_var_or("HTTP_PORT", &ports::DEFAULT_HTTP_PORT.to_string())
                .parse()
                .context("Invalid HTTP_PORT value")?,
            environment,
            database_url: DatabaseUrl::parse_url(&env_var_or(
                "DATABASE_URL",
                "sqlite:./data/nutrilog.db",
            ))
            .context("Invalid DATABASE_URL value")?,
            auth: AuthConfig {
                jwt_secret,
                session_expiry_hours: env_var_or(
                    "SESSION_EXPIRY_HOURS",
                    &defaults::SESSION_EXPIRY_HOURS.to_string(),
                )
                .parse()
                .context("Invalid SESSION_EXPIRY_HOURS value")?,
                ephemeral_secret,
            },
            usda: UsdaConfig {
                api_key: env::var("USDA_API_KEY").ok().filter(|k| !k.trim().is_empty()),
                base_url: env_var_or("USDA_BASE_URL", DEFAULT_USDA_BASE_URL),
            },
            labels: LabelConfig {
                typst_bin: env_var_or("TYPST_BIN", "typst"),
                render_timeout: Duration::from_secs(
                    env_var_or("LABEL_RENDER_TIMEOUT_SECS", "20")
                        .parse()
                        .context("Invalid LABEL_RENDER_TIMEOUT_SECS value")?,
                ),
            },
            http: HttpConfig {
                cors_origins: parse_origins(&env_var_or("CORS_ORIGINS", "*")),
                request_timeout: Duration::from_secs(
                    env_var_or("REQUEST_TIMEOUT_SECS", "30")
                        .parse()
                        .context("Invalid REQUEST_TIMEOUT_SECS value")?,
                ),
                max_body_bytes: env_var_or("MAX_BODY_BYTES", "2097152")
                    .parse()
                    .context("Invalid MAX_BODY_BYTES value")?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error when a value is out of range
    pub fn validate(&self) -> Result<()> {
        if self.http_port == 0 {
            bail!("HTTP_PORT must be non-zero");
        }
        if self.auth.session_expiry_hours <= 0 {
            bail!("SESSION_EXPIRY_HOURS must be positive");
        }
        if self.auth.jwt_secret.len() < 16 && self.environment.is_production() {
            bail!("JWT_SECRET must be at least 16 characters in production");
        }
        if self.labels.render_timeout.is_zero() {
            bail!("LABEL_RENDER_TIMEOUT_SECS must be positive");
        }
        if self.http.max_body_bytes == 0 {
            bail!("MAX_BODY_BYTES must be positive");
        }
        Ok(())
    }

    /// Human-readable summary with secrets redacted
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "NutriLog Server Configuration:\n\
             - Environment: {}\n\
             - Listen: {}:{}\n\
             - Database: {}\n\
             - Session Expiry: {}h\n\
             - Session Secret: {}\n\
             - USDA Import: {}\n\
             - USDA Base URL: {}\n\
             - Typst: {} (timeout {}s)\n\
             - CORS Origins: {}",
            self.environment,
            self.host,
            self.http_port,
            if self.database_url.is_memory() {
                "SQLite (memory)"
            } else {
                "SQLite"
            },
            self.auth.session_expiry_hours,
            if self.auth.ephemeral_secret {
                "Ephemeral"
            } else {
                "Configured"
            },
            if self.usda.api_key.is_some() {
                "Enabled"
            } else {
                "Disabled"
            },
            self.usda.base_url,
            self.labels.typst_bin,
            self.labels.render_timeout.as_secs(),
            self.http.cors_origins.join(", "),
        )
    }

    /// Configuration for tests: in-memory database and fixed secret
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            host: "127.0.0.1".into(),
            http_port: ports::DEFAULT_HTTP_PORT,
            environment: Environment::Testing,
            database_url: DatabaseUrl::Memory,
            auth: AuthConfig {
                jwt_secret: "test-secret-with-enough-length".into(),
                session_expiry_hours: defaults::SESSION_EXPIRY_HOURS,
                ephemeral_secret: false,
            },
            usda: UsdaConfig {
                api_key: None,
                base_url: DEFAULT_USDA_BASE_URL.into(),
            },
            labels: LabelConfig {
                typst_bin: "typst".into(),
                render_timeout: Duration::from_secs(20),
            },
            http: HttpConfig {
                cors_origins: vec!["*".into()],
                request_timeout: Duration::from_secs(30),
                max_body_bytes: 2 * 1024 * 1024,
            },
        }
    }
}

fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_origins(origins_str: &str) -> Vec<String> {
    if origins_str.trim() == "*" {
        return vec!["*".to_owned()];
    }
    origins_str
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

fn generate_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_environment_parsing() {
        assert_eq!(
            Environment::from_str_or_default("PROD"),
            Environment::Production
        );
        assert_eq!(Environment::from_str_or_default("test"), Environment::Testing);
        assert_eq!(
            Environment::from_str_or_default("whatever"),
            Environment::Development
        );
    }

    #[test]
    fn test_database_url_parsing() {
        let file = DatabaseUrl::parse_url("sqlite:./data/nutrilog.db").unwrap();
        assert_eq!(file.to_connection_string(), "sqlite:./data/nutrilog.db");
        assert!(DatabaseUrl::parse_url("sqlite::memory:").unwrap().is_memory());
        assert!(matches!(
            DatabaseUrl::parse_url("./plain.db").unwrap(),
            DatabaseUrl::SQLite { .. }
        ));
        assert!(DatabaseUrl::parse_url("postgresql://localhost/db").is_err());
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(parse_origins("*"), vec!["*"]);
        assert_eq!(
            parse_origins("http://localhost:3000, https://app.example.com"),
            vec!["http://localhost:3000", "https://app.example.com"]
        );
    }

    #[test]
    #[serial]
    fn test_from_env_defaults_in_development() {
        for key in [
            "ENVIRONMENT",
            "JWT_SECRET",
            "HTTP_PORT",
            "DATABASE_URL",
            "USDA_API_KEY",
            "SESSION_EXPIRY_HOURS",
            "LABEL_RENDER_TIMEOUT_SECS",
        ] {
            env::remove_var(key);
        }
        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.http_port, 8081);
        assert_eq!(config.host, "0.0.0.0");
        assert!(config.auth.ephemeral_secret);
        assert_eq!(config.auth.jwt_secret.len(), 64);
        assert!(config.usda.api_key.is_none());
        assert_eq!(config.labels.render_timeout, Duration::from_secs(20));
    }

    #[test]
    #[serial]
    fn test_from_env_requires_secret_in_production() {
        env::set_var("ENVIRONMENT", "production");
        env::remove_var("JWT_SECRET");
        assert!(ServerConfig::from_env().is_err());

        env::set_var("JWT_SECRET", "a-production-secret-value");
        let config = ServerConfig::from_env().unwrap();
        assert!(!config.auth.ephemeral_secret);
        assert!(!config.summary().contains("a-production-secret-value"));

        env::remove_var("ENVIRONMENT");
        env::remove_var("JWT_SECRET");
    }

    #[test]
    #[serial]
    fn test_invalid_port_is_rejected() {
        env::set_var("HTTP_PORT", "not-a-port");
        assert!(ServerConfig::from_env().is_err());
        env::remove_var("HTTP_PORT");
    }
}
