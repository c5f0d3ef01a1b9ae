use std::str::FromStr;

use axum::http::HeaderValue;
use cipm_core::access::WorkflowPolicy;

use crate::auth::jwt::JwtConfig;

/// Startup configuration failure. Reported by `main` before the server binds.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set in the environment")]
    Missing(&'static str),

    #[error("{var} has an invalid value '{value}'")]
    Invalid { var: &'static str, value: String },
}

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<HeaderValue>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Upper bound on draining in-flight requests after a shutdown signal
    /// (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// Write-time enforcement switches for the workflow engine.
    pub workflow: WorkflowPolicy,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default                    |
    /// |--------------------------------|----------------------------|
    /// | `HOST`                         | `0.0.0.0`                  |
    /// | `PORT`                         | `3000`                     |
    /// | `CORS_ORIGINS`                 | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`         | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`        | `30`                       |
    /// | `WORKFLOW_ENFORCE_STAGE_GATES` | `true`                     |
    /// | `WORKFLOW_ENFORCE_OWNERSHIP`   | `true`                     |
    ///
    /// See [`JwtConfig::from_env`] for the token settings.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = env_or("PORT", 3000u16)?;

        let cors_origins = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|origin| {
                origin.parse::<HeaderValue>().map_err(|_| ConfigError::Invalid {
                    var: "CORS_ORIGINS",
                    value: origin.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let request_timeout_secs = env_or("REQUEST_TIMEOUT_SECS", 30u64)?;
        let shutdown_timeout_secs = env_or("SHUTDOWN_TIMEOUT_SECS", 30u64)?;

        let jwt = JwtConfig::from_env()?;

        let defaults = WorkflowPolicy::default();
        let workflow = WorkflowPolicy {
            enforce_stage_gates: env_or(
                "WORKFLOW_ENFORCE_STAGE_GATES",
                defaults.enforce_stage_gates,
            )?,
            enforce_ownership: env_or("WORKFLOW_ENFORCE_OWNERSHIP", defaults.enforce_ownership)?,
        };

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt,
            workflow,
        })
    }
}

/// Parse `var` from the environment, falling back to `default` when unset.
pub(crate) fn env_or<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
        Err(_) => Ok(default),
    }
}
