//! Endpoint configuration for the Waveport server.
//!
//! Host and port come from `WAVEPORT_API_HOST` / `WAVEPORT_API_PORT`, with
//! fixed fallbacks when unset. The environment is read once, in
//! [`ApiConfig::from_env`] — the client takes an explicit `ApiConfig`, so
//! nothing else in the crate touches global state.

use std::env;

/// Environment variable naming the server host.
pub const ENV_HOST: &str = "WAVEPORT_API_HOST";
/// Environment variable naming the server port.
pub const ENV_PORT: &str = "WAVEPORT_API_PORT";

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 5132;

/// Resolved server endpoint. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ApiConfig {
    /// Resolve host and port from the process environment.
    pub fn from_env() -> Self {
        Self::resolve(env::var(ENV_HOST).ok(), env::var(ENV_PORT).ok())
    }

    /// Resolve an endpoint from optional host/port strings.
    ///
    /// Blank or missing values fall back to the defaults; an unparseable
    /// port also falls back (with a warning) rather than failing — a bad
    /// environment should never make the client unconstructible.
    pub fn resolve(host: Option<String>, port: Option<String>) -> Self {
        let host = match host.map(|h| h.trim().to_string()) {
            Some(h) if !h.is_empty() => h,
            _ => DEFAULT_HOST.to_string(),
        };

        let port = match port.map(|p| p.trim().to_string()) {
            Some(p) if !p.is_empty() => match p.parse::<u16>() {
                Ok(port) => port,
                Err(_) => {
                    tracing::warn!(value = %p, "invalid port, using default {DEFAULT_PORT}");
                    DEFAULT_PORT
                }
            },
            _ => DEFAULT_PORT,
        };

        Self { host, port }
    }

    /// The base URL: `http://{host}:{port}`, never a trailing slash.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}
