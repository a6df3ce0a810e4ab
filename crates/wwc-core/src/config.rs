use std::env;

use reqwest::Url;
use tracing::{debug, info};

use crate::error::ConfigError;

pub const BACKEND_URL_VAR: &str = "BACKEND_URL";
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8001";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the infographic backend, without a trailing slash.
    pub backend_base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_base_url: DEFAULT_BACKEND_URL.to_string(),
        }
    }
}

impl ClientConfig {
    /// Reads `.env` (if present) and the process environment. Called once at startup.
    pub fn load() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => info!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => debug!("No .env file found"),
            Err(e) => return Err(e.into()),
        }

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw = lookup(BACKEND_URL_VAR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());

        let backend_base_url = normalize_base_url(&raw)?;
        info!("Using backend at {}", backend_base_url);

        Ok(Self { backend_base_url })
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.backend_base_url, path.trim_start_matches('/'))
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidBackendUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme `{}`", url.scheme())));
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".into()));
    }

    Ok(raw.trim_end_matches('/').to_string())
}
