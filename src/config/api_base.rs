//! Backend base URL resolution.
//!
//! Precedence, highest first:
//! 1. `PLUSVALIA_API_BASE_URL`
//! 2. `--api-base` on the command line
//! 3. `api.base_url` in the config file
//! 4. proxy mode (`PLUSVALIA_API_PROXY` / `api.proxy`): relative paths behind a reverse proxy
//! 5. production (`PLUSVALIA_ENV` / `api.environment`): relative, same origin
//! 6. development: `http://localhost:8000`

use crate::utils::error::{Result, SimError};
use crate::utils::validation::validate_url;
use serde::{Deserialize, Serialize};

pub const BASE_URL_ENV: &str = "PLUSVALIA_API_BASE_URL";
pub const PROXY_ENV: &str = "PLUSVALIA_API_PROXY";
pub const ENVIRONMENT_ENV: &str = "PLUSVALIA_ENV";
pub const DEVELOPMENT_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Some(Self::Production),
            "development" | "dev" => Some(Self::Development),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiBase {
    Absolute(String),
    /// Paths are issued relative to whatever origin fronts the backend.
    Relative,
}

/// Non-environment inputs to the resolution.
#[derive(Debug, Clone, Default)]
pub struct BaseUrlSources {
    pub cli_override: Option<String>,
    pub configured: Option<String>,
    pub proxy: bool,
    pub environment: Environment,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn truthy(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

impl ApiBase {
    pub fn resolve<F>(sources: &BaseUrlSources, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = non_empty(env(BASE_URL_ENV)) {
            return Self::Absolute(url);
        }
        if let Some(url) = non_empty(sources.cli_override.clone()) {
            return Self::Absolute(url);
        }
        if let Some(url) = non_empty(sources.configured.clone()) {
            return Self::Absolute(url);
        }

        let proxy = env(PROXY_ENV).map(|v| truthy(&v)).unwrap_or(sources.proxy);
        if proxy {
            return Self::Relative;
        }

        let environment = env(ENVIRONMENT_ENV)
            .and_then(|v| Environment::parse(&v))
            .unwrap_or(sources.environment);
        match environment {
            Environment::Production => Self::Relative,
            Environment::Development => Self::Absolute(DEVELOPMENT_BASE_URL.to_string()),
        }
    }

    pub fn from_process_env(sources: &BaseUrlSources) -> Self {
        Self::resolve(sources, |key| std::env::var(key).ok())
    }

    /// Turns the base into an absolute prefix without a trailing slash.
    /// A relative base needs the origin that serves `/api`.
    pub fn to_absolute(&self, origin: Option<&str>) -> Result<String> {
        let base = match self {
            Self::Absolute(url) => url.as_str(),
            Self::Relative => origin.filter(|o| !o.trim().is_empty()).ok_or_else(|| {
                SimError::config(
                    "relative API base (proxy/production) requires api.origin to be set",
                )
            })?,
        };
        let trimmed = base.trim().trim_end_matches('/');
        validate_url("api.base_url", trimmed)?;
        Ok(trimmed.to_string())
    }
}
