use std::env;
use std::str::FromStr;

use super::types::{ConfigError, Environment, StoreBackend};

const DEFAULT_CORS_ORIGINS: &[&str] = &["http://localhost:5173", "http://localhost:3000"];

/// Trimmed value of `key`; blank counts as unset.
pub(super) fn env_optional(key: &str) -> Option<String> {
    env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

pub(super) fn env_or_default(key: &str, default: &str) -> String {
    env_optional(key).unwrap_or_else(|| default.to_string())
}

pub(super) fn env_flag(key: &str) -> bool {
    env_optional(key).is_some_and(|value| parse_bool(&value))
}

pub(super) fn env_number<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env_optional(key) {
        None => Ok(default),
        Some(value) => {
            value.parse::<T>().map_err(|_| ConfigError::InvalidValue { field: key, value })
        }
    }
}

/// Like `env_number`, but zero is rejected.
pub(super) fn env_positive(key: &'static str, default: usize) -> Result<usize, ConfigError> {
    let parsed = env_number(key, default)?;
    if parsed == 0 {
        return Err(ConfigError::InvalidValue { field: key, value: parsed.to_string() });
    }
    Ok(parsed)
}

/// Accepts a JSON array or a comma separated list. Duplicates are dropped.
pub(super) fn parse_cors_origins(value: Option<String>) -> Result<Vec<String>, ConfigError> {
    let raw = match value {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => return Ok(default_cors_origins()),
    };

    let items: Vec<String> = if raw.trim_start().starts_with('[') {
        serde_json::from_str(&raw).map_err(|_| ConfigError::InvalidCors(raw.clone()))?
    } else {
        raw.split(',').map(str::to_string).collect()
    };

    let mut origins: Vec<String> = Vec::with_capacity(items.len());
    for origin in items {
        let origin = origin.trim().trim_end_matches('/').to_string();
        if !origin.is_empty() && !origins.contains(&origin) {
            origins.push(origin);
        }
    }

    if origins.is_empty() {
        return Ok(default_cors_origins());
    }
    Ok(origins)
}

pub(super) fn parse_bool(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

pub(super) fn parse_environment(value: Option<String>) -> Environment {
    match value.map(|item| item.to_ascii_lowercase()).as_deref() {
        Some("production" | "prod") => Environment::Production,
        Some("staging") => Environment::Staging,
        Some("test" | "testing") => Environment::Test,
        _ => Environment::Development,
    }
}

pub(super) fn parse_store_backend(value: Option<String>) -> Result<StoreBackend, ConfigError> {
    let Some(value) = value else {
        return Ok(StoreBackend::Memory);
    };
    match value.to_ascii_lowercase().as_str() {
        "memory" | "in-memory" => Ok(StoreBackend::Memory),
        "postgres" | "postgresql" | "pg" => Ok(StoreBackend::Postgres),
        _ => Err(ConfigError::InvalidValue { field: "COURSEFLOW_STORE", value }),
    }
}

fn default_cors_origins() -> Vec<String> {
    DEFAULT_CORS_ORIGINS.iter().map(|item| item.to_string()).collect()
}
