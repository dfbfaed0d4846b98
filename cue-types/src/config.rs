//! Configuration for the cue client.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable overriding [`CueConfig::backend_url`].
pub const ENV_BACKEND_URL: &str = "CUE_BACKEND_URL";
/// Environment variable overriding [`CueConfig::default_model`].
pub const ENV_MODEL: &str = "CUE_MODEL";
/// Environment variable overriding [`CueConfig::role`].
pub const ENV_ROLE: &str = "CUE_ROLE";
/// Environment variable overriding [`CueConfig::request_timeout_ms`].
pub const ENV_TIMEOUT_MS: &str = "CUE_TIMEOUT_MS";

/// Static configuration shared by the backend client and the session context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CueConfig {
    /// Base URL of the local backend.
    pub backend_url: String,

    /// Model used when the user has not picked one.
    pub default_model: String,

    /// Persona sent as `role` with every question.
    pub role: String,

    /// Whether answers are kept in the backend's conversation memory.
    pub save_to_context: bool,

    /// Upper bound for a single request, streaming included, in milliseconds.
    pub request_timeout_ms: u64,
}

impl Default for CueConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:5050".into(),
            default_model: "gpt-3.5-turbo".into(),
            role: "data engineer".into(),
            save_to_context: true,
            request_timeout_ms: 120_000,
        }
    }
}

impl CueConfig {
    /// Defaults overlaid with the `CUE_*` process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with whatever `lookup` returns for the `CUE_*` keys.
    ///
    /// Blank values are ignored.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get(ENV_BACKEND_URL) {
            config.backend_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(model) = get(ENV_MODEL) {
            config.default_model = model.trim().to_string();
        }
        if let Some(role) = get(ENV_ROLE) {
            config.role = role.trim().to_string();
        }
        if let Some(raw) = get(ENV_TIMEOUT_MS) {
            config.request_timeout_ms = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or_else(|| ConfigError::Invalid {
                    key: ENV_TIMEOUT_MS.into(),
                    value: raw.clone(),
                })?;
        }
        Ok(config)
    }

    /// The request timeout as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Join an endpoint path onto the backend URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.backend_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_point_at_local_backend() {
        let config = CueConfig::default();
        assert_eq!(config.backend_url, "http://127.0.0.1:5050");
        assert_eq!(config.default_model, "gpt-3.5-turbo");
        assert_eq!(config.role, "data engineer");
        assert!(config.save_to_context);
        assert_eq!(config.request_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn lookup_overrides_defaults() {
        let config = CueConfig::from_lookup(lookup_from(&[
            (ENV_BACKEND_URL, "http://localhost:9000/"),
            (ENV_MODEL, "gpt-4o-mini"),
            (ENV_ROLE, "backend engineer"),
            (ENV_TIMEOUT_MS, "5000"),
        ]))
        .unwrap();
        assert_eq!(config.backend_url, "http://localhost:9000");
        assert_eq!(config.default_model, "gpt-4o-mini");
        assert_eq!(config.role, "backend engineer");
        assert_eq!(config.request_timeout_ms, 5000);
    }

    #[test]
    fn blank_values_are_ignored() {
        let config = CueConfig::from_lookup(lookup_from(&[(ENV_MODEL, "  ")])).unwrap();
        assert_eq!(config.default_model, "gpt-3.5-turbo");
    }

    #[test]
    fn invalid_timeout_is_rejected() {
        let err = CueConfig::from_lookup(lookup_from(&[(ENV_TIMEOUT_MS, "soon")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                key: ENV_TIMEOUT_MS.into(),
                value: "soon".into(),
            }
        );
        assert!(CueConfig::from_lookup(lookup_from(&[(ENV_TIMEOUT_MS, "0")])).is_err());
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let config = CueConfig {
            backend_url: "http://127.0.0.1:5050/".into(),
            ..Default::default()
        };
        assert_eq!(config.endpoint("/ai/stream"), "http://127.0.0.1:5050/ai/stream");
        assert_eq!(config.endpoint("models"), "http://127.0.0.1:5050/models");
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: CueConfig =
            serde_json::from_str(r#"{"default_model": "gpt-4o"}"#).unwrap();
        assert_eq!(config.default_model, "gpt-4o");
        assert_eq!(config.backend_url, "http://127.0.0.1:5050");
    }
}
