// Copyright 2026 Hypermesh Foundation. All rights reserved.
// SAGSIN PathKit - Client Configuration

use serde::{Deserialize, Serialize};

use crate::path_metrics::MetricsParams;
use crate::rwr::RwrParams;

pub const ENV_API_BASE: &str = "SAGSIN_API_BASE";
pub const ENV_POLL_MS: &str = "SAGSIN_POLL_MS";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Everything the client needs that is not part of the node/link snapshot.
///
/// All fields default, so `{}` is a complete document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend root, e.g. `http://localhost:8080`.
    pub api_base: String,
    /// Position polling period for mobile nodes.
    pub poll_interval_ms: u64,
    pub metrics: MetricsParams,
    pub rwr: RwrParams,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:8080".to_string(),
            poll_interval_ms: 2_000,
            metrics: MetricsParams::default(),
            rwr: RwrParams::default(),
        }
    }
}

impl ClientConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overlaid with `SAGSIN_API_BASE` / `SAGSIN_POLL_MS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key/value source.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(base) = lookup(ENV_API_BASE) {
            self.api_base = base;
        }
        if let Some(raw) = lookup(ENV_POLL_MS) {
            self.poll_interval_ms = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("{ENV_POLL_MS}={raw:?} is not an integer")))?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("poll_interval_ms must be > 0".into()));
        }
        if !(0.0..1.0).contains(&self.rwr.restart_prob) {
            return Err(ConfigError::Invalid(format!(
                "rwr.restart_prob must be in [0, 1), got {}",
                self.rwr.restart_prob
            )));
        }
        if self.rwr.attempts == 0 || self.rwr.max_len == 0 {
            return Err(ConfigError::Invalid("rwr.attempts and rwr.max_len must be > 0".into()));
        }
        if self.metrics.packet_bytes == 0 {
            return Err(ConfigError::Invalid("metrics.packet_bytes must be > 0".into()));
        }
        Ok(())
    }

    /// Absolute URL for a backend path such as `/nodes`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}
