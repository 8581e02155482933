//! 配置模块：分析服务地址、超时与上传限制。
//!
//! Client configuration. Values come from defaults, an optional YAML file, and
//! `RISK_ANALYZER_*` environment variables, in that order.

use crate::pipeline::{validate_prefix, DEFAULT_DATA_PREFIX};
use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5001";
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Names the YAML file `load()` reads.
pub const CONFIG_ENV: &str = "RISK_ANALYZER_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub base_url: String,
    pub stream_path: String,
    pub upload_path: String,
    pub export_path: String,
    /// Whole-request timeout, streamed body included
    pub timeout_ms: u64,
    pub connect_timeout_ms: u64,
    pub proxy_url: Option<String>,
    pub max_upload_bytes: u64,
    pub data_prefix: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            stream_path: "/stream-analysis".to_string(),
            upload_path: "/upload".to_string(),
            export_path: "/export".to_string(),
            timeout_ms: 600_000,
            connect_timeout_ms: 10_000,
            proxy_url: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            data_prefix: DEFAULT_DATA_PREFIX.to_string(),
        }
    }
}

impl AnalyzerConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        Ok(config)
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::configuration_with_context(
                format!("cannot read config file: {e}"),
                ErrorContext::new().with_details(path.display().to_string()),
            )
        })?;
        debug!(path = %path.display(), "loaded analyzer config");
        Self::from_yaml_str(&content)
    }

    /// Defaults, then `RISK_ANALYZER_CONFIG` if set, then env overrides. Validated.
    pub async fn load() -> Result<Self> {
        let base = match env::var(CONFIG_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_path(path.trim()).await?,
            _ => Self::default(),
        };
        let config = base.with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply `RISK_ANALYZER_*` variables. Unparseable numbers are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(url) = env_string("RISK_ANALYZER_BASE_URL") {
            self.base_url = url;
        }
        if let Some(ms) = env_parse("RISK_ANALYZER_HTTP_TIMEOUT_MS") {
            self.timeout_ms = ms;
        }
        if let Some(ms) = env_parse("RISK_ANALYZER_CONNECT_TIMEOUT_MS") {
            self.connect_timeout_ms = ms;
        }
        if let Some(proxy) = env_string("RISK_ANALYZER_PROXY_URL") {
            self.proxy_url = Some(proxy);
        }
        if let Some(bytes) = env_parse("RISK_ANALYZER_MAX_UPLOAD_BYTES") {
            self.max_upload_bytes = bytes;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        let parsed = url::Url::parse(&self.base_url).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid base_url '{}': {e}", self.base_url),
                ErrorContext::new().with_field_path("base_url"),
            )
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::configuration_with_context(
                format!("unsupported scheme '{}'", parsed.scheme()),
                ErrorContext::new().with_field_path("base_url"),
            ));
        }

        for (field, path) in [
            ("stream_path", &self.stream_path),
            ("upload_path", &self.upload_path),
            ("export_path", &self.export_path),
        ] {
            if !path.starts_with('/') {
                return Err(Error::configuration_with_context(
                    format!("{field} must start with '/'"),
                    ErrorContext::new().with_field_path(field),
                ));
            }
        }

        if self.timeout_ms == 0 || self.connect_timeout_ms == 0 {
            return Err(Error::configuration_with_context(
                "timeouts must be positive",
                ErrorContext::new().with_field_path("timeout_ms"),
            ));
        }
        if self.max_upload_bytes == 0 {
            return Err(Error::configuration_with_context(
                "max_upload_bytes must be positive",
                ErrorContext::new().with_field_path("max_upload_bytes"),
            ));
        }

        validate_prefix(&self.data_prefix)?;
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Full URL for an endpoint path.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

fn env_string(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env_string(name).and_then(|v| v.parse::<T>().ok())
}
