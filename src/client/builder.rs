use crate::client::core::AnalyzerClient;
use crate::config::AnalyzerConfig;
use crate::transport::HttpTransport;
use crate::Result;
use std::sync::Arc;
use std::time::Duration;

/// Builder for [`AnalyzerClient`].
///
/// Without an explicit [`config`](Self::config) the builder starts from defaults with
/// `RISK_ANALYZER_*` environment overrides applied. Individual setters win over both.
#[derive(Debug, Default)]
pub struct AnalyzerClientBuilder {
    config: Option<AnalyzerConfig>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    proxy_url: Option<String>,
    max_upload_bytes: Option<u64>,
    data_prefix: Option<String>,
}

impl AnalyzerClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: AnalyzerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Override the service base URL (mock servers in tests, staging hosts).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Whole-request timeout, including the time spent streaming the body.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn proxy_url(mut self, proxy_url: impl Into<String>) -> Self {
        self.proxy_url = Some(proxy_url.into());
        self
    }

    pub fn max_upload_bytes(mut self, bytes: u64) -> Self {
        self.max_upload_bytes = Some(bytes);
        self
    }

    pub fn data_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.data_prefix = Some(prefix.into());
        self
    }

    pub fn build(self) -> Result<AnalyzerClient> {
        let mut config = self
            .config
            .unwrap_or_else(|| AnalyzerConfig::default().with_env_overrides());

        if let Some(url) = self.base_url {
            config.base_url = url;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        }
        if let Some(proxy) = self.proxy_url {
            config.proxy_url = Some(proxy);
        }
        if let Some(bytes) = self.max_upload_bytes {
            config.max_upload_bytes = bytes;
        }
        if let Some(prefix) = self.data_prefix {
            config.data_prefix = prefix;
        }
        config.validate()?;

        let transport = Arc::new(HttpTransport::new(&config)?);
        Ok(AnalyzerClient { config, transport })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_override_config() {
        let client = AnalyzerClientBuilder::new()
            .config(AnalyzerConfig::default())
            .base_url("http://localhost:9000")
            .timeout(Duration::from_millis(1500))
            .max_upload_bytes(1024)
            .build()
            .unwrap();
        assert_eq!(client.config().base_url, "http://localhost:9000");
        assert_eq!(client.config().timeout(), Duration::from_millis(1500));
        assert_eq!(client.config().max_upload_bytes, 1024);
    }

    #[test]
    fn invalid_settings_fail_to_build() {
        let result = AnalyzerClientBuilder::new()
            .config(AnalyzerConfig::default())
            .base_url("::nope::")
            .build();
        assert!(result.is_err());

        let result = AnalyzerClientBuilder::new()
            .config(AnalyzerConfig::default())
            .data_prefix("data\r")
            .build();
        assert!(result.is_err());
    }
}
