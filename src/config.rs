//! Client configuration
//!
//! Shared node configuration is an explicit value passed into constructors,
//! never ambient global state. Per-submission knobs live in [`SubmitOptions`]
//! so tests and impatient callers can use short intervals.

use serde::Deserialize;
use std::time::Duration;

use crate::error::{ClientError, ClientResult};

/// Default block tag used for account-state queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockTag {
    #[default]
    Latest,
    Earliest,
    Pending,
}

impl BlockTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockTag::Latest => "latest",
            BlockTag::Earliest => "earliest",
            BlockTag::Pending => "pending",
        }
    }
}

/// Shared client configuration: node endpoint and default block tag
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// HTTP JSON-RPC endpoint
    pub url: String,
    /// Block tag applied to account-state queries that take one
    pub default_block_tag: BlockTag,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8545".to_string(),
            default_block_tag: BlockTag::Latest,
        }
    }
}

impl ClientConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> ClientResult<()> {
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(ClientError::Validation(format!(
                "endpoint URL must start with http:// or https://, got {}",
                self.url
            )));
        }
        Ok(())
    }
}

/// Per-submission options
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SubmitOptions {
    /// Skip automatic gas pricing resolution for unsigned requests
    pub skip_pricing: bool,
    /// Interval between receipt poll attempts
    pub poll_interval_ms: u64,
    /// Wall-clock deadline for receipt polling
    pub poll_timeout_ms: u64,
    /// Interval between block-height checks while watching confirmations
    pub confirmation_poll_interval_ms: u64,
}

impl Default for SubmitOptions {
    fn default() -> Self {
        Self {
            skip_pricing: false,
            poll_interval_ms: 1_000,
            poll_timeout_ms: 120_000,
            confirmation_poll_interval_ms: 1_000,
        }
    }
}

impl SubmitOptions {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }

    pub fn confirmation_poll_interval(&self) -> Duration {
        Duration::from_millis(self.confirmation_poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let options = SubmitOptions::default();
        assert!(!options.skip_pricing);
        assert_eq!(options.poll_interval(), Duration::from_secs(1));
        assert_eq!(options.poll_timeout(), Duration::from_secs(120));

        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_block_tag.as_str(), "latest");
    }

    #[test]
    fn rejects_non_http_endpoint() {
        let config = ClientConfig::new("ws://localhost:8546");
        assert!(matches!(config.validate(), Err(ClientError::Validation(_))));
    }

    #[test]
    fn deserializes_from_toml() {
        let config: ClientConfig = toml::from_str(
            r#"
            url = "https://rpc.example.com"
            default_block_tag = "pending"
            "#,
        )
        .unwrap();
        assert_eq!(config.url, "https://rpc.example.com");
        assert_eq!(config.default_block_tag, BlockTag::Pending);

        let options: SubmitOptions = toml::from_str("poll_interval_ms = 50").unwrap();
        assert_eq!(options.poll_interval_ms, 50);
        assert_eq!(options.poll_timeout_ms, 120_000);
    }
}
