//! Chain configuration for the Antelope SDK

use std::time::Duration;

use crate::constants::{DEFAULT_BLOCKS_BEHIND, DEFAULT_EXPIRE_SECONDS};
use crate::error::Error;

/// Configuration shared by the processor and the HTTP provider.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// Node base URL, e.g. `https://my.node:8888`.
    pub node_url: String,
    /// Transaction expiration window past the head block time, in seconds.
    pub expire_seconds: u32,
    /// Blocks behind head used for TAPOS when not anchored to the last
    /// irreversible block.
    pub blocks_behind: u16,
    /// Anchor TAPOS to the last irreversible block (safer) instead of
    /// `head - blocks_behind` (faster confirmation feedback).
    pub use_last_irreversible: bool,
    /// `max_net_usage_words` transaction header field (0 = no cap).
    pub max_net_usage_words: u32,
    /// `max_cpu_usage_ms` transaction header field (0 = no cap).
    pub max_cpu_usage_ms: u8,
    /// Delay before execution, in seconds.
    pub delay_sec: u32,
    /// HTTP request timeout for the RPC provider.
    pub http_timeout: Duration,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            node_url: "http://127.0.0.1:8888".to_string(),
            expire_seconds: DEFAULT_EXPIRE_SECONDS,
            blocks_behind: DEFAULT_BLOCKS_BEHIND,
            use_last_irreversible: true,
            max_net_usage_words: 0,
            max_cpu_usage_ms: 0,
            delay_sec: 0,
            http_timeout: Duration::from_secs(30),
        }
    }
}

impl ChainConfig {
    /// Configuration for a specific node URL with default policy.
    pub fn new(node_url: impl Into<String>) -> Self {
        Self {
            node_url: node_url.into(),
            ..Default::default()
        }
    }

    /// Load configuration from the environment (and `.env` if present).
    ///
    /// `ANTELOPE_NODE_URL` is required; `ANTELOPE_EXPIRE_SECONDS` and
    /// `ANTELOPE_BLOCKS_BEHIND` override the defaults.
    pub fn from_env() -> Result<Self, Error> {
        dotenvy::dotenv().ok();
        let node_url = std::env::var("ANTELOPE_NODE_URL")
            .map_err(|_| Error::config("ANTELOPE_NODE_URL must be set"))?;
        let mut config = Self::new(node_url);
        if let Ok(expire) = std::env::var("ANTELOPE_EXPIRE_SECONDS") {
            config.expire_seconds = expire
                .parse()
                .map_err(|_| Error::config("ANTELOPE_EXPIRE_SECONDS must be an integer"))?;
        }
        if let Ok(behind) = std::env::var("ANTELOPE_BLOCKS_BEHIND") {
            config.blocks_behind = behind
                .parse()
                .map_err(|_| Error::config("ANTELOPE_BLOCKS_BEHIND must be an integer"))?;
            config.use_last_irreversible = false;
        }
        Ok(config)
    }

    /// Set the expiration window.
    pub fn with_expire_seconds(mut self, seconds: u32) -> Self {
        self.expire_seconds = seconds;
        self
    }

    /// Anchor TAPOS to `head - blocks_behind` instead of the last
    /// irreversible block.
    pub fn with_blocks_behind(mut self, blocks: u16) -> Self {
        self.blocks_behind = blocks;
        self.use_last_irreversible = false;
        self
    }

    /// Set the HTTP request timeout.
    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ChainConfig::default();
        assert_eq!(config.expire_seconds, 300);
        assert_eq!(config.blocks_behind, 3);
        assert!(config.use_last_irreversible);
        assert_eq!(config.max_cpu_usage_ms, 0);
    }

    #[test]
    fn test_with_blocks_behind_switches_anchor() {
        let config = ChainConfig::new("http://node:8888").with_blocks_behind(10);
        assert_eq!(config.blocks_behind, 10);
        assert!(!config.use_last_irreversible);
    }
}
