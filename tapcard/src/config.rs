// tapcard/src/config.rs

use std::time::Duration;

use crate::radio::PollingTarget;
use crate::utils::{DEFAULT_EXCHANGE_TIMEOUT_MS, ms};

/// Prompt shown while polling unless configured otherwise.
pub const DEFAULT_ALERT_MESSAGE: &str = "Hold your device near the card.";

/// Settings applied to every scan a controller starts.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SessionConfig {
    /// Per-exchange timeout in milliseconds.
    pub exchange_timeout_ms: u64,
    /// Prompt the radio shows while polling.
    pub alert_message: String,
    /// Radio technologies to poll for.
    pub polling: Vec<PollingTarget>,
}

impl SessionConfig {
    /// Start a builder from the defaults.
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::new()
    }

    /// Per-exchange timeout as a `Duration`.
    pub fn exchange_timeout(&self) -> Duration {
        ms(self.exchange_timeout_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            exchange_timeout_ms: DEFAULT_EXCHANGE_TIMEOUT_MS,
            alert_message: DEFAULT_ALERT_MESSAGE.to_string(),
            polling: vec![PollingTarget::Iso14443],
        }
    }
}

/// Helper to construct a [`SessionConfig`] starting from the defaults.
pub struct SessionConfigBuilder {
    config: SessionConfig,
}

impl SessionConfigBuilder {
    /// Builder holding the default config.
    pub fn new() -> Self {
        Self {
            config: SessionConfig::default(),
        }
    }

    /// Set the per-exchange timeout in milliseconds.
    pub fn exchange_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.config.exchange_timeout_ms = timeout_ms;
        self
    }

    /// Set the polling prompt.
    pub fn alert_message(mut self, message: impl Into<String>) -> Self {
        self.config.alert_message = message.into();
        self
    }

    /// Replace the polling targets. An empty list keeps the default.
    pub fn polling(mut self, targets: Vec<PollingTarget>) -> Self {
        if !targets.is_empty() {
            self.config.polling = targets;
        }
        self
    }

    /// Finish the config.
    pub fn build(self) -> SessionConfig {
        self.config
    }
}

impl Default for SessionConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
