//! Widget configuration
//!
//! Static widget constants plus the handful of runtime overrides a host can
//! supply through the environment.

use crate::state_machine::BusyPolicy;
use reqwest::Url;
use std::time::Duration;
use thiserror::Error;

/// Built-in webhook endpoint used when the host does not override it
pub const DEFAULT_WEBHOOK_URL: &str =
    "https://n8n.srv1332158.hstgr.cloud/webhook/ba723a52-faf1-4061-b72c-6c9d1ea95d84";

pub const INITIAL_GREETING: &str = "Ciao! Come posso aiutarti oggi?";
pub const AGENT_NAME: &str = "Assistenza 24/7";
pub const AGENT_AVATAR: &str = "https://cdn.files-text.com/api/ow/img/integrations/openai/orb.gif";

/// Upper bound on a single webhook round trip
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid webhook URL {value:?}: {reason}")]
    InvalidWebhookUrl { value: String, reason: String },
    #[error("invalid request timeout {0:?} (expected whole seconds > 0)")]
    InvalidTimeout(String),
    #[error("invalid busy policy {0:?} (expected \"reject\" or \"queue\")")]
    InvalidBusyPolicy(String),
    #[error("invalid port {0:?}")]
    InvalidPort(String),
}

/// Configuration for one widget instance
#[derive(Debug, Clone)]
pub struct WidgetConfig {
    pub webhook_url: Url,
    pub greeting: String,
    pub agent_name: String,
    pub agent_avatar: String,
    pub request_timeout: Duration,
    pub busy_policy: BusyPolicy,
}

impl WidgetConfig {
    /// Default configuration pointed at a specific endpoint
    #[must_use]
    pub fn with_webhook_url(webhook_url: Url) -> Self {
        Self {
            webhook_url,
            greeting: INITIAL_GREETING.to_string(),
            agent_name: AGENT_NAME.to_string(),
            agent_avatar: AGENT_AVATAR.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            busy_policy: BusyPolicy::default(),
        }
    }

    /// Build a config from an optional host-supplied URL override.
    ///
    /// Mirrors the embedding contract: absent means the built-in endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidWebhookUrl`] when the URL does not parse
    /// or is not http(s).
    pub fn new(webhook_url: Option<&str>) -> Result<Self, ConfigError> {
        let url = parse_webhook_url(webhook_url.unwrap_or(DEFAULT_WEBHOOK_URL))?;
        Ok(Self::with_webhook_url(url))
    }

    /// Load overrides from `WEBCHAT_*` environment variables.
    ///
    /// # Errors
    ///
    /// Same as [`WidgetConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve overrides through an arbitrary lookup (env in production)
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the first override that does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::new(lookup("WEBCHAT_WEBHOOK_URL").as_deref())?;

        if let Some(raw) = lookup("WEBCHAT_REQUEST_TIMEOUT_SECS") {
            config = match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.with_request_timeout(Duration::from_secs(secs)),
                _ => return Err(ConfigError::InvalidTimeout(raw)),
            };
        }

        if let Some(raw) = lookup("WEBCHAT_BUSY_POLICY") {
            let busy_policy = raw
                .parse()
                .map_err(|()| ConfigError::InvalidBusyPolicy(raw.clone()))?;
            config = config.with_busy_policy(busy_policy);
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_busy_policy(mut self, busy_policy: BusyPolicy) -> Self {
        self.busy_policy = busy_policy;
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}

fn parse_webhook_url(value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim()).map_err(|e| ConfigError::InvalidWebhookUrl {
        value: value.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidWebhookUrl {
            value: value.to_string(),
            reason: format!("unsupported scheme {other}"),
        }),
    }
}

/// Listen port for the host binary
///
/// # Errors
///
/// Returns [`ConfigError::InvalidPort`] when `WEBCHAT_PORT` is not a `u16`.
pub fn port_from_env() -> Result<u16, ConfigError> {
    match std::env::var("WEBCHAT_PORT") {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidPort(raw)),
        Err(_) => Ok(DEFAULT_PORT),
    }
}
