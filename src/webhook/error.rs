//! Webhook transport error types

use thiserror::Error;

/// Transport failure with classification
///
/// Never escapes [`super::Transport::send`]; it exists so the failure can be
/// logged with its cause before the fallback message is substituted.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    #[must_use]
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Network, message)
    }

    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Timeout, message)
    }

    #[must_use]
    pub fn status(status: reqwest::StatusCode, body: &str) -> Self {
        let reason = status.canonical_reason().unwrap_or("unknown status");
        Self::new(
            TransportErrorKind::Status,
            format!("Webhook error: {} {reason}: {}", status.as_u16(), truncate(body, 200)),
        )
    }

    #[must_use]
    pub fn malformed_body(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::MalformedBody, message)
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout(format!("Webhook request timed out: {err}"))
        } else if err.is_decode() {
            Self::malformed_body(format!("Failed to read webhook response: {err}"))
        } else {
            Self::network(format!("Webhook request failed: {err}"))
        }
    }
}

/// Failure classification, for diagnostics only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Connection refused, DNS failure, reset mid-body
    Network,
    /// Request exceeded the configured deadline
    Timeout,
    /// Endpoint answered with a non-2xx status
    Status,
    /// Body was not JSON, or was JSON `null`
    MalformedBody,
}

impl TransportErrorKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Timeout => "timeout",
            Self::Status => "status",
            Self::MalformedBody => "malformed_body",
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s.get(..idx).unwrap_or(s),
        None => s,
    }
}
