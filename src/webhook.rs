//! Webhook transport
//!
//! One POST per user message. Every outcome, good or bad, comes back as an
//! agent [`Message`]; failures are logged and replaced by the fallback text.

mod error;
mod reply;

pub use error::{TransportError, TransportErrorKind};
pub use reply::{extract_reply, WebhookPayload, FALLBACK_TEXT, PLACEHOLDER_TEXT, REPLY_FIELDS};

use crate::conversation::Message;
use crate::session::SessionId;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Sends one user message and resolves to the agent's answer
#[async_trait]
pub trait Transport: Send + Sync {
    /// Never fails: transport errors resolve to the fallback message
    async fn send(&self, text: &str, session_id: &SessionId) -> Message;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, text: &str, session_id: &SessionId) -> Message {
        (**self).send(text, session_id).await
    }
}

/// HTTP webhook client
#[derive(Debug, Clone)]
pub struct WebhookTransport {
    client: Client,
    endpoint: Url,
}

impl WebhookTransport {
    /// # Errors
    ///
    /// Returns a [`TransportErrorKind::Network`] error when the HTTP client
    /// cannot be built.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::network(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client, endpoint })
    }

    /// Perform the exchange, surfacing failures
    ///
    /// # Errors
    ///
    /// Fails on network errors, timeouts, non-2xx statuses and bodies that are
    /// not JSON (or are JSON `null`). The error kind tells them apart.
    pub async fn exchange(
        &self,
        text: &str,
        session_id: &SessionId,
    ) -> Result<String, TransportError> {
        let payload = WebhookPayload::new(text, session_id);

        // `json` sets `Content-Type: application/json`
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::status(status, &body));
        }

        let body = response.bytes().await?;
        let data: Value = serde_json::from_slice(&body).map_err(|e| {
            TransportError::malformed_body(format!("Webhook response is not JSON: {e}"))
        })?;

        reply::reply_text(&data)
    }
}

#[async_trait]
impl Transport for WebhookTransport {
    async fn send(&self, text: &str, session_id: &SessionId) -> Message {
        let start = Instant::now();
        let result = self.exchange(text, session_id).await;
        let duration = start.elapsed();

        match &result {
            Ok(reply) => {
                tracing::info!(
                    session_id = %session_id,
                    duration_ms = %duration.as_millis(),
                    reply_len = reply.len(),
                    "Webhook exchange completed"
                );
            }
            Err(e) => {
                tracing::warn!(
                    session_id = %session_id,
                    endpoint = %self.endpoint,
                    duration_ms = %duration.as_millis(),
                    kind = e.kind.as_str(),
                    error = %e.message,
                    "Failed to send message to webhook"
                );
            }
        }

        reply_message(result)
    }
}

/// Collapse an exchange outcome into the agent message shown to the user
#[must_use]
pub fn reply_message(result: Result<String, TransportError>) -> Message {
    match result {
        Ok(reply) => Message::agent(reply),
        Err(_) => Message::agent(FALLBACK_TEXT),
    }
}
