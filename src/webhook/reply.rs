//! Webhook wire format
//!
//! Outbound payload plus the reply-field probing applied to inbound bodies.

use super::TransportError;
use crate::session::SessionId;
use serde::Serialize;
use serde_json::Value;

/// Candidate reply fields, highest priority first
pub const REPLY_FIELDS: [&str; 4] = ["output", "reply", "text", "message"];

/// Shown when the body parses but carries none of [`REPLY_FIELDS`]
pub const PLACEHOLDER_TEXT: &str = "Risposta ricevuta.";

/// Shown for every transport failure
pub const FALLBACK_TEXT: &str = "Spiacenti, si è verificato un errore di connessione. \
                                  Controlla la console per i dettagli o verifica il CORS su n8n.";

/// Request body. Exactly these two fields go over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload<'a> {
    pub message: &'a str,
    pub session_id: &'a str,
}

impl<'a> WebhookPayload<'a> {
    #[must_use]
    pub fn new(message: &'a str, session_id: &'a SessionId) -> Self {
        Self {
            message,
            session_id: session_id.as_str(),
        }
    }
}

/// Probe [`REPLY_FIELDS`] in order and return the first usable value as text.
///
/// A field counts as absent when it is missing, `null`, `false`, zero or the
/// empty string. Non-string values are rendered as compact JSON, keeping the
/// key order of the response and printing integral floats without a fraction.
#[must_use]
pub fn extract_reply(data: &Value) -> Option<String> {
    REPLY_FIELDS
        .iter()
        .filter_map(|field| data.get(field))
        .find(|value| is_present(value))
        .map(|value| match value {
            Value::String(s) => s.clone(),
            other => integral_floats_as_ints(other).to_string(),
        })
}

/// Largest integer an `f64` holds exactly (2^53 - 1)
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// `1.0` becomes `1`, matching how browsers print numbers
#[allow(clippy::cast_possible_truncation)]
fn integral_floats_as_ints(value: &Value) -> Value {
    match value {
        Value::Number(n) if n.is_f64() => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER => Value::from(f as i64),
            _ => value.clone(),
        },
        Value::Array(items) => Value::Array(items.iter().map(integral_floats_as_ints).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), integral_floats_as_ints(v)))
                .collect(),
        ),
        _ => value.clone(),
    }
}

/// Reply text for a decoded success body
pub(super) fn reply_text(data: &Value) -> Result<String, TransportError> {
    if data.is_null() {
        return Err(TransportError::malformed_body("Webhook response body is JSON null"));
    }
    Ok(extract_reply(data).unwrap_or_else(|| {
        tracing::debug!("Webhook response has no reply field, using placeholder");
        PLACEHOLDER_TEXT.to_string()
    }))
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
