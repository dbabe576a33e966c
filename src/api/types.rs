//! API request and response types

use crate::conversation::Message;
use serde::{Deserialize, Serialize};

/// Request carrying user-typed text (submit and draft updates)
#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

/// Static agent presentation data
#[derive(Debug, Serialize)]
pub struct AgentInfo {
    pub name: String,
    pub avatar: String,
}

/// Full widget state
#[derive(Debug, Serialize)]
pub struct WidgetStateResponse {
    pub is_open: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub agent: AgentInfo,
    pub messages: Vec<Message>,
    pub pending: bool,
    pub draft: String,
}

/// Response for a submit
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    /// False when the input was blank and nothing happened
    pub accepted: bool,
}

/// Response for draft updates
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
