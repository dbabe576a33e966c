//! Effects produced by state transitions

use crate::conversation::Message;

/// Effects to be executed after a state transition, in order
#[derive(Debug, Clone)]
pub enum Effect {
    /// Create a user message from already-trimmed text and append it
    AppendUserMessage { text: String },

    /// Append a finished message (agent reply or fallback)
    AppendMessage { message: Message },

    /// Replace the uncommitted input buffer
    SetDraft { text: String },

    /// Empty the uncommitted input buffer
    ClearDraft,

    /// Issue the webhook call in the background
    RequestReply { text: String },

    /// Typing indicator changed
    NotifyPending { pending: bool },
}

impl Effect {
    #[must_use]
    pub fn append_user_message(text: impl Into<String>) -> Self {
        Effect::AppendUserMessage { text: text.into() }
    }

    #[must_use]
    pub fn request_reply(text: impl Into<String>) -> Self {
        Effect::RequestReply { text: text.into() }
    }
}
