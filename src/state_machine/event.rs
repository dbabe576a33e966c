//! Events that drive the exchange controller

use crate::conversation::Message;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    EditDraft { text: String },
    Submit { text: String },

    // Transport events
    /// The transport settled; `message` is either the real reply or the fallback
    ReplyReceived { message: Message },
}
