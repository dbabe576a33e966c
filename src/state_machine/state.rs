//! Exchange state types

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

/// What a submit does while an exchange is already in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusyPolicy {
    /// Refuse the submit; nothing is appended and the draft is kept
    #[default]
    Reject,
    /// Append the user message now, send it once the current reply settles
    Queue,
}

impl BusyPolicy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            BusyPolicy::Reject => "reject",
            BusyPolicy::Queue => "queue",
        }
    }
}

impl fmt::Display for BusyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BusyPolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(BusyPolicy::Reject),
            "queue" => Ok(BusyPolicy::Queue),
            _ => Err(()),
        }
    }
}

/// Exchange state
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExchangeState {
    /// Ready for input, nothing outstanding
    #[default]
    Idle,

    /// One webhook call in flight
    Sending {
        /// Texts already shown to the user, waiting for their turn (queue policy only)
        #[serde(default)]
        queued: VecDeque<String>,
    },
}

impl ExchangeState {
    #[must_use]
    pub fn sending() -> Self {
        ExchangeState::Sending {
            queued: VecDeque::new(),
        }
    }

    /// Typing indicator
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, ExchangeState::Sending { .. })
    }
}

/// Immutable controller configuration
#[derive(Debug, Clone, Default)]
pub struct ExchangeContext {
    pub busy_policy: BusyPolicy,
}

impl ExchangeContext {
    #[must_use]
    pub fn new(busy_policy: BusyPolicy) -> Self {
        Self { busy_policy }
    }
}
