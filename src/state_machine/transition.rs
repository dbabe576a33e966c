//! Pure state transition function

use super::{BusyPolicy, Effect, Event, ExchangeContext, ExchangeState};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ExchangeState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    #[must_use]
    pub fn new(state: ExchangeState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("A message is already being sent, wait for the reply")]
    ExchangeInFlight,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs and performs no
/// I/O. Blank submissions are accepted as a no-op in every state.
///
/// # Errors
///
/// [`TransitionError::ExchangeInFlight`] for a submit while busy under
/// [`BusyPolicy::Reject`], [`TransitionError::InvalidTransition`] for a reply
/// with nothing in flight.
pub fn transition(
    state: &ExchangeState,
    context: &ExchangeContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        (state, Event::EditDraft { text }) => {
            Ok(TransitionResult::new(state.clone()).with_effect(Effect::SetDraft { text }))
        }

        (state, Event::Submit { text }) if text.trim().is_empty() => {
            Ok(TransitionResult::new(state.clone()))
        }

        // Idle + Submit -> Sending. The user message is appended before the
        // request effect so display order follows send order.
        (ExchangeState::Idle, Event::Submit { text }) => {
            let text = text.trim();
            Ok(TransitionResult::new(ExchangeState::sending())
                .with_effect(Effect::append_user_message(text))
                .with_effect(Effect::ClearDraft)
                .with_effect(Effect::NotifyPending { pending: true })
                .with_effect(Effect::request_reply(text)))
        }

        (ExchangeState::Sending { queued }, Event::Submit { text }) => match context.busy_policy {
            BusyPolicy::Reject => Err(TransitionError::ExchangeInFlight),
            BusyPolicy::Queue => {
                let text = text.trim();
                let mut queued = queued.clone();
                queued.push_back(text.to_string());
                Ok(TransitionResult::new(ExchangeState::Sending { queued })
                    .with_effect(Effect::append_user_message(text))
                    .with_effect(Effect::ClearDraft))
            }
        },

        // Sending + ReplyReceived -> Idle, or the next queued exchange
        (ExchangeState::Sending { queued }, Event::ReplyReceived { message }) => {
            let mut queued = queued.clone();
            match queued.pop_front() {
                None => Ok(TransitionResult::new(ExchangeState::Idle)
                    .with_effect(Effect::AppendMessage { message })
                    .with_effect(Effect::NotifyPending { pending: false })),
                Some(next) => Ok(TransitionResult::new(ExchangeState::Sending { queued })
                    .with_effect(Effect::AppendMessage { message })
                    .with_effect(Effect::request_reply(next))),
            }
        }

        (ExchangeState::Idle, Event::ReplyReceived { message }) => {
            Err(TransitionError::InvalidTransition(format!(
                "reply {} arrived with no exchange in flight",
                message.id()
            )))
        }
    }
}
