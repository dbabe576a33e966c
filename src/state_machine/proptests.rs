//! Property-based tests for the exchange state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::*;
use crate::conversation::Message;
use proptest::prelude::*;
use std::collections::VecDeque;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_policy() -> impl Strategy<Value = BusyPolicy> {
    prop_oneof![Just(BusyPolicy::Reject), Just(BusyPolicy::Queue)]
}

fn arb_blank_text() -> impl Strategy<Value = String> {
    "[ \t\n\r]{0,10}"
}

fn arb_text() -> impl Strategy<Value = String> {
    "[ ]{0,3}[a-zA-Z0-9àèé?!]{1,20}[ \n]{0,3}"
}

fn arb_state() -> impl Strategy<Value = ExchangeState> {
    prop_oneof![
        Just(ExchangeState::Idle),
        proptest::collection::vec("[a-z]{1,8}", 0..4)
            .prop_map(|queued| ExchangeState::Sending {
                queued: queued.into_iter().collect::<VecDeque<_>>(),
            }),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        arb_text().prop_map(|text| Event::Submit { text }),
        arb_blank_text().prop_map(|text| Event::Submit { text }),
        arb_text().prop_map(|text| Event::EditDraft { text }),
        arb_text().prop_map(|text| Event::ReplyReceived {
            message: Message::agent(text),
        }),
    ]
}

fn count_appends(effects: &[Effect]) -> usize {
    effects
        .iter()
        .filter(|e| matches!(e, Effect::AppendUserMessage { .. } | Effect::AppendMessage { .. }))
        .count()
}

fn count_requests(effects: &[Effect]) -> usize {
    effects
        .iter()
        .filter(|e| matches!(e, Effect::RequestReply { .. }))
        .count()
}

fn outstanding(state: &ExchangeState) -> usize {
    match state {
        ExchangeState::Idle => 0,
        ExchangeState::Sending { queued } => 1 + queued.len(),
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Blank input never changes state or produces effects
    #[test]
    fn blank_submit_is_noop(
        state in arb_state(),
        policy in arb_policy(),
        text in arb_blank_text(),
    ) {
        let context = ExchangeContext::new(policy);
        let result = transition(&state, &context, Event::Submit { text }).unwrap();
        prop_assert_eq!(result.new_state, state);
        prop_assert!(result.effects.is_empty());
    }

    /// Accepted submits append exactly one trimmed user message, before any request
    #[test]
    fn accepted_submit_appends_once(
        state in arb_state(),
        policy in arb_policy(),
        text in arb_text(),
    ) {
        let context = ExchangeContext::new(policy);
        if let Ok(result) = transition(&state, &context, Event::Submit { text: text.clone() }) {
            let appended: Vec<&String> = result.effects.iter().filter_map(|e| match e {
                Effect::AppendUserMessage { text } => Some(text),
                _ => None,
            }).collect();
            prop_assert_eq!(appended.len(), 1);
            prop_assert_eq!(appended[0].as_str(), text.trim());

            let effects = &result.effects;
            let append_pos = effects
                .iter()
                .position(|e| matches!(e, Effect::AppendUserMessage { .. }));
            let request_pos = effects
                .iter()
                .position(|e| matches!(e, Effect::RequestReply { .. }));
            if let (Some(a), Some(r)) = (append_pos, request_pos) {
                prop_assert!(a < r);
            }
            prop_assert!(result.new_state.is_pending());
        }
    }

    /// Under the reject policy a busy controller refuses every non-blank submit
    #[test]
    fn reject_policy_never_accepts_while_sending(state in arb_state(), text in arb_text()) {
        let context = ExchangeContext::new(BusyPolicy::Reject);
        let result = transition(&state, &context, Event::Submit { text });
        if state.is_pending() {
            prop_assert_eq!(result.unwrap_err(), TransitionError::ExchangeInFlight);
        } else {
            prop_assert!(result.is_ok());
        }
    }

    /// A reply always appends exactly one message and the pending flag is
    /// cleared exactly when nothing else is outstanding
    #[test]
    fn reply_settles_one_exchange(
        state in arb_state(),
        policy in arb_policy(),
        text in arb_text(),
    ) {
        let before = outstanding(&state);
        let result = transition(&state, &ExchangeContext::new(policy), Event::ReplyReceived {
            message: Message::agent(text),
        });
        match result {
            Ok(result) => {
                prop_assert_eq!(count_appends(&result.effects), 1);
                prop_assert_eq!(outstanding(&result.new_state), before - 1);
                let cleared = result
                    .effects
                    .iter()
                    .any(|e| matches!(e, Effect::NotifyPending { pending: false }));
                prop_assert_eq!(cleared, !result.new_state.is_pending());
            }
            Err(e) => {
                prop_assert_eq!(before, 0);
                prop_assert!(matches!(e, TransitionError::InvalidTransition(_)));
            }
        }
    }

    /// Every request issued is eventually matched by a reply: replaying the
    /// generated requests as replies always ends Idle
    #[test]
    fn sequences_always_drain_to_idle(
        policy in arb_policy(),
        events in proptest::collection::vec(arb_event(), 0..30),
    ) {
        let context = ExchangeContext::new(policy);
        let mut state = ExchangeState::Idle;
        let mut in_flight = 0usize;

        for event in events {
            // Replies only exist when a request is outstanding
            if matches!(event, Event::ReplyReceived { .. }) && in_flight == 0 {
                continue;
            }
            let is_reply = matches!(event, Event::ReplyReceived { .. });
            if let Ok(result) = transition(&state, &context, event) {
                if is_reply {
                    in_flight -= 1;
                }
                in_flight += count_requests(&result.effects);
                prop_assert!(in_flight <= 1, "at most one request in flight");
                state = result.new_state;
            }
        }

        while in_flight > 0 {
            let result = transition(&state, &context, Event::ReplyReceived {
                message: Message::agent("settled"),
            }).unwrap();
            in_flight -= 1;
            in_flight += count_requests(&result.effects);
            state = result.new_state;
        }

        prop_assert_eq!(state, ExchangeState::Idle);
    }
}
