//! Widget runtime executor

use super::{Envelope, WidgetEvent, WidgetSnapshot};
use crate::conversation::{ConversationStore, Message};
use crate::session::SessionId;
use crate::state_machine::{
    transition, Effect, Event, ExchangeContext, ExchangeState, TransitionError,
};
use crate::webhook::Transport;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};
use tokio_util::sync::CancellationToken;

/// Owns the conversation for one widget activation
pub struct WidgetRuntime<T: Transport + 'static> {
    context: ExchangeContext,
    state: ExchangeState,
    store: ConversationStore,
    draft: String,
    session_id: SessionId,
    transport: Arc<T>,
    event_rx: mpsc::Receiver<Envelope>,
    /// Used by background exchanges to report their reply
    event_tx: mpsc::Sender<Envelope>,
    broadcast_tx: broadcast::Sender<WidgetEvent>,
    snapshot_tx: watch::Sender<WidgetSnapshot>,
    shutdown: CancellationToken,
}

impl<T: Transport + 'static> WidgetRuntime<T> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        context: ExchangeContext,
        store: ConversationStore,
        session_id: SessionId,
        transport: T,
        event_rx: mpsc::Receiver<Envelope>,
        event_tx: mpsc::Sender<Envelope>,
        broadcast_tx: broadcast::Sender<WidgetEvent>,
        shutdown: CancellationToken,
    ) -> (Self, watch::Receiver<WidgetSnapshot>) {
        let (snapshot_tx, snapshot_rx) = watch::channel(WidgetSnapshot {
            messages: store.messages().to_vec(),
            pending: false,
            draft: String::new(),
        });

        let runtime = Self {
            context,
            state: ExchangeState::Idle,
            store,
            draft: String::new(),
            session_id,
            transport: Arc::new(transport),
            event_rx,
            event_tx,
            broadcast_tx,
            snapshot_tx,
            shutdown,
        };
        (runtime, snapshot_rx)
    }

    pub async fn run(mut self) {
        tracing::info!(
            session_id = %self.session_id,
            busy_policy = %self.context.busy_policy,
            "Starting widget runtime"
        );

        loop {
            tokio::select! {
                biased;

                () = self.shutdown.cancelled() => break,

                Some(envelope) = self.event_rx.recv() => {
                    let outcome = self.process_event(envelope.event);
                    if let Some(ack) = envelope.ack {
                        let _ = ack.send(outcome);
                    }
                }

                else => break,
            }
        }

        if self.state.is_pending() {
            tracing::info!(
                session_id = %self.session_id,
                "Discarding in-flight exchange on shutdown"
            );
        }
        tracing::info!(session_id = %self.session_id, "Widget runtime stopped");
    }

    /// Apply one event. `Ok(true)` when it changed anything.
    fn process_event(&mut self, event: Event) -> Result<bool, TransitionError> {
        let result = match transition(&self.state, &self.context, event) {
            Ok(r) => r,
            Err(e @ TransitionError::ExchangeInFlight) => {
                tracing::info!(session_id = %self.session_id, error = %e, "Submit rejected");
                let _ = self.broadcast_tx.send(WidgetEvent::Rejected {
                    reason: e.to_string(),
                });
                return Err(e);
            }
            // Internal invariant breach, nothing the user can act on
            Err(e) => {
                tracing::error!(session_id = %self.session_id, error = %e, "Invalid transition");
                return Err(e);
            }
        };

        let changed = !result.effects.is_empty();
        self.state = result.new_state;

        for effect in result.effects {
            self.execute_effect(effect);
        }

        if changed {
            self.publish_snapshot();
        }
        Ok(changed)
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::AppendUserMessage { text } => match Message::user(&text) {
                Some(message) => self.append(message),
                None => tracing::warn!("Skipping blank user message"),
            },

            Effect::AppendMessage { message } => self.append(message),

            Effect::SetDraft { text } => {
                self.draft = text;
                let _ = self.broadcast_tx.send(WidgetEvent::DraftChanged {
                    draft: self.draft.clone(),
                });
            }

            Effect::ClearDraft => {
                self.draft.clear();
                let _ = self.broadcast_tx.send(WidgetEvent::DraftChanged {
                    draft: String::new(),
                });
            }

            Effect::RequestReply { text } => self.spawn_exchange(text),

            Effect::NotifyPending { pending } => {
                let _ = self.broadcast_tx.send(WidgetEvent::PendingChanged { pending });
            }
        }
    }

    fn append(&mut self, message: Message) {
        tracing::debug!(
            session_id = %self.session_id,
            message_id = %message.id(),
            sender = ?message.sender(),
            "Appending message"
        );
        self.store.append(message.clone());
        let _ = self.broadcast_tx.send(WidgetEvent::Message { message });
    }

    /// Run the webhook call in the background; the reply comes back as an event
    fn spawn_exchange(&self, text: String) {
        let transport = self.transport.clone();
        let session_id = self.session_id.clone();
        let event_tx = self.event_tx.clone();
        let shutdown = self.shutdown.clone();

        tokio::spawn(async move {
            tracing::debug!(session_id = %session_id, "Sending message to webhook (background)");

            tokio::select! {
                biased;

                () = shutdown.cancelled() => {
                    tracing::debug!(
                        session_id = %session_id,
                        "Exchange abandoned, widget shut down"
                    );
                }

                message = transport.send(&text, &session_id) => {
                    let reply = Envelope::event(Event::ReplyReceived { message });
                    if event_tx.send(reply).await.is_err() {
                        tracing::debug!(
                            session_id = %session_id,
                            "Reply dropped, runtime already stopped"
                        );
                    }
                }
            }
        });
    }

    fn publish_snapshot(&self) {
        self.snapshot_tx.send_replace(WidgetSnapshot {
            messages: self.store.messages().to_vec(),
            pending: self.state.is_pending(),
            draft: self.draft.clone(),
        });
    }
}
