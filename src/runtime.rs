//! Runtime for the message exchange controller
//!
//! A single task owns the conversation store, the draft and the exchange
//! state. Everything else talks to it through a [`RuntimeHandle`], so appends
//! stay ordered even on a multi-threaded executor.

mod executor;


pub use executor::WidgetRuntime;

use crate::conversation::{ConversationStore, Message};
use crate::session::SessionId;
use crate::state_machine::{Event, ExchangeContext, TransitionError};
use crate::webhook::Transport;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;

/// Events broadcast to subscribers (the presentation layer)
#[derive(Debug, Clone)]
pub enum WidgetEvent {
    Message { message: Message },
    PendingChanged { pending: bool },
    DraftChanged { draft: String },
    Rejected { reason: String },
}

/// Point-in-time view of the conversation, republished after every change
#[derive(Debug, Clone, Serialize)]
pub struct WidgetSnapshot {
    pub messages: Vec<Message>,
    pub pending: bool,
    pub draft: String,
}

/// Outcome of a submit the controller did not refuse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    Accepted,
    /// Blank input, nothing happened
    Ignored,
}

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Rejected(#[from] TransitionError),
    #[error("widget runtime has stopped")]
    Stopped,
}

type Ack = oneshot::Sender<Result<bool, TransitionError>>;

/// Event plus an optional acknowledgement channel
pub(crate) struct Envelope {
    pub event: Event,
    pub ack: Option<Ack>,
}

impl Envelope {
    pub fn event(event: Event) -> Self {
        Self { event, ack: None }
    }
}

/// Handle to interact with a running widget runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    event_tx: mpsc::Sender<Envelope>,
    broadcast_tx: broadcast::Sender<WidgetEvent>,
    snapshot_rx: watch::Receiver<WidgetSnapshot>,
    shutdown: CancellationToken,
}

impl RuntimeHandle {
    /// Submit user input. Resolves once the user message is in the store.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::Rejected`] when an exchange is in flight under the
    /// reject policy, [`RuntimeError::Stopped`] after shutdown.
    pub async fn submit(&self, text: impl Into<String>) -> Result<Submission, RuntimeError> {
        let changed = self.dispatch(Event::Submit { text: text.into() }).await?;
        Ok(if changed {
            Submission::Accepted
        } else {
            Submission::Ignored
        })
    }

    /// Replace the uncommitted input buffer
    ///
    /// # Errors
    ///
    /// [`RuntimeError::Stopped`] after shutdown.
    pub async fn edit_draft(&self, text: impl Into<String>) -> Result<(), RuntimeError> {
        self.dispatch(Event::EditDraft { text: text.into() }).await?;
        Ok(())
    }

    async fn dispatch(&self, event: Event) -> Result<bool, RuntimeError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.event_tx
            .send(Envelope {
                event,
                ack: Some(ack_tx),
            })
            .await
            .map_err(|_| RuntimeError::Stopped)?;
        let changed = ack_rx.await.map_err(|_| RuntimeError::Stopped)??;
        Ok(changed)
    }

    #[must_use]
    pub fn snapshot(&self) -> WidgetSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Receiver that always holds the latest snapshot
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<WidgetSnapshot> {
        self.snapshot_rx.clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<WidgetEvent> {
        self.broadcast_tx.subscribe()
    }

    /// Stop the runtime. A reply still in flight is discarded.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.shutdown.is_cancelled() || self.event_tx.is_closed()
    }
}

/// Spawn a runtime for one widget activation
#[must_use]
pub fn start<T: Transport + 'static>(
    context: ExchangeContext,
    store: ConversationStore,
    session_id: SessionId,
    transport: T,
) -> RuntimeHandle {
    let (event_tx, event_rx) = mpsc::channel(32);
    let (broadcast_tx, _) = broadcast::channel(128);
    let shutdown = CancellationToken::new();

    let (runtime, snapshot_rx) = WidgetRuntime::new(
        context,
        store,
        session_id.clone(),
        transport,
        event_rx,
        event_tx.clone(),
        broadcast_tx.clone(),
        shutdown.clone(),
    );

    tokio::spawn(async move {
        runtime.run().await;
        tracing::info!(session_id = %session_id, "Widget runtime finished");
    });

    RuntimeHandle {
        event_tx,
        broadcast_tx,
        snapshot_rx,
        shutdown,
    }
}
