//! Widget instance
//!
//! The parent context that owns the conversation for its whole lifetime.
//! Views come and go (and the host may hide the panel) without touching the
//! session or the message log.

use crate::config::WidgetConfig;
use crate::conversation::ConversationStore;
use crate::runtime::{self, RuntimeError, RuntimeHandle, Submission, WidgetSnapshot};
use crate::session::SessionId;
use crate::state_machine::ExchangeContext;
use crate::webhook::{Transport, TransportError, WebhookTransport};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("widget has not been opened yet")]
    NotActivated,
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error("failed to set up webhook transport: {0}")]
    Transport(#[from] TransportError),
}

/// State created on first activation
struct Activation {
    session_id: SessionId,
    runtime: RuntimeHandle,
}

/// One embeddable chat widget
pub struct Widget<T: Transport + Clone + 'static> {
    config: WidgetConfig,
    transport: T,
    activation: OnceLock<Activation>,
    open: AtomicBool,
}

/// Widget talking to the configured webhook, transport type erased
pub type HostedWidget = Widget<Arc<dyn Transport>>;

impl HostedWidget {
    /// Widget backed by a [`WebhookTransport`] built from `config`
    ///
    /// # Errors
    ///
    /// [`WidgetError::Transport`] when the HTTP client cannot be built.
    pub fn from_config(config: WidgetConfig) -> Result<Self, WidgetError> {
        let transport: Arc<dyn Transport> = Arc::new(WebhookTransport::new(
            config.webhook_url.clone(),
            config.request_timeout,
        )?);
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport + Clone + 'static> Widget<T> {
    #[must_use]
    pub fn with_transport(config: WidgetConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            activation: OnceLock::new(),
            open: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    /// Show the widget.
    ///
    /// The first call is the activation: it creates the session and starts
    /// the runtime, so it must run inside a tokio runtime. Later calls only
    /// toggle visibility.
    pub fn open(&self) {
        let activation = self.activation.get_or_init(|| {
            let session_id = SessionId::generate();
            tracing::info!(
                session_id = %session_id,
                endpoint = %self.config.webhook_url,
                "Activating widget"
            );
            let runtime = runtime::start(
                ExchangeContext::new(self.config.busy_policy),
                ConversationStore::initialize(&self.config.greeting),
                session_id.clone(),
                self.transport.clone(),
            );
            Activation { session_id, runtime }
        });

        if !self.open.swap(true, Ordering::SeqCst) {
            tracing::debug!(session_id = %activation.session_id, "Widget opened");
        }
    }

    /// Hide the widget. The conversation and session are kept.
    pub fn close(&self) {
        if self.open.swap(false, Ordering::SeqCst) {
            tracing::debug!("Widget closed");
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// `None` until the first activation
    #[must_use]
    pub fn session_id(&self) -> Option<&SessionId> {
        self.activation.get().map(|a| &a.session_id)
    }

    /// # Errors
    ///
    /// [`WidgetError::NotActivated`] before the first [`Widget::open`].
    pub fn runtime(&self) -> Result<&RuntimeHandle, WidgetError> {
        self.activation
            .get()
            .map(|a| &a.runtime)
            .ok_or(WidgetError::NotActivated)
    }

    /// # Errors
    ///
    /// [`WidgetError::NotActivated`] before the first open, otherwise the
    /// runtime's refusal (see [`RuntimeHandle::submit`]).
    pub async fn submit(&self, text: impl Into<String>) -> Result<Submission, WidgetError> {
        Ok(self.runtime()?.submit(text).await?)
    }

    /// # Errors
    ///
    /// [`WidgetError::NotActivated`] before the first open.
    pub async fn edit_draft(&self, text: impl Into<String>) -> Result<(), WidgetError> {
        Ok(self.runtime()?.edit_draft(text).await?)
    }

    /// Current conversation, `None` before activation
    #[must_use]
    pub fn snapshot(&self) -> Option<WidgetSnapshot> {
        self.activation.get().map(|a| a.runtime.snapshot())
    }

    /// Tear the widget down. Its conversation is gone for good.
    pub fn shutdown(&self) {
        self.close();
        if let Some(activation) = self.activation.get() {
            tracing::info!(session_id = %activation.session_id, "Shutting down widget");
            activation.runtime.shutdown();
        }
    }
}

impl<T: Transport + Clone + 'static> Drop for Widget<T> {
    fn drop(&mut self) {
        if let Some(activation) = self.activation.get() {
            activation.runtime.shutdown();
        }
    }
}
