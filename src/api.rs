//! HTTP surface for the embedding page
//!
//! Exposes one widget instance so a browser front-end can render it.

mod handlers;
mod sse;
mod types;

pub use handlers::create_router;
pub use types::*;

use crate::widget::HostedWidget;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub widget: Arc<HostedWidget>,
}

impl AppState {
    #[must_use]
    pub fn new(widget: HostedWidget) -> Self {
        Self {
            widget: Arc::new(widget),
        }
    }
}
