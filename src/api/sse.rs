//! Server-Sent Events support

use crate::runtime::{WidgetEvent, WidgetSnapshot};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use serde_json::json;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// Initial snapshot followed by live widget events
#[must_use]
pub fn sse_stream(
    init: WidgetSnapshot,
    broadcast_rx: tokio::sync::broadcast::Receiver<WidgetEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let init = futures::stream::once(async move { Ok(snapshot_to_axum(&init)) });

    let broadcasts = BroadcastStream::new(broadcast_rx).filter_map(|result| match result {
        Ok(event) => Some(Ok(widget_event_to_axum(event))),
        Err(_) => None, // Skip lagged messages
    });

    Sse::new(init.chain(broadcasts)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

fn snapshot_to_axum(snapshot: &WidgetSnapshot) -> Event {
    let data = json!({
        "type": "init",
        "messages": snapshot.messages,
        "pending": snapshot.pending,
        "draft": snapshot.draft
    });
    Event::default().event("init").data(data.to_string())
}

fn widget_event_to_axum(event: WidgetEvent) -> Event {
    let (event_type, data) = match event {
        WidgetEvent::Message { message } => (
            "message",
            json!({
                "type": "message",
                "message": message
            }),
        ),
        WidgetEvent::PendingChanged { pending } => (
            "pending",
            json!({
                "type": "pending",
                "pending": pending
            }),
        ),
        WidgetEvent::DraftChanged { draft } => (
            "draft",
            json!({
                "type": "draft",
                "draft": draft
            }),
        ),
        WidgetEvent::Rejected { reason } => (
            "rejected",
            json!({
                "type": "rejected",
                "reason": reason
            }),
        ),
    };

    Event::default().event(event_type).data(data.to_string())
}
