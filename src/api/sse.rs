//! Server-Sent Events support

use super::types::TurnView;
use crate::runtime::SseEvent;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use serde_json::json;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// Convert broadcast stream to SSE stream
pub fn sse_stream(
    init_event: SseEvent,
    broadcast_rx: tokio::sync::broadcast::Receiver<SseEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // Create stream that starts with init event then broadcasts
    let init = futures::stream::once(async move { Ok(sse_event_to_axum(init_event)) });

    let broadcasts = BroadcastStream::new(broadcast_rx).filter_map(|result| match result {
        Ok(event) => Some(Ok(sse_event_to_axum(event))),
        Err(_) => None, // Skip lagged messages
    });

    let combined = init.chain(broadcasts);

    Sse::new(combined).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

fn sse_event_to_axum(event: SseEvent) -> Event {
    let (event_type, data) = sse_payload(event);
    Event::default().event(event_type).data(data.to_string())
}

fn sse_payload(event: SseEvent) -> (&'static str, serde_json::Value) {
    match event {
        SseEvent::Init { turns, thinking } => {
            let turns: Vec<TurnView> = turns.iter().map(TurnView::from).collect();
            (
                "init",
                json!({
                    "type": "init",
                    "turns": turns,
                    "thinking": thinking
                }),
            )
        }
        SseEvent::Turn { turn } => (
            "turn",
            json!({
                "type": "turn",
                "turn": TurnView::from(&turn)
            }),
        ),
        SseEvent::StateChange { thinking } => (
            "state_change",
            json!({
                "type": "state_change",
                "thinking": thinking
            }),
        ),
        SseEvent::Rejected { reason } => (
            "rejected",
            json!({
                "type": "rejected",
                "reason": reason
            }),
        ),
    }
}
