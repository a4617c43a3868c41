// Server-sent event streaming of engine notifications
use crate::application::engine::EngineEvent;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use std::convert::Infallible;
use tokio::sync::broadcast::{self, error::RecvError};

/// Encode one engine event as an SSE frame named after the event
pub fn to_sse_event(event: &EngineEvent) -> Option<Event> {
    match Event::default().event(event.name()).json_data(event) {
        Ok(frame) => Some(frame),
        Err(e) => {
            tracing::warn!("Failed to encode {} event: {}", event.name(), e);
            None
        }
    }
}

/// Events from a broadcast receiver until the sender goes away. A slow
/// subscriber skips what it missed.
pub fn event_stream(mut rx: broadcast::Receiver<EngineEvent>) -> impl Stream<Item = EngineEvent> {
    async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(event) => yield event,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!("Event subscriber lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    }
}

/// Create a streaming response from a broadcast receiver
pub fn stream_from_receiver(
    rx: broadcast::Receiver<EngineEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let events = event_stream(rx);
    let stream = async_stream::stream! {
        for await event in events {
            if let Some(frame) = to_sse_event(&event) {
                yield Ok(frame);
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}
