use std::{convert::Infallible, time::Duration};

use async_stream::stream;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::debug;

use crate::{
    dto::sse::{Handshake, ServerEvent},
    state::SharedState,
};

const EVENT_HANDSHAKE: &str = "handshake";

/// Subscribe to the change stream.
pub fn subscribe_changes(state: &SharedState) -> broadcast::Receiver<ServerEvent> {
    state.sse().subscribe()
}

/// Build the first event a fresh subscriber receives.
pub fn handshake(state: &SharedState) -> Option<ServerEvent> {
    let payload = Handshake {
        message: "change stream connected".into(),
        online: state.gate().is_online(),
    };
    ServerEvent::json(Some(EVENT_HANDSHAKE.to_string()), &payload).ok()
}

fn to_event(payload: ServerEvent) -> Event {
    let event = Event::default().data(payload.data);
    match payload.event {
        Some(name) => event.event(name),
        None => event,
    }
}

/// Convert a broadcast receiver into an SSE response, sending `first` before
/// any broadcast event.
pub fn to_sse_stream(
    mut receiver: broadcast::Receiver<ServerEvent>,
    first: Option<ServerEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let events = stream! {
        if let Some(payload) = first {
            yield Ok(to_event(payload));
        }
        loop {
            match receiver.recv().await {
                Ok(payload) => yield Ok(to_event(payload)),
                Err(RecvError::Closed) => break,
                Err(RecvError::Lagged(skipped)) => {
                    // clients re-fetch on the next change event anyway
                    debug!(skipped, "change stream subscriber lagged");
                }
            }
        }
        debug!("change stream hub closed");
    };

    Sse::new(events).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
