use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive};
use axum::response::Sse;
use luxdash_api::LoopEvent;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

use crate::services::ControlLoop;

#[derive(Clone)]
pub struct SseState {
    pub control_loop: Arc<ControlLoop>,
}

pub async fn sse_handler(
    State(state): State<SseState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.control_loop.subscribe();

    let stream = BroadcastStream::new(receiver).filter_map(|result| {
        let event = match result {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!("sse subscriber lagged: {}", e);
                return None;
            }
        };

        let name = match &event {
            LoopEvent::Snapshot(_) => "snapshot",
            LoopEvent::Applied(_) => "applied",
            LoopEvent::Notification(_) => "notification",
        };

        match Event::default().event(name).json_data(&event) {
            Ok(event) => Some(Ok(event)),
            Err(e) => {
                tracing::error!("failed to encode {} event: {}", name, e);
                None
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
