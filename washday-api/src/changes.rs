use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use futures_util::{Stream, StreamExt};
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/orders/changes", get(stream_changes))
}

/// GET /v1/orders/changes
/// Server-sent change notifications; clients re-fetch on each one
pub async fn stream_changes(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.change_tx.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| async move {
        match result {
            Ok(event) => Event::default()
                .event("record_changed")
                .json_data(&event)
                .ok()
                .map(Ok),
            // Lagged subscribers just miss hints; the next one triggers a refetch.
            Err(_) => None,
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
