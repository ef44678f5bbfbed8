// src/handlers/events.rs

use std::{convert::Infallible, time::Duration};

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use tokio_stream::{Stream, StreamExt, wrappers::BroadcastStream};

use crate::common::revalidate::Revalidator;

// GET /api/events
// Cada mutação vira um evento `invalidate` com as telas que devem recarregar.
#[utoipa::path(
    get,
    path = "/api/events",
    tag = "Events",
    responses(
        (status = 200, description = "Stream SSE de invalidações", content_type = "text/event-stream")
    )
)]
pub async fn stream_events(
    State(revalidator): State<Revalidator>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tracing::debug!("📡 Novo ouvinte de invalidações");

    let stream = BroadcastStream::new(revalidator.subscribe()).filter_map(|message| match message {
        Ok(invalidation) => Event::default()
            .event("invalidate")
            .json_data(&invalidation)
            .ok()
            .map(Ok),
        // Ouvinte lento perdeu eventos; os próximos ainda chegam
        Err(lagged) => {
            tracing::warn!("Ouvinte SSE atrasado: {}", lagged);
            None
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
