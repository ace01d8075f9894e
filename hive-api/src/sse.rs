//! Server-Sent Events streaming of dispatcher messages.
//!
//! Each connection owns one [`Subscription`](hive_events::Subscription).
//! When the client goes away axum drops the stream, which drops the
//! subscription, which deregisters it from the dispatcher.

use axum::{
    http::header,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
};
use futures_util::{Stream, StreamExt};
use hive_events::{Dispatcher, Message};
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::telemetry::SubscriberGauge;

/// One SSE event per message: named `message` or `heartbeat`, JSON data.
pub fn message_event(message: &Message) -> Result<Event, axum::Error> {
    Event::default()
        .event(message.event_name())
        .json_data(message)
}

/// Subscribe to `dispatcher` and turn the subscription into SSE events.
pub fn event_stream(dispatcher: &Dispatcher) -> impl Stream<Item = Result<Event, axum::Error>> + Send {
    let subscription = dispatcher.subscribe();
    let id = subscription.id();
    let gauge = SubscriberGauge::acquire();
    debug!(subscriber = %id, "SSE stream opened");

    subscription.into_stream().map(move |message| {
        // Moved in so the gauge lives exactly as long as the stream.
        let _gauge = &gauge;
        message_event(&message)
    })
}

/// Full SSE response: keep-alive comments plus `Connection: keep-alive`.
///
/// Fails with 503 once the dispatcher has shut down.
pub fn sse_response(dispatcher: &Dispatcher) -> ApiResult<Response> {
    if !dispatcher.is_running() {
        return Err(ApiError::service_unavailable("Event dispatcher is not running"));
    }
    let sse = Sse::new(event_stream(dispatcher)).keep_alive(KeepAlive::default());
    Ok(([(header::CONNECTION, "keep-alive")], sse).into_response())
}
