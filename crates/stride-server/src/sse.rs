use std::convert::Infallible;
use std::time::Duration;

use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use futures_util::{Stream, StreamExt};
use http::{HeaderName, HeaderValue, header};
use stride_chat::StreamEvent;

/// Turn an exchange's events into an SSE response
///
/// Each event goes out as `event: <type>` plus its JSON payload, with a
/// `: heartbeat` comment whenever the stream has been quiet for `heartbeat`.
pub fn event_stream(events: impl Stream<Item = StreamEvent> + Send + 'static, heartbeat: Duration) -> Response {
    let frames = events.map(|event| Ok::<_, Infallible>(frame(&event)));

    let mut response = Sse::new(frames)
        .keep_alive(KeepAlive::new().interval(heartbeat).text("heartbeat"))
        .into_response();

    let headers = response.headers_mut();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(HeaderName::from_static("x-accel-buffering"), HeaderValue::from_static("no"));

    response
}

fn frame(event: &StreamEvent) -> Event {
    let frame = Event::default().event(event.kind());

    match serde_json::to_string(event) {
        Ok(data) => frame.data(data),
        Err(e) => {
            tracing::error!(error = %e, kind = event.kind(), "failed to serialize stream event");
            frame.comment("unserializable event")
        }
    }
}

#[cfg(test)]
mod tests {
    use futures_util::stream;
    use stride_store::Role;

    use super::*;

    #[tokio::test]
    async fn writes_named_frames_and_headers() {
        let events = stream::iter(vec![
            StreamEvent::MessageStart {
                id: "msg_1".to_owned(),
                role: Role::Assistant,
                model: "m".to_owned(),
            },
            StreamEvent::ContentDelta { text: "Hi".to_owned() },
        ]);

        let response = event_stream(events, Duration::from_secs(15));

        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/event-stream");
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache");
        assert_eq!(response.headers()["x-accel-buffering"], "no");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();

        assert!(body.contains("event: message_start\ndata: {\"type\":\"message_start\""));
        assert!(body.contains("event: content_delta\ndata: {\"type\":\"content_delta\",\"text\":\"Hi\"}"));
    }
}
