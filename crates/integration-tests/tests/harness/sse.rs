//! Minimal SSE frame parser for chat responses

use serde_json::Value;

/// One `event:`/`data:` frame
#[derive(Debug, Clone)]
pub struct SseEvent {
    pub event: String,
    pub data: Value,
}

/// Split a complete SSE body into frames, skipping comments
pub fn parse(body: &str) -> Vec<SseEvent> {
    body.split("\n\n")
        .filter_map(|frame| {
            let mut event = None;
            let mut data = String::new();

            for line in frame.lines() {
                if let Some(name) = line.strip_prefix("event: ") {
                    event = Some(name.to_owned());
                } else if let Some(payload) = line.strip_prefix("data: ") {
                    data.push_str(payload);
                }
            }

            Some(SseEvent {
                event: event?,
                data: serde_json::from_str(&data).ok()?,
            })
        })
        .collect()
}

/// Event names in order
pub fn kinds(events: &[SseEvent]) -> Vec<&str> {
    events.iter().map(|e| e.event.as_str()).collect()
}
