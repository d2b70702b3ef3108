use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::errors::{ShopcrabError, ShopcrabResult};

/// Reply tokens the console's "Verify" button sends. They cannot be replied to.
pub const VERIFY_REPLY_TOKENS: [&str; 2] = [
    "00000000000000000000000000000000",
    "ffffffffffffffffffffffffffffffff",
];

/// One webhook event, in the order the platform sent it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Message(MessageEvent),
    /// follow, unfollow, postback, join, ... and message events delivered in
    /// standby mode. Kept so the dispatcher can account for them.
    Other { kind: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEvent {
    pub reply_token: String,
    pub message: MessageContent,
    pub source: Option<EventSource>,
    pub timestamp: Option<DateTime<Utc>>,
    pub webhook_event_id: Option<String>,
    pub is_redelivery: bool,
}

impl MessageEvent {
    /// The user's text, when this is a text message.
    pub fn text(&self) -> Option<&str> {
        match &self.message {
            MessageContent::Text { text, .. } => Some(text),
            MessageContent::Other { .. } => None,
        }
    }

    /// Whether the reply token is one of the console verification dummies.
    pub fn is_verification(&self) -> bool {
        VERIFY_REPLY_TOKENS.contains(&self.reply_token.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageContent {
    Text { id: String, text: String },
    /// image, sticker, location, ...
    Other { kind: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventSource {
    User {
        user_id: String,
    },
    Group {
        group_id: String,
        user_id: Option<String>,
    },
    Room {
        room_id: String,
        user_id: Option<String>,
    },
    Other {
        kind: String,
    },
}

/// Decoded events of one webhook call.
///
/// The whole envelope is validated before the first event is handed out, so a
/// malformed payload never results in partial processing. Iterating consumes
/// the events; there is no way to restart.
#[derive(Debug)]
pub struct Events {
    destination: Option<String>,
    inner: std::vec::IntoIter<Event>,
}

impl Events {
    /// The bot user ID the webhook was addressed to.
    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }
}

impl Iterator for Events {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Events {}

// --- wire format ---

#[derive(Deserialize)]
struct RawEnvelope {
    #[serde(default)]
    destination: Option<String>,
    events: Vec<RawEvent>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEvent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    reply_token: Option<String>,
    #[serde(default)]
    message: Option<RawMessage>,
    #[serde(default)]
    source: Option<RawSource>,
    #[serde(default)]
    timestamp: Option<i64>,
    #[serde(default)]
    webhook_event_id: Option<String>,
    #[serde(default)]
    delivery_context: Option<RawDeliveryContext>,
}

#[derive(Deserialize)]
struct RawMessage {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    id: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSource {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    group_id: Option<String>,
    #[serde(default)]
    room_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDeliveryContext {
    #[serde(default)]
    is_redelivery: bool,
}

/// Parse a verified webhook body into its events.
pub fn decode(body: &[u8]) -> ShopcrabResult<Events> {
    let envelope: RawEnvelope =
        serde_json::from_slice(body).map_err(|e| ShopcrabError::Decode(e.to_string()))?;

    let events = envelope
        .events
        .into_iter()
        .enumerate()
        .map(|(idx, raw)| convert_event(raw).map_err(|e| prefix_index(idx, e)))
        .collect::<ShopcrabResult<Vec<_>>>()?;

    Ok(Events {
        destination: envelope.destination,
        inner: events.into_iter(),
    })
}

fn prefix_index(idx: usize, err: ShopcrabError) -> ShopcrabError {
    match err {
        ShopcrabError::Decode(msg) => ShopcrabError::Decode(format!("events[{}]: {}", idx, msg)),
        other => other,
    }
}

fn convert_event(raw: RawEvent) -> ShopcrabResult<Event> {
    if raw.kind != "message" {
        return Ok(Event::Other { kind: raw.kind });
    }

    let Some(reply_token) = raw.reply_token.filter(|t| !t.is_empty()) else {
        // Standby-mode events are delivered without a reply token.
        if raw.mode.as_deref() == Some("standby") {
            return Ok(Event::Other { kind: raw.kind });
        }
        return Err(ShopcrabError::Decode(
            "message event without replyToken".into(),
        ));
    };
    let Some(message) = raw.message else {
        return Err(ShopcrabError::Decode(
            "message event without message object".into(),
        ));
    };

    let message = match message.kind.as_str() {
        "text" => {
            let Some(text) = message.text else {
                return Err(ShopcrabError::Decode("text message without text".into()));
            };
            MessageContent::Text {
                id: message.id,
                text,
            }
        }
        _ => MessageContent::Other { kind: message.kind },
    };

    Ok(Event::Message(MessageEvent {
        reply_token,
        message,
        source: raw.source.map(convert_source),
        timestamp: raw.timestamp.and_then(DateTime::from_timestamp_millis),
        webhook_event_id: raw.webhook_event_id,
        is_redelivery: raw.delivery_context.is_some_and(|d| d.is_redelivery),
    }))
}

fn convert_source(raw: RawSource) -> EventSource {
    match (raw.kind.as_str(), raw.user_id, raw.group_id, raw.room_id) {
        ("user", Some(user_id), _, _) => EventSource::User { user_id },
        ("group", user_id, Some(group_id), _) => EventSource::Group { group_id, user_id },
        ("room", user_id, _, Some(room_id)) => EventSource::Room { room_id, user_id },
        (kind, ..) => EventSource::Other {
            kind: kind.to_string(),
        },
    }
}
