//! Chat-platform webhook payloads.
//!
//! Decodes LINE Messaging API style bodies:
//!
//! ```json
//! {"destination": "U123", "events": [
//!   {"type": "message", "timestamp": 1700000000000,
//!    "source": {"type": "group", "groupId": "C1", "userId": "U9"},
//!    "message": {"type": "text", "id": "42", "text": "GG1001\nFB: ..."}}
//! ]}
//! ```
//!
//! Only text messages carry transcripts; every other event is skipped.
//! Unknown fields are ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Top-level webhook body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookPayload {
    /// Bot/channel the events were delivered to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,

    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub kind: String,

    /// Milliseconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<EventSource>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<EventMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
}

impl EventSource {
    /// Conversation identifier: group, then room, then user.
    pub fn conversation_id(&self) -> Option<&str> {
        self.group_id
            .as_deref()
            .or(self.room_id.as_deref())
            .or(self.user_id.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// A text message ready for the transcript parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncomingMessage {
    pub source_id: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub text: String,
}

impl WebhookPayload {
    /// Decode a raw webhook body.
    pub fn from_slice(body: &[u8]) -> crate::Result<Self> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Text messages in delivery order.
    pub fn text_messages(&self) -> Vec<IncomingMessage> {
        self.events
            .iter()
            .filter_map(|event| {
                let text = match (&event.kind[..], &event.message) {
                    ("message", Some(EventMessage { kind, text: Some(text), .. })) if kind == "text" => text,
                    _ => {
                        debug!("Skipping {} event", event.kind);
                        return None;
                    }
                };

                Some(IncomingMessage {
                    source_id: event
                        .source
                        .as_ref()
                        .and_then(|s| s.conversation_id())
                        .map(str::to_string),
                    timestamp: event.timestamp.and_then(DateTime::<Utc>::from_timestamp_millis),
                    text: text.clone(),
                })
            })
            .collect()
    }
}
