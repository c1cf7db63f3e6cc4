//! Captured event records
//!
//! Wire form, one element of the JSON array POSTed to the collector:
//!
//! ```json
//! {"sessionId":"…","eventType":"CLICK","timestamp":1718000000000,"payload":{…}}
//! ```

use serde::{Deserialize, Serialize};

/// Event kinds understood by the collector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    Click,
    Scroll,
    Input,
    Navigation,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Click => "CLICK",
            EventType::Scroll => "SCROLL",
            EventType::Input => "INPUT",
            EventType::Navigation => "NAVIGATION",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickPayload {
    pub tag_name: String,
    pub id: Option<String>,
    pub class_name: Option<String>,
    /// First 100 characters of the target's text
    pub text: Option<String>,
    pub x: f64,
    pub y: f64,
    pub page_x: f64,
    pub page_y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollPayload {
    pub scroll_x: f64,
    pub scroll_y: f64,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub document_height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputPayload {
    pub tag_name: String,
    pub field_type: String,
    pub field_name: String,
    pub field_id: Option<String>,
    /// Value after masking
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationPayload {
    pub from: Option<String>,
    pub to: String,
    pub title: String,
}

/// Variant-specific event data
///
/// Untagged on the wire; the kind travels in `eventType` next to it. Variant
/// order matters for decoding: input payloads share `tagName` with clicks
/// but lack coordinates, so clicks are tried first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventPayload {
    Click(ClickPayload),
    Input(InputPayload),
    Scroll(ScrollPayload),
    Navigation(NavigationPayload),
}

impl EventPayload {
    pub fn event_type(&self) -> EventType {
        match self {
            EventPayload::Click(_) => EventType::Click,
            EventPayload::Scroll(_) => EventType::Scroll,
            EventPayload::Input(_) => EventType::Input,
            EventPayload::Navigation(_) => EventType::Navigation,
        }
    }
}

/// One normalized interaction record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedEvent {
    session_id: String,
    event_type: EventType,
    /// Milliseconds since epoch
    timestamp: i64,
    payload: EventPayload,
}

impl CapturedEvent {
    pub fn new(session_id: impl Into<String>, timestamp: i64, payload: EventPayload) -> Self {
        Self {
            session_id: session_id.into(),
            event_type: payload.event_type(),
            timestamp,
            payload,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn payload(&self) -> &EventPayload {
        &self.payload
    }
}
