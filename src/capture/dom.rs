//! Host-side interaction model
//!
//! The embedding application forwards what a browser listener would see as
//! `DomEvent` values. Each carries a snapshot of the state the capture
//! handlers read (target element, scroll offsets, location).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Class that removes an element from capture
pub const EXCLUDE_CLASS: &str = "replay-exclude";

/// Attribute that forces masking of an element's value
pub const MASK_ATTRIBUTE: &str = "data-replay-mask";

/// Snapshot of the event target
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementSnapshot {
    pub tag_name: String,
    pub id: Option<String>,
    pub class_list: Vec<String>,
    pub text_content: Option<String>,
    /// Declared input type (`type` attribute)
    #[serde(rename = "type")]
    pub input_type: Option<String>,
    pub name: Option<String>,
    pub value: Option<String>,
    pub attributes: HashMap<String, String>,
}

impl ElementSnapshot {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class_list.push(class.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text_content = Some(text.into());
        self
    }

    pub fn with_type(mut self, input_type: impl Into<String>) -> Self {
        self.input_type = Some(input_type.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.class_list.iter().any(|c| c == class)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Whether the element opted out of capture
    pub fn is_excluded(&self) -> bool {
        self.has_class(EXCLUDE_CLASS)
    }

    /// Id, with an empty id treated as absent
    pub fn id(&self) -> Option<&str> {
        non_empty(&self.id)
    }

    /// Space-joined class list, as `Element.className` reports it
    pub fn class_name(&self) -> Option<String> {
        if self.class_list.is_empty() {
            None
        } else {
            Some(self.class_list.join(" "))
        }
    }

    pub fn text(&self) -> Option<&str> {
        non_empty(&self.text_content)
    }

    pub fn name(&self) -> Option<&str> {
        non_empty(&self.name)
    }

    pub fn input_type(&self) -> Option<&str> {
        non_empty(&self.input_type)
    }
}

/// Scroll state at the time of the event
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollSnapshot {
    pub scroll_x: f64,
    pub scroll_y: f64,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub document_height: f64,
}

/// Events the host forwards to the capture listener
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DomEvent {
    #[serde(rename_all = "camelCase")]
    Click {
        target: ElementSnapshot,
        client_x: f64,
        client_y: f64,
        page_x: f64,
        page_y: f64,
    },

    Scroll(ScrollSnapshot),

    Input { target: ElementSnapshot },

    /// History navigation (back/forward)
    Popstate {
        #[serde(default)]
        referrer: Option<String>,
        href: String,
        #[serde(default)]
        title: String,
    },

    /// Page teardown
    Beforeunload,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
