//! Capture handlers: turn host events into payloads
//!
//! Each handler returns `None` when the target opted out of capture. They do
//! only in-memory work so they can run inside the host's event dispatch.

use crate::capture::dom::{ElementSnapshot, ScrollSnapshot};
use crate::capture::event::{
    ClickPayload, EventPayload, InputPayload, NavigationPayload, ScrollPayload,
};
use crate::capture::masking::{mask_value, should_mask};

/// Characters of target text kept in click payloads
pub const CLICK_TEXT_LIMIT: usize = 100;

/// Pointer position of a click
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClickPosition {
    pub client_x: f64,
    pub client_y: f64,
    pub page_x: f64,
    pub page_y: f64,
}

pub fn capture_click(target: &ElementSnapshot, position: ClickPosition) -> Option<EventPayload> {
    if target.is_excluded() {
        return None;
    }

    Some(EventPayload::Click(ClickPayload {
        tag_name: target.tag_name.clone(),
        id: target.id().map(str::to_string),
        class_name: target.class_name(),
        text: target
            .text()
            .map(|text| text.chars().take(CLICK_TEXT_LIMIT).collect()),
        x: position.client_x,
        y: position.client_y,
        page_x: position.page_x,
        page_y: position.page_y,
    }))
}

pub fn capture_scroll(snapshot: &ScrollSnapshot) -> EventPayload {
    EventPayload::Scroll(ScrollPayload {
        scroll_x: snapshot.scroll_x,
        scroll_y: snapshot.scroll_y,
        viewport_width: snapshot.viewport_width,
        viewport_height: snapshot.viewport_height,
        document_height: snapshot.document_height,
    })
}

pub fn capture_input(target: &ElementSnapshot) -> Option<EventPayload> {
    if target.is_excluded() {
        return None;
    }

    let field_type = target.input_type().unwrap_or("text").to_string();
    let field_name = target
        .name()
        .or_else(|| target.id())
        .unwrap_or("unknown")
        .to_string();

    let value = if should_mask(target, &field_type, &field_name) {
        Some(mask_value(target.value.as_deref().unwrap_or(""), &field_type))
    } else {
        target.value.clone()
    };

    Some(EventPayload::Input(InputPayload {
        tag_name: target.tag_name.clone(),
        field_type,
        field_name,
        field_id: target.id().map(str::to_string),
        value,
    }))
}

pub fn capture_navigation(referrer: Option<&str>, href: &str, title: &str) -> EventPayload {
    EventPayload::Navigation(NavigationPayload {
        from: referrer.filter(|r| !r.is_empty()).map(str::to_string),
        to: href.to_string(),
        title: title.to_string(),
    })
}
