//! Interaction capture
//!
//! - **Session**: Session identity and capture clock
//! - **Dom**: Host event model forwarded by the embedding page
//! - **Event**: Normalized `CapturedEvent` records
//! - **Handlers**: Host event to payload conversion
//! - **Masking**: Redaction of sensitive input values
//!
//! # Flow
//!
//! ```text
//! DomEvent → handler (exclude? mask?) → EventPayload → ReplayClient::add_event
//! ```

pub mod dom;
pub mod event;
pub mod handlers;
pub mod masking;
pub mod session;

// Re-export commonly used types
pub use dom::{DomEvent, ElementSnapshot, ScrollSnapshot};
pub use event::{CapturedEvent, EventPayload, EventType};
pub use handlers::ClickPosition;
pub use session::Session;
