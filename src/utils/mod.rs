//! Shared utilities
//!
//! - **config**: Layered configuration loading
//! - **errors**: Crate-wide error type

pub mod config;
pub mod errors;

pub use config::ReplayConfig;
pub use errors::{ReplayError, Result};
