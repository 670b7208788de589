//! flowsiem Core
//!
//! Core types and utilities shared across flowsiem components.
//!
//! This crate provides:
//! - Flow records, classification labels, and security events
//! - Error types and result handling
//! - The newline-delimited flow reader

pub mod error;
pub mod input;
pub mod types;

pub use error::{Error, Result};
pub use input::FlowReader;
pub use types::{Batch, Event, FlowRecord, Label, SerializedEvent, BATCH_CAPACITY};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::input::FlowReader;
    pub use crate::types::{Batch, Event, FlowRecord, Label, SerializedEvent, BATCH_CAPACITY};
}
