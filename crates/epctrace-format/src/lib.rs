//! Wire tree representation and event formatting for epctrace events.
//!
//! This crate provides:
//! - `WireElement`, a named element/attribute tree matching the standard's
//!   event representation
//! - The lazily-created `extension` container shared by every schema
//!   extension mechanism
//! - `format_event`, the deterministic transform from an `EventRecord` into
//!   its wire tree
//!
//! Formatting is stateless and side-effect-free per event: each call builds a
//! fresh tree, so independent events may be formatted concurrently.
//!
#![deny(missing_docs)]

/// Error types for formatting operations.
pub mod errors;
/// Event record to wire tree transform.
pub mod formatter;
/// Wire element tree and extension container helper.
pub mod tree;

pub use errors::FormatError;
pub use formatter::{format_event, DATE_TIME_FORMAT};
pub use tree::{WireElement, WireNode};
