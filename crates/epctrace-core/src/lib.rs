//! Core event record model for the epctrace repository.
//!
//! This crate provides:
//! - `EventRecord`, the in-memory representation of one traceability event
//! - Sub-entities: EPCs, business transactions, source/destination links,
//!   and placed custom fields
//! - Wire-name parsing for event kinds and actions
//!
//! Core invariants:
//! - Records are immutable value objects; every record has exactly one kind,
//!   fixed at creation, which decides the formatting branch applied downstream
//! - Records are created by the capture pipeline or storage retrieval and
//!   consumed read-only by the formatting and query layers
//!
#![deny(missing_docs)]

/// Error types for core operations.
pub mod errors;
/// Event record and event-level enumerations.
pub mod events;
/// Shared sub-entities used inside event records.
pub mod shared;

pub use errors::CoreError;
pub use events::{Epc, EpcType, EventAction, EventKind, EventRecord};
pub use shared::{
    BusinessTransaction, CustomField, FieldPlacement, SourceDestDirection, SourceDestination,
};
