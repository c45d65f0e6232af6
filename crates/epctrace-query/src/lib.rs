//! Filter contract and query engine for epctrace event streams.
//!
//! This crate provides:
//! - `QueryParams`, the caller-supplied criteria bag
//! - The `EventFilter` contract: a named, composable criterion that narrows
//!   a lazy candidate sequence and validates its parameters
//! - A representative set of built-in filters over the standard's query
//!   vocabulary
//! - `QueryEngine`, which applies registered filters in order, validates the
//!   net result, and hands surviving events to the formatter
//! - `CancelToken` for cooperative cancellation of long-running queries
//!
//! The candidate sequence from storage is a single-pass lazy stream: filters
//! narrow it without materializing, and the engine collects it exactly once
//! before validation.
//!
#![deny(missing_docs)]

/// Cooperative cancellation token.
pub mod cancel;
/// Query engine orchestrating registered filters.
pub mod engine;
/// Error types for query execution and validation.
pub mod error;
/// Filter contract and built-in filters.
pub mod filter;
/// Caller-supplied query parameters.
pub mod params;

pub use cancel::CancelToken;
pub use engine::QueryEngine;
pub use error::{QueryError, QueryValidationError};
pub use filter::{
    ActionFilter, BusinessStepFilter, EpcMatchFilter, EventCountLimitFilter, EventFilter,
    EventKindFilter, EventStream, EventTimeRangeFilter, MaxEventCountFilter,
};
pub use params::{QueryParam, QueryParams};
