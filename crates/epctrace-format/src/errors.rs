use epctrace_core::EventKind;
use thiserror::Error;

/// Errors that can occur while formatting events into wire trees.
///
/// A formatting failure is fatal for the batch being serialized: a response
/// document never contains partially-built entries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The event kind has no wire representation in this formatter.
    #[error("unsupported event kind: {kind}")]
    UnsupportedEventKind {
        /// Offending event kind.
        kind: EventKind,
    },
    /// The XML writer rejected the tree.
    #[error("render error: {0}")]
    Render(String),
}
