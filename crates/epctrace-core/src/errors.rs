use thiserror::Error;

/// Core error types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Unrecognized event kind name.
    #[error("unknown event kind: '{0}'")]
    UnknownEventKind(String),
    /// Unrecognized action value.
    #[error("unknown action: '{0}'")]
    UnknownAction(String),
}
