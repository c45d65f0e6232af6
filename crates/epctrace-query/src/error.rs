use epctrace_format::FormatError;
use thiserror::Error;

/// Semantic violations reported by filter validation.
///
/// These are caller-facing request errors, not defects; each variant carries
/// the reporting filter and the offending field so the caller can correct
/// the query. An empty result set is never an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryValidationError {
    /// No registered filter handles the named parameter.
    #[error("unknown query parameter '{name}'")]
    UnknownParameter {
        /// Parameter name as supplied by the caller.
        name: String,
    },
    /// A parameter value could not be interpreted by its filter.
    #[error("{filter}: malformed value '{value}' for '{parameter}'")]
    MalformedParameterValue {
        /// Reporting filter.
        filter: &'static str,
        /// Parameter the value was supplied for.
        parameter: &'static str,
        /// Offending value.
        value: String,
    },
    /// Two bounds of the same criterion contradict each other.
    #[error("{filter}: conflicting bounds ('{lower}' is not before '{upper}')")]
    ConflictingBounds {
        /// Reporting filter.
        filter: &'static str,
        /// Lower bound as supplied.
        lower: String,
        /// Upper bound as supplied.
        upper: String,
    },
    /// A bound is outside the range the filter accepts.
    #[error("{filter}: value '{value}' for '{parameter}' is out of range")]
    OutOfRangeBound {
        /// Reporting filter.
        filter: &'static str,
        /// Parameter the value was supplied for.
        parameter: &'static str,
        /// Offending value.
        value: String,
    },
    /// The narrowed result set exceeds the caller-supplied cap.
    #[error("{filter}: result set of {actual} events exceeds the limit of {limit}")]
    ResultSizeLimitExceeded {
        /// Reporting filter.
        filter: &'static str,
        /// Caller-supplied cap.
        limit: usize,
        /// Size of the narrowed result set.
        actual: usize,
    },
}

/// Errors surfaced by query execution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// A filter rejected the query parameters; the first failure in
    /// registration order is reported.
    #[error("validation failed: {0}")]
    Validation(#[from] QueryValidationError),
    /// Formatting the result set failed; no partial document is produced.
    #[error("formatting failed: {0}")]
    Format(#[from] FormatError),
    /// The caller cancelled the query.
    #[error("query cancelled")]
    Cancelled,
}
