//! Query engine composing registered filters into one pipeline.

use epctrace_core::EventRecord;
use epctrace_format::{format_event, WireElement};

use crate::cancel::CancelToken;
use crate::error::{QueryError, QueryValidationError};
use crate::filter::{
    ActionFilter, BusinessStepFilter, EpcMatchFilter, EventCountLimitFilter, EventFilter,
    EventKindFilter, EventStream, EventTimeRangeFilter, MaxEventCountFilter,
};
use crate::params::QueryParams;

/// Ordered, named collection of filters executed as one pipeline.
///
/// Execution proceeds in phases: every registered filter narrows the
/// candidate stream in registration order, the narrowed stream is
/// materialized once, and every filter then validates the net result against
/// the original parameters in the same order. The first validation failure
/// aborts the query; there is no aggregation and no retry.
///
/// # Example
///
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use epctrace_core::{EventAction, EventKind, EventRecord};
/// use epctrace_query::{CancelToken, EventKindFilter, QueryEngine, QueryParams};
///
/// let mut engine = QueryEngine::new();
/// engine.register(EventKindFilter);
///
/// let record = EventRecord::new(
///     EventKind::Object,
///     Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap(),
///     Utc.with_ymd_and_hms(2024, 1, 15, 10, 31, 0).unwrap(),
///     "+00:00",
///     EventAction::Add,
/// );
/// let params = QueryParams::new().with("eventType", "ObjectEvent");
/// let result = engine.execute(
///     Box::new(vec![record].into_iter()),
///     &params,
///     &CancelToken::new(),
/// )?;
/// assert_eq!(result.len(), 1);
/// # Ok::<(), epctrace_query::QueryError>(())
/// ```
#[derive(Default)]
pub struct QueryEngine {
    filters: Vec<Box<dyn EventFilter>>,
}

impl QueryEngine {
    /// Creates an engine with no registered filters.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Creates an engine with every built-in filter registered.
    pub fn with_builtin_filters() -> Self {
        let mut engine = Self::new();
        engine.register(EventKindFilter);
        engine.register(ActionFilter);
        engine.register(EventTimeRangeFilter);
        engine.register(BusinessStepFilter);
        engine.register(EpcMatchFilter);
        engine.register(EventCountLimitFilter);
        engine.register(MaxEventCountFilter);
        engine
    }

    /// Registers a filter; registration order is execution order.
    pub fn register<F: EventFilter + 'static>(&mut self, filter: F) {
        self.filters.push(Box::new(filter));
    }

    /// Names of the registered filters, in registration order.
    pub fn filter_names(&self) -> Vec<&'static str> {
        self.filters.iter().map(|filter| filter.name()).collect()
    }

    /// Executes the query pipeline and returns the narrowed events.
    ///
    /// The candidate stream is consumed exactly once. Cancellation is
    /// checked between filters and per materialized event; a cancelled
    /// query fails with [`QueryError::Cancelled`].
    pub fn execute<'a>(
        &self,
        events: EventStream<'a>,
        params: &QueryParams,
        cancel: &CancelToken,
    ) -> Result<Vec<EventRecord>, QueryError> {
        self.check_parameter_names(params)?;

        let mut stream = events;
        for filter in &self.filters {
            if cancel.is_cancelled() {
                return Err(QueryError::Cancelled);
            }
            stream = filter.apply_filter(stream, params);
        }

        let mut narrowed = Vec::new();
        for event in stream {
            if cancel.is_cancelled() {
                return Err(QueryError::Cancelled);
            }
            narrowed.push(event);
        }

        // Validation is independent of intermediate pipeline state; every
        // filter checks the net query against the final narrowed set.
        for filter in &self.filters {
            filter.perform_validation(&narrowed, params)?;
        }

        Ok(narrowed)
    }

    /// Executes the query pipeline and formats each surviving event.
    ///
    /// Events are formatted one at a time; any formatting failure aborts the
    /// whole batch so that no partial document is produced.
    pub fn execute_format<'a>(
        &self,
        events: EventStream<'a>,
        params: &QueryParams,
        cancel: &CancelToken,
    ) -> Result<Vec<WireElement>, QueryError> {
        let narrowed = self.execute(events, params, cancel)?;

        let mut trees = Vec::with_capacity(narrowed.len());
        for event in &narrowed {
            if cancel.is_cancelled() {
                return Err(QueryError::Cancelled);
            }
            trees.push(format_event(event)?);
        }
        Ok(trees)
    }

    /// Every supplied parameter must be owned by a registered filter.
    fn check_parameter_names(&self, params: &QueryParams) -> Result<(), QueryValidationError> {
        for name in params.names() {
            if !self.filters.iter().any(|filter| filter.handles(name)) {
                return Err(QueryValidationError::UnknownParameter {
                    name: name.to_string(),
                });
            }
        }
        Ok(())
    }
}
