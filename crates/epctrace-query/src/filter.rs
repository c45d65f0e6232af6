//! Filter contract and built-in filters over the standard query vocabulary.

use chrono::{DateTime, Utc};
use epctrace_core::{EventAction, EventKind, EventRecord};
use regex::Regex;

use crate::error::QueryValidationError;
use crate::params::QueryParams;

/// Single-pass lazy stream of candidate events.
///
/// Filters must not assume the stream can be enumerated more than once; the
/// engine materializes it exactly once after the last filter has been
/// applied.
pub type EventStream<'a> = Box<dyn Iterator<Item = EventRecord> + 'a>;

/// A named, composable query criterion.
///
/// Implementations satisfy two independent obligations:
///
/// - [`apply_filter`](Self::apply_filter) is a pure narrowing: the output is
///   a subset of the input, in the same relative order, with nothing added.
///   Laziness is preserved unless the criterion genuinely needs look-ahead.
///   Parameter values the filter cannot interpret narrow nothing; the
///   matching validation reports them.
/// - [`perform_validation`](Self::perform_validation) inspects the
///   parameters (and, where the criterion requires it, the already-narrowed
///   candidate set) and fails with a specific violation when the criteria
///   are semantically invalid. It is stateless: the same inputs always yield
///   the same outcome, and it never mutates the sequence.
pub trait EventFilter {
    /// Stable filter name, used in error context.
    fn name(&self) -> &'static str;

    /// Returns true if this filter owns the named query parameter.
    fn handles(&self, parameter: &str) -> bool;

    /// Narrows the candidate stream according to this filter's parameters.
    fn apply_filter<'a>(&self, events: EventStream<'a>, params: &QueryParams) -> EventStream<'a>;

    /// Validates this filter's parameters against the narrowed result.
    fn perform_validation(
        &self,
        events: &[EventRecord],
        params: &QueryParams,
    ) -> Result<(), QueryValidationError>;
}

const PARAM_EVENT_TYPE: &str = "eventType";
const PARAM_EQ_ACTION: &str = "EQ_action";
const PARAM_GE_EVENT_TIME: &str = "GE_eventTime";
const PARAM_LT_EVENT_TIME: &str = "LT_eventTime";
const PARAM_EQ_BIZ_STEP: &str = "EQ_bizStep";
const PARAM_MATCH_ANY_EPC: &str = "MATCH_anyEPC";
const PARAM_EVENT_COUNT_LIMIT: &str = "eventCountLimit";
const PARAM_MAX_EVENT_COUNT: &str = "maxEventCount";

/// Narrows by event kind (`eventType`), matching wire names like
/// `ObjectEvent`. Several values select their union.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventKindFilter;

impl EventFilter for EventKindFilter {
    fn name(&self) -> &'static str {
        "event-kind"
    }

    fn handles(&self, parameter: &str) -> bool {
        parameter == PARAM_EVENT_TYPE
    }

    fn apply_filter<'a>(&self, events: EventStream<'a>, params: &QueryParams) -> EventStream<'a> {
        let kinds: Vec<EventKind> = params
            .values(PARAM_EVENT_TYPE)
            .iter()
            .filter_map(|value| value.parse().ok())
            .collect();
        if kinds.is_empty() {
            return events;
        }
        Box::new(events.filter(move |event| kinds.contains(&event.kind)))
    }

    fn perform_validation(
        &self,
        _events: &[EventRecord],
        params: &QueryParams,
    ) -> Result<(), QueryValidationError> {
        for value in params.values(PARAM_EVENT_TYPE) {
            if value.parse::<EventKind>().is_err() {
                return Err(QueryValidationError::MalformedParameterValue {
                    filter: self.name(),
                    parameter: PARAM_EVENT_TYPE,
                    value: value.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Narrows by action (`EQ_action`), matching the upper-cased wire values.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionFilter;

impl EventFilter for ActionFilter {
    fn name(&self) -> &'static str {
        "action"
    }

    fn handles(&self, parameter: &str) -> bool {
        parameter == PARAM_EQ_ACTION
    }

    fn apply_filter<'a>(&self, events: EventStream<'a>, params: &QueryParams) -> EventStream<'a> {
        let actions: Vec<EventAction> = params
            .values(PARAM_EQ_ACTION)
            .iter()
            .filter_map(|value| value.parse().ok())
            .collect();
        if actions.is_empty() {
            return events;
        }
        Box::new(events.filter(move |event| actions.contains(&event.action)))
    }

    fn perform_validation(
        &self,
        _events: &[EventRecord],
        params: &QueryParams,
    ) -> Result<(), QueryValidationError> {
        for value in params.values(PARAM_EQ_ACTION) {
            if value.parse::<EventAction>().is_err() {
                return Err(QueryValidationError::MalformedParameterValue {
                    filter: self.name(),
                    parameter: PARAM_EQ_ACTION,
                    value: value.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Narrows by the event-time window (`GE_eventTime` inclusive,
/// `LT_eventTime` exclusive).
#[derive(Debug, Clone, Copy, Default)]
pub struct EventTimeRangeFilter;

impl EventTimeRangeFilter {
    fn bound(params: &QueryParams, parameter: &str) -> Option<DateTime<Utc>> {
        params.first(parameter).and_then(parse_timestamp)
    }

    fn validated_bound(
        &self,
        params: &QueryParams,
        parameter: &'static str,
    ) -> Result<Option<DateTime<Utc>>, QueryValidationError> {
        let value = match params.first(parameter) {
            Some(value) => value,
            None => return Ok(None),
        };
        match parse_timestamp(value) {
            Some(bound) => Ok(Some(bound)),
            None => Err(QueryValidationError::MalformedParameterValue {
                filter: self.name(),
                parameter,
                value: value.to_string(),
            }),
        }
    }
}

impl EventFilter for EventTimeRangeFilter {
    fn name(&self) -> &'static str {
        "event-time-range"
    }

    fn handles(&self, parameter: &str) -> bool {
        parameter == PARAM_GE_EVENT_TIME || parameter == PARAM_LT_EVENT_TIME
    }

    fn apply_filter<'a>(&self, events: EventStream<'a>, params: &QueryParams) -> EventStream<'a> {
        let lower = Self::bound(params, PARAM_GE_EVENT_TIME);
        let upper = Self::bound(params, PARAM_LT_EVENT_TIME);
        if lower.is_none() && upper.is_none() {
            return events;
        }
        Box::new(events.filter(move |event| {
            lower.map_or(true, |bound| event.event_time >= bound)
                && upper.map_or(true, |bound| event.event_time < bound)
        }))
    }

    fn perform_validation(
        &self,
        _events: &[EventRecord],
        params: &QueryParams,
    ) -> Result<(), QueryValidationError> {
        let lower = self.validated_bound(params, PARAM_GE_EVENT_TIME)?;
        let upper = self.validated_bound(params, PARAM_LT_EVENT_TIME)?;
        if let (Some(lower), Some(upper)) = (lower, upper) {
            if lower >= upper {
                return Err(QueryValidationError::ConflictingBounds {
                    filter: self.name(),
                    lower: lower.to_rfc3339(),
                    upper: upper.to_rfc3339(),
                });
            }
        }
        Ok(())
    }
}

/// Narrows by business step (`EQ_bizStep`); events without a business step
/// never match.
#[derive(Debug, Clone, Copy, Default)]
pub struct BusinessStepFilter;

impl EventFilter for BusinessStepFilter {
    fn name(&self) -> &'static str {
        "business-step"
    }

    fn handles(&self, parameter: &str) -> bool {
        parameter == PARAM_EQ_BIZ_STEP
    }

    fn apply_filter<'a>(&self, events: EventStream<'a>, params: &QueryParams) -> EventStream<'a> {
        let steps: Vec<String> = params.values(PARAM_EQ_BIZ_STEP).to_vec();
        if steps.is_empty() {
            return events;
        }
        Box::new(events.filter(move |event| {
            event
                .business_step
                .as_deref()
                .map_or(false, |step| steps.iter().any(|wanted| wanted == step))
        }))
    }

    fn perform_validation(
        &self,
        _events: &[EventRecord],
        params: &QueryParams,
    ) -> Result<(), QueryValidationError> {
        reject_empty_values(self.name(), PARAM_EQ_BIZ_STEP, params)
    }
}

/// Narrows to events carrying a matching EPC (`MATCH_anyEPC`), regardless
/// of EPC subtype.
#[derive(Debug, Clone, Copy, Default)]
pub struct EpcMatchFilter;

impl EventFilter for EpcMatchFilter {
    fn name(&self) -> &'static str {
        "epc-match"
    }

    fn handles(&self, parameter: &str) -> bool {
        parameter == PARAM_MATCH_ANY_EPC
    }

    fn apply_filter<'a>(&self, events: EventStream<'a>, params: &QueryParams) -> EventStream<'a> {
        let wanted: Vec<String> = params.values(PARAM_MATCH_ANY_EPC).to_vec();
        if wanted.is_empty() {
            return events;
        }
        Box::new(events.filter(move |event| {
            event
                .epcs
                .iter()
                .any(|epc| wanted.iter().any(|id| id == &epc.id))
        }))
    }

    fn perform_validation(
        &self,
        _events: &[EventRecord],
        params: &QueryParams,
    ) -> Result<(), QueryValidationError> {
        reject_empty_values(self.name(), PARAM_MATCH_ANY_EPC, params)
    }
}

/// Truncates the stream to the first N events (`eventCountLimit`).
///
/// The truncation is lazy: once the limit is reached the rest of the
/// candidate stream is never pulled.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventCountLimitFilter;

impl EventFilter for EventCountLimitFilter {
    fn name(&self) -> &'static str {
        "event-count-limit"
    }

    fn handles(&self, parameter: &str) -> bool {
        parameter == PARAM_EVENT_COUNT_LIMIT
    }

    fn apply_filter<'a>(&self, events: EventStream<'a>, params: &QueryParams) -> EventStream<'a> {
        let limit = params
            .first(PARAM_EVENT_COUNT_LIMIT)
            .and_then(|value| value.parse::<usize>().ok());
        match limit {
            Some(limit) if limit > 0 => Box::new(events.take(limit)),
            _ => events,
        }
    }

    fn perform_validation(
        &self,
        _events: &[EventRecord],
        params: &QueryParams,
    ) -> Result<(), QueryValidationError> {
        let value = match params.first(PARAM_EVENT_COUNT_LIMIT) {
            Some(value) => value,
            None => return Ok(()),
        };
        match value.parse::<usize>() {
            Ok(0) => Err(QueryValidationError::OutOfRangeBound {
                filter: self.name(),
                parameter: PARAM_EVENT_COUNT_LIMIT,
                value: value.to_string(),
            }),
            Ok(_) => Ok(()),
            Err(_) => Err(QueryValidationError::MalformedParameterValue {
                filter: self.name(),
                parameter: PARAM_EVENT_COUNT_LIMIT,
                value: value.to_string(),
            }),
        }
    }
}

/// Caps the size of the narrowed result set (`maxEventCount`).
///
/// Narrows nothing; validation fails once the final result set exceeds the
/// cap. This is the one built-in whose validation inspects the events.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxEventCountFilter;

impl EventFilter for MaxEventCountFilter {
    fn name(&self) -> &'static str {
        "max-event-count"
    }

    fn handles(&self, parameter: &str) -> bool {
        parameter == PARAM_MAX_EVENT_COUNT
    }

    fn apply_filter<'a>(&self, events: EventStream<'a>, _params: &QueryParams) -> EventStream<'a> {
        events
    }

    fn perform_validation(
        &self,
        events: &[EventRecord],
        params: &QueryParams,
    ) -> Result<(), QueryValidationError> {
        let value = match params.first(PARAM_MAX_EVENT_COUNT) {
            Some(value) => value,
            None => return Ok(()),
        };
        let limit = value
            .parse::<usize>()
            .map_err(|_| QueryValidationError::MalformedParameterValue {
                filter: self.name(),
                parameter: PARAM_MAX_EVENT_COUNT,
                value: value.to_string(),
            })?;
        if events.len() > limit {
            return Err(QueryValidationError::ResultSizeLimitExceeded {
                filter: self.name(),
                limit,
                actual: events.len(),
            });
        }
        Ok(())
    }
}

fn reject_empty_values(
    filter: &'static str,
    parameter: &'static str,
    params: &QueryParams,
) -> Result<(), QueryValidationError> {
    for value in params.values(parameter) {
        if value.is_empty() {
            return Err(QueryValidationError::MalformedParameterValue {
                filter,
                parameter,
                value: value.clone(),
            });
        }
    }
    Ok(())
}

/// Accepts RFC3339 timestamps with an optional fraction; shape-checked
/// before calendar validation so malformed values are rejected uniformly.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let shape = Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d{1,9})?(Z|[+-]\d{2}:\d{2})$")
        .expect("invalid regex");
    if !shape.is_match(value) {
        return None;
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|timestamp| timestamp.with_timezone(&Utc))
}
