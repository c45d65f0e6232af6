use std::cell::Cell;
use std::rc::Rc;

use chrono::{DateTime, Duration, Utc};
use epctrace_core::{Epc, EventAction, EventKind, EventRecord};
use epctrace_query::{
    ActionFilter, BusinessStepFilter, CancelToken, EpcMatchFilter, EventCountLimitFilter,
    EventFilter, EventKindFilter, EventStream, EventTimeRangeFilter, MaxEventCountFilter,
    QueryEngine, QueryError, QueryParams, QueryValidationError,
};

fn base_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-01-15T10:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

/// Builds a record whose read point doubles as a stable identity marker.
fn record(marker: &str, kind: EventKind, minutes: i64) -> EventRecord {
    let event_time = base_time() + Duration::minutes(minutes);
    let mut record = EventRecord::new(
        kind,
        event_time,
        event_time + Duration::seconds(30),
        "+00:00",
        EventAction::Add,
    );
    record.read_point = Some(marker.to_string());
    record
}

fn markers(events: &[EventRecord]) -> Vec<&str> {
    events
        .iter()
        .map(|event| event.read_point.as_deref().unwrap_or(""))
        .collect()
}

fn stream(events: Vec<EventRecord>) -> EventStream<'static> {
    Box::new(events.into_iter())
}

fn sample_events() -> Vec<EventRecord> {
    vec![
        record("a", EventKind::Object, 0),
        record("b", EventKind::Transaction, 10),
        record("c", EventKind::Object, 20),
        record("d", EventKind::Transformation, 30),
    ]
}

#[test]
fn kind_filter_narrows_and_preserves_order() {
    let filter = EventKindFilter;
    let params = QueryParams::new().with("eventType", "ObjectEvent");

    let narrowed: Vec<_> = filter.apply_filter(stream(sample_events()), &params).collect();
    assert_eq!(markers(&narrowed), vec!["a", "c"]);
}

#[test]
fn kind_filter_without_parameter_is_identity() {
    let filter = EventKindFilter;
    let params = QueryParams::new();

    let narrowed: Vec<_> = filter.apply_filter(stream(sample_events()), &params).collect();
    assert_eq!(markers(&narrowed), vec!["a", "b", "c", "d"]);
}

#[test]
fn kind_filter_rejects_unknown_kind_names() {
    let filter = EventKindFilter;
    let params = QueryParams::new().with("eventType", "PurchaseEvent");

    assert!(filter.apply_filter(stream(sample_events()), &params).count() == 4);
    assert_eq!(
        filter.perform_validation(&[], &params),
        Err(QueryValidationError::MalformedParameterValue {
            filter: "event-kind",
            parameter: "eventType",
            value: "PurchaseEvent".to_string(),
        })
    );
}

#[test]
fn action_filter_matches_wire_values() {
    let mut events = sample_events();
    events[1].action = EventAction::Delete;

    let filter = ActionFilter;
    let params = QueryParams::new().with("EQ_action", "DELETE");
    let narrowed: Vec<_> = filter.apply_filter(stream(events), &params).collect();
    assert_eq!(markers(&narrowed), vec!["b"]);
}

#[test]
fn time_range_filter_is_inclusive_exclusive() {
    let filter = EventTimeRangeFilter;
    let params = QueryParams::new()
        .with("GE_eventTime", "2024-01-15T10:10:00Z")
        .with("LT_eventTime", "2024-01-15T10:30:00Z");

    let narrowed: Vec<_> = filter.apply_filter(stream(sample_events()), &params).collect();
    assert_eq!(markers(&narrowed), vec!["b", "c"]);
}

#[test]
fn time_range_filter_reports_malformed_bounds() {
    let filter = EventTimeRangeFilter;
    let params = QueryParams::new().with("GE_eventTime", "yesterday");

    // A malformed bound narrows nothing; validation reports it.
    let narrowed: Vec<_> = filter.apply_filter(stream(sample_events()), &params).collect();
    assert_eq!(narrowed.len(), 4);
    assert_eq!(
        filter.perform_validation(&[], &params),
        Err(QueryValidationError::MalformedParameterValue {
            filter: "event-time-range",
            parameter: "GE_eventTime",
            value: "yesterday".to_string(),
        })
    );
}

#[test]
fn time_range_filter_reports_conflicting_bounds() {
    let filter = EventTimeRangeFilter;
    let params = QueryParams::new()
        .with("GE_eventTime", "2024-01-15T12:00:00Z")
        .with("LT_eventTime", "2024-01-15T10:00:00Z");

    assert!(matches!(
        filter.perform_validation(&[], &params),
        Err(QueryValidationError::ConflictingBounds { .. })
    ));
}

#[test]
fn business_step_filter_skips_events_without_step() {
    let mut events = sample_events();
    events[2].business_step = Some("urn:epcglobal:cbv:bizstep:shipping".to_string());

    let filter = BusinessStepFilter;
    let params = QueryParams::new().with("EQ_bizStep", "urn:epcglobal:cbv:bizstep:shipping");
    let narrowed: Vec<_> = filter.apply_filter(stream(events), &params).collect();
    assert_eq!(markers(&narrowed), vec!["c"]);
}

#[test]
fn epc_match_filter_matches_any_epc() {
    let mut events = sample_events();
    events[0]
        .epcs
        .push(Epc::list("urn:epc:id:sgtin:0614141.107346.2017"));
    events[3].epcs.push(Epc::quantity(
        "urn:epc:id:sgtin:0614141.107346.2017",
        Some(5.0),
        None,
    ));

    let filter = EpcMatchFilter;
    let params = QueryParams::new().with("MATCH_anyEPC", "urn:epc:id:sgtin:0614141.107346.2017");
    let narrowed: Vec<_> = filter.apply_filter(stream(events), &params).collect();
    assert_eq!(markers(&narrowed), vec!["a", "d"]);
}

#[test]
fn count_limit_truncates_without_draining_the_stream() {
    let pulled = Rc::new(Cell::new(0usize));
    let counter = pulled.clone();
    let counted = sample_events().into_iter().map(move |event| {
        counter.set(counter.get() + 1);
        event
    });

    let filter = EventCountLimitFilter;
    let params = QueryParams::new().with("eventCountLimit", "2");
    let narrowed: Vec<_> = filter.apply_filter(Box::new(counted), &params).collect();

    assert_eq!(markers(&narrowed), vec!["a", "b"]);
    assert_eq!(pulled.get(), 2);
}

#[test]
fn count_limit_rejects_zero_and_garbage() {
    let filter = EventCountLimitFilter;

    let zero = QueryParams::new().with("eventCountLimit", "0");
    assert!(matches!(
        filter.perform_validation(&[], &zero),
        Err(QueryValidationError::OutOfRangeBound { .. })
    ));

    let garbage = QueryParams::new().with("eventCountLimit", "many");
    assert!(matches!(
        filter.perform_validation(&[], &garbage),
        Err(QueryValidationError::MalformedParameterValue { .. })
    ));
}

#[test]
fn max_event_count_caps_the_final_result() {
    let filter = MaxEventCountFilter;
    let params = QueryParams::new().with("maxEventCount", "3");
    let events = sample_events();

    assert_eq!(
        filter.perform_validation(&events, &params),
        Err(QueryValidationError::ResultSizeLimitExceeded {
            filter: "max-event-count",
            limit: 3,
            actual: 4,
        })
    );
    assert_eq!(filter.perform_validation(&events[..3], &params), Ok(()));
}

#[test]
fn validation_is_repeatable() {
    let filter = EventTimeRangeFilter;
    let params = QueryParams::new().with("GE_eventTime", "garbage");
    let events = sample_events();

    let first = filter.perform_validation(&events, &params);
    let second = filter.perform_validation(&events, &params);
    assert_eq!(first, second);
}

#[test]
fn engine_applies_filters_in_registration_order() {
    let mut engine = QueryEngine::new();
    engine.register(EventKindFilter);
    engine.register(EventCountLimitFilter);
    assert_eq!(engine.filter_names(), vec!["event-kind", "event-count-limit"]);

    let params = QueryParams::new()
        .with("eventType", "ObjectEvent")
        .with("eventCountLimit", "1");
    let result = engine
        .execute(stream(sample_events()), &params, &CancelToken::new())
        .unwrap();
    assert_eq!(markers(&result), vec!["a"]);
}

// Scenario: the first filter narrows successfully, the second carries a
// malformed bound; the engine reports the second filter's validation error
// and produces no formatted output.
#[test]
fn engine_reports_validation_error_after_successful_narrowing() {
    let mut engine = QueryEngine::new();
    engine.register(EventKindFilter);
    engine.register(EventTimeRangeFilter);

    let params = QueryParams::new()
        .with("eventType", "ObjectEvent")
        .with("GE_eventTime", "not-a-timestamp");

    let result = engine.execute_format(stream(sample_events()), &params, &CancelToken::new());
    assert_eq!(
        result,
        Err(QueryError::Validation(
            QueryValidationError::MalformedParameterValue {
                filter: "event-time-range",
                parameter: "GE_eventTime",
                value: "not-a-timestamp".to_string(),
            }
        ))
    );
}

#[test]
fn engine_rejects_unknown_parameters() {
    let mut engine = QueryEngine::new();
    engine.register(EventKindFilter);

    let params = QueryParams::new().with("EQ_color", "green");
    let result = engine.execute(stream(sample_events()), &params, &CancelToken::new());
    assert_eq!(
        result,
        Err(QueryError::Validation(
            QueryValidationError::UnknownParameter {
                name: "EQ_color".to_string(),
            }
        ))
    );
}

#[test]
fn engine_treats_empty_result_as_success() {
    let engine = QueryEngine::with_builtin_filters();
    let params = QueryParams::new().with("eventType", "AggregationEvent");

    let result = engine
        .execute(stream(sample_events()), &params, &CancelToken::new())
        .unwrap();
    assert!(result.is_empty());
}

#[test]
fn engine_aborts_cancelled_queries() {
    let engine = QueryEngine::with_builtin_filters();
    let cancel = CancelToken::new();
    cancel.cancel();

    let result = engine.execute(stream(sample_events()), &QueryParams::new(), &cancel);
    assert_eq!(result, Err(QueryError::Cancelled));
}

#[test]
fn engine_formats_surviving_events() {
    let engine = QueryEngine::with_builtin_filters();
    let params = QueryParams::new().with("eventType", "ObjectEvent");

    let trees = engine
        .execute_format(stream(sample_events()), &params, &CancelToken::new())
        .unwrap();
    assert_eq!(trees.len(), 2);
    assert!(trees.iter().all(|tree| tree.name == "ObjectEvent"));
}

#[test]
fn engine_aborts_the_batch_on_unformattable_events() {
    let engine = QueryEngine::with_builtin_filters();
    let events = vec![
        record("a", EventKind::Object, 0),
        record("b", EventKind::Aggregation, 10),
    ];

    let result = engine.execute_format(stream(events), &QueryParams::new(), &CancelToken::new());
    assert!(matches!(result, Err(QueryError::Format(_))));
}

#[test]
fn builtin_pipeline_combines_criteria() {
    let mut events = sample_events();
    events[0].business_step = Some("urn:epcglobal:cbv:bizstep:shipping".to_string());
    events[2].business_step = Some("urn:epcglobal:cbv:bizstep:shipping".to_string());

    let engine = QueryEngine::with_builtin_filters();
    let params = QueryParams::new()
        .with("eventType", "ObjectEvent")
        .with("EQ_bizStep", "urn:epcglobal:cbv:bizstep:shipping")
        .with("GE_eventTime", "2024-01-15T10:10:00Z");

    let result = engine
        .execute(stream(events), &params, &CancelToken::new())
        .unwrap();
    assert_eq!(markers(&result), vec!["c"]);
}
