//! Deterministic transform from event records into wire trees.
//!
//! Element names, ordering, and conditional inclusion reproduce the
//! externally fixed event schema; the transform is one-directional and never
//! parses wire trees back into records.

use epctrace_core::{
    CustomField, EpcType, EventKind, EventRecord, FieldPlacement, SourceDestDirection,
};

use crate::errors::FormatError;
use crate::tree::WireElement;

/// Textual timestamp format for Object and Transaction events:
/// 4-digit year, millisecond precision, literal `Z` suffix.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Formats one event record into its wire tree.
///
/// Dispatches on the event kind; kinds without a wire representation fail
/// with [`FormatError::UnsupportedEventKind`].
///
/// # Example
///
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use epctrace_core::{EventAction, EventKind, EventRecord};
/// use epctrace_format::format_event;
///
/// let record = EventRecord::new(
///     EventKind::Object,
///     Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap(),
///     Utc.with_ymd_and_hms(2024, 1, 15, 10, 31, 0).unwrap(),
///     "+02:00",
///     EventAction::Add,
/// );
///
/// let tree = format_event(&record)?;
/// assert_eq!(tree.name, "ObjectEvent");
/// # Ok::<(), epctrace_format::FormatError>(())
/// ```
pub fn format_event(event: &EventRecord) -> Result<WireElement, FormatError> {
    match event.kind {
        EventKind::Object | EventKind::Transaction => Ok(format_standard_event(event)),
        EventKind::Transformation => Ok(format_transformation_event(event)),
        kind => Err(FormatError::UnsupportedEventKind { kind }),
    }
}

/// Object and Transaction events share one layout; only the root tag differs.
fn format_standard_event(event: &EventRecord) -> WireElement {
    let mut element = WireElement::new(event.kind.wire_name());

    element.push_child(WireElement::with_text(
        "eventTime",
        event.event_time.format(DATE_TIME_FORMAT).to_string(),
    ));
    element.push_child(WireElement::with_text(
        "recordTime",
        event.capture_time.format(DATE_TIME_FORMAT).to_string(),
    ));
    element.push_child(WireElement::with_text(
        "eventTimeZoneOffset",
        &event.timezone_offset,
    ));

    add_epcs(event, &mut element);

    element.push_child(WireElement::with_text("action", event.action.wire_value()));

    add_optional(&mut element, "bizStep", &event.business_step);
    add_optional(&mut element, "disposition", &event.disposition);

    add_read_point(event, &mut element);
    add_business_location(event, &mut element);
    add_business_transactions(event, &mut element);
    add_ilmd(event, &mut element);
    add_sources_destinations(event, &mut element);
    add_custom_fields(event, &mut element);

    element
}

/// Transformation events drop the business transaction and source/destination
/// sections and add `transformationID`. Their timestamps keep the record's
/// native representation.
fn format_transformation_event(event: &EventRecord) -> WireElement {
    let mut element = WireElement::new(EventKind::Transformation.wire_name());

    element.push_child(WireElement::with_text(
        "eventTime",
        event.event_time.to_string(),
    ));
    element.push_child(WireElement::with_text(
        "recordTime",
        event.capture_time.to_string(),
    ));
    element.push_child(WireElement::with_text(
        "eventTimeZoneOffset",
        &event.timezone_offset,
    ));

    add_epcs(event, &mut element);

    element.push_child(WireElement::with_text("action", event.action.wire_value()));

    // The wire value mirrors bizStep; downstream consumers rely on the
    // historical shape.
    if non_empty(&event.transformation_id).is_some() {
        element.push_child(WireElement::with_text(
            "transformationID",
            event.business_step.clone().unwrap_or_default(),
        ));
    }

    add_optional(&mut element, "bizStep", &event.business_step);
    add_optional(&mut element, "disposition", &event.disposition);

    add_read_point(event, &mut element);
    add_business_location(event, &mut element);
    add_ilmd(event, &mut element);
    add_custom_fields(event, &mut element);

    element
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}

fn add_optional(element: &mut WireElement, name: &str, value: &Option<String>) {
    if let Some(value) = non_empty(value) {
        element.push_child(WireElement::with_text(name, value));
    }
}

/// Instance EPCs land in `epcList`; class-level EPCs form the `epcQuantity`
/// group inside the extension container. Either section is omitted when
/// empty.
fn add_epcs(event: &EventRecord, element: &mut WireElement) {
    let mut epc_list = WireElement::new("epcList");
    let mut epc_quantity = WireElement::new("epcQuantity");

    for epc in event.epcs.iter().filter(|epc| epc.epc_type == EpcType::List) {
        epc_list.push_child(WireElement::with_text("epc", &epc.id));
    }

    for epc in event
        .epcs
        .iter()
        .filter(|epc| epc.epc_type == EpcType::Quantity)
    {
        let mut quantity_element = WireElement::new("quantityElement");
        quantity_element.push_child(WireElement::with_text("epcClass", &epc.id));
        if let Some(quantity) = epc.quantity {
            quantity_element.push_child(WireElement::with_text("quantity", quantity.to_string()));
        }
        if let Some(uom) = epc.unit_of_measure.as_deref().filter(|uom| !uom.is_empty()) {
            quantity_element.push_child(WireElement::with_text("uom", uom));
        }
        epc_quantity.push_child(quantity_element);
    }

    if epc_list.has_children() {
        element.push_child(epc_list);
    }
    if epc_quantity.has_children() {
        element.extension_mut().push_child(epc_quantity);
    }
}

fn add_read_point(event: &EventRecord, element: &mut WireElement) {
    let read_point = match non_empty(&event.read_point) {
        Some(value) => value,
        None => return,
    };

    let mut node = WireElement::new("readPoint");
    node.push_child(WireElement::with_text("id", read_point));
    for field in placed(event, FieldPlacement::ReadPointExtension) {
        node.push_child(custom_field_element(field));
    }
    element.push_child(node);
}

fn add_business_location(event: &EventRecord, element: &mut WireElement) {
    let location = match non_empty(&event.business_location) {
        Some(value) => value,
        None => return,
    };

    let mut node = WireElement::new("bizLocation");
    node.push_child(WireElement::with_text("id", location));
    for field in placed(event, FieldPlacement::BusinessLocationExtension) {
        node.push_child(custom_field_element(field));
    }
    element.push_child(node);
}

fn add_business_transactions(event: &EventRecord, element: &mut WireElement) {
    if event.business_transactions.is_empty() {
        return;
    }

    let mut list = WireElement::new("bizTransactionList");
    for transaction in &event.business_transactions {
        let mut node = WireElement::with_text("bizTransaction", &transaction.id);
        node.set_attribute("type", &transaction.transaction_type);
        list.push_child(node);
    }
    element.push_child(list);
}

fn add_ilmd(event: &EventRecord, element: &mut WireElement) {
    let fields: Vec<&CustomField> = placed(event, FieldPlacement::Ilmd).collect();
    if fields.is_empty() {
        return;
    }

    let mut ilmd = WireElement::new("ilmd");
    for field in fields {
        ilmd.push_child(custom_field_element(field));
    }
    element.extension_mut().push_child(ilmd);
}

/// Sources and destinations are partitioned by direction into independent
/// groups; each group joins the extension container only if non-empty.
fn add_sources_destinations(event: &EventRecord, element: &mut WireElement) {
    if event.sources_destinations.is_empty() {
        return;
    }

    let mut sources = WireElement::new("sourceList");
    let mut destinations = WireElement::new("destinationList");

    for entry in &event.sources_destinations {
        let name = match entry.direction {
            SourceDestDirection::Source => "source",
            SourceDestDirection::Destination => "destination",
        };
        let mut node = WireElement::with_text(name, &entry.id);
        node.set_attribute("type", &entry.relation_type);
        match entry.direction {
            SourceDestDirection::Source => sources.push_child(node),
            SourceDestDirection::Destination => destinations.push_child(node),
        }
    }

    if sources.has_children() {
        element.extension_mut().push_child(sources);
    }
    if destinations.has_children() {
        element.extension_mut().push_child(destinations);
    }
}

fn add_custom_fields(event: &EventRecord, element: &mut WireElement) {
    for field in placed(event, FieldPlacement::EventExtension) {
        element.push_child(custom_field_element(field));
    }
}

fn custom_field_element(field: &CustomField) -> WireElement {
    let mut node = WireElement::with_text(&field.name, &field.value);
    if !field.namespace.is_empty() {
        node.namespace = Some(field.namespace.clone());
    }
    node
}

fn placed<'a>(
    event: &'a EventRecord,
    placement: FieldPlacement,
) -> impl Iterator<Item = &'a CustomField> {
    event
        .custom_fields
        .iter()
        .filter(move |field| field.placement == placement)
}
