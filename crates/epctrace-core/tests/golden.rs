use chrono::{DateTime, Utc};
use epctrace_core::{
    BusinessTransaction, CustomField, Epc, EventAction, EventKind, EventRecord, FieldPlacement,
    SourceDestDirection, SourceDestination,
};
use serde_json::json;

fn timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .unwrap()
        .with_timezone(&Utc)
}

#[test]
fn action_serializes_upper_cased() {
    assert_eq!(
        serde_json::to_string(&EventAction::Observe).unwrap(),
        r#""OBSERVE""#
    );
}

#[test]
fn kind_serializes_lower_cased() {
    assert_eq!(
        serde_json::to_string(&EventKind::Transformation).unwrap(),
        r#""transformation""#
    );
}

#[test]
fn kind_parses_wire_names() {
    assert_eq!(
        "ObjectEvent".parse::<EventKind>().unwrap(),
        EventKind::Object
    );
    assert_eq!(
        "TransactionEvent".parse::<EventKind>().unwrap(),
        EventKind::Transaction
    );
    assert!("PurchaseEvent".parse::<EventKind>().is_err());
}

#[test]
fn action_parses_wire_values_only() {
    assert_eq!("ADD".parse::<EventAction>().unwrap(), EventAction::Add);
    assert!("Add".parse::<EventAction>().is_err());
}

#[test]
fn epc_entry_omits_absent_quantity_fields() {
    let entry = Epc::list("urn:epc:id:sgtin:0614141.107346.2017");
    let serialized = serde_json::to_value(&entry).unwrap();
    assert_eq!(
        serialized,
        json!({
            "id": "urn:epc:id:sgtin:0614141.107346.2017",
            "type": "list"
        })
    );
}

#[test]
fn quantity_epc_carries_quantity_and_uom() {
    let entry = Epc::quantity("urn:epc:class:lgtin:4012345.012345.998877", Some(200.0), Some("KGM".into()));
    let serialized = serde_json::to_value(&entry).unwrap();
    assert_eq!(
        serialized,
        json!({
            "id": "urn:epc:class:lgtin:4012345.012345.998877",
            "type": "quantity",
            "quantity": 200.0,
            "unit_of_measure": "KGM"
        })
    );
}

#[test]
fn record_round_trips_through_json() {
    let mut record = EventRecord::new(
        EventKind::Object,
        timestamp("2024-01-15T10:30:00.250Z"),
        timestamp("2024-01-15T10:31:02Z"),
        "+02:00",
        EventAction::Add,
    );
    record.epcs.push(Epc::list("urn:epc:id:sgtin:0614141.107346.2017"));
    record.business_step = Some("urn:epcglobal:cbv:bizstep:shipping".into());
    record.business_transactions.push(BusinessTransaction {
        transaction_type: "urn:epcglobal:cbv:btt:po".into(),
        id: "http://transaction.acme.com/po/12345678".into(),
    });
    record.sources_destinations.push(SourceDestination {
        direction: SourceDestDirection::Source,
        relation_type: "urn:epcglobal:cbv:sdt:possessing_party".into(),
        id: "urn:epc:id:sgln:4012345.00225.0".into(),
    });
    record.custom_fields.push(CustomField {
        name: "temperature".into(),
        namespace: "http://ns.acme.com/epcis".into(),
        value: "4.5".into(),
        placement: FieldPlacement::Ilmd,
    });

    let serialized = serde_json::to_value(&record).unwrap();
    let restored: EventRecord = serde_json::from_value(serialized).unwrap();
    assert_eq!(restored, record);
}

#[test]
fn record_json_omits_absent_optionals() {
    let record = EventRecord::new(
        EventKind::Transaction,
        timestamp("2024-01-15T10:30:00Z"),
        timestamp("2024-01-15T10:31:00Z"),
        "+00:00",
        EventAction::Observe,
    );
    let serialized = serde_json::to_value(&record).unwrap();
    let object = serialized.as_object().unwrap();
    assert!(!object.contains_key("business_step"));
    assert!(!object.contains_key("disposition"));
    assert!(!object.contains_key("transformation_id"));
}
