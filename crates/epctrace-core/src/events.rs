use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;
use crate::shared::{BusinessTransaction, CustomField, SourceDestination};

/// Kind of traceability event.
///
/// The output layer formats `Object`, `Transaction`, and `Transformation`
/// events; the remaining kinds exist in the capture vocabulary and are
/// rejected by the formatter until a wire representation is defined for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// Observation of one or more objects.
    Object,
    /// Objects grouped under business transactions.
    Transaction,
    /// Inputs consumed and outputs produced by a process.
    Transformation,
    /// Objects physically aggregated to a container.
    Aggregation,
    /// Quantity observation of an object class.
    Quantity,
}

impl EventKind {
    /// Root tag name of this kind on the wire (e.g. `ObjectEvent`).
    pub fn wire_name(&self) -> &'static str {
        match self {
            EventKind::Object => "ObjectEvent",
            EventKind::Transaction => "TransactionEvent",
            EventKind::Transformation => "TransformationEvent",
            EventKind::Aggregation => "AggregationEvent",
            EventKind::Quantity => "QuantityEvent",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for EventKind {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "ObjectEvent" => Ok(EventKind::Object),
            "TransactionEvent" => Ok(EventKind::Transaction),
            "TransformationEvent" => Ok(EventKind::Transformation),
            "AggregationEvent" => Ok(EventKind::Aggregation),
            "QuantityEvent" => Ok(EventKind::Quantity),
            _ => Err(CoreError::UnknownEventKind(value.to_string())),
        }
    }
}

/// Action taken on the EPCs of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventAction {
    /// EPCs were commissioned or added.
    Add,
    /// EPCs were observed without a state change.
    Observe,
    /// EPCs were decommissioned or removed.
    Delete,
}

impl EventAction {
    /// Upper-cased wire value (`ADD`, `OBSERVE`, `DELETE`).
    pub fn wire_value(&self) -> &'static str {
        match self {
            EventAction::Add => "ADD",
            EventAction::Observe => "OBSERVE",
            EventAction::Delete => "DELETE",
        }
    }
}

impl fmt::Display for EventAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_value())
    }
}

impl FromStr for EventAction {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "ADD" => Ok(EventAction::Add),
            "OBSERVE" => Ok(EventAction::Observe),
            "DELETE" => Ok(EventAction::Delete),
            _ => Err(CoreError::UnknownAction(value.to_string())),
        }
    }
}

/// Subtype of an EPC entry: instance identifier or class quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EpcType {
    /// Instance-level identifier, listed in `epcList`.
    List,
    /// Class-level quantity, listed in the quantity group.
    Quantity,
}

/// One EPC entry of an event.
///
/// `quantity` and `unit_of_measure` are only meaningful when `epc_type`
/// is [`EpcType::Quantity`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Epc {
    /// Instance identifier or class identifier, depending on subtype.
    pub id: String,
    /// EPC subtype.
    #[serde(rename = "type")]
    pub epc_type: EpcType,
    /// Observed quantity for class-level entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    /// Unit of measure for class-level entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_of_measure: Option<String>,
}

impl Epc {
    /// Creates an instance-level (`List`) entry.
    pub fn list(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            epc_type: EpcType::List,
            quantity: None,
            unit_of_measure: None,
        }
    }

    /// Creates a class-level (`Quantity`) entry.
    pub fn quantity(
        id: impl Into<String>,
        quantity: Option<f64>,
        unit_of_measure: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            epc_type: EpcType::Quantity,
            quantity,
            unit_of_measure,
        }
    }
}

/// One traceability event: a record of an action taken on one or more EPCs
/// at a time and place.
///
/// Records are immutable once captured; this crate only carries the data,
/// it never recomputes timestamps or offsets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Event kind; fixed at creation.
    pub kind: EventKind,
    /// When the event occurred.
    pub event_time: DateTime<Utc>,
    /// When the event was captured by the repository.
    pub capture_time: DateTime<Utc>,
    /// Pre-computed display representation of the event timezone offset
    /// (e.g. `+02:00`); emitted verbatim.
    pub timezone_offset: String,
    /// EPC entries in capture order.
    pub epcs: Vec<Epc>,
    /// Action taken on the EPCs.
    pub action: EventAction,
    /// Business step identifier; empty or absent values are never emitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_step: Option<String>,
    /// Disposition identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disposition: Option<String>,
    /// Read point identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_point: Option<String>,
    /// Business location identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_location: Option<String>,
    /// Business transactions in capture order.
    pub business_transactions: Vec<BusinessTransaction>,
    /// Source and destination links in capture order.
    pub sources_destinations: Vec<SourceDestination>,
    /// Custom fields with their output placement.
    pub custom_fields: Vec<CustomField>,
    /// Transformation identifier; meaningful only for Transformation events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transformation_id: Option<String>,
}

impl EventRecord {
    /// Creates an empty record of the given kind; the capture pipeline
    /// populates the remaining fields.
    pub fn new(
        kind: EventKind,
        event_time: DateTime<Utc>,
        capture_time: DateTime<Utc>,
        timezone_offset: impl Into<String>,
        action: EventAction,
    ) -> Self {
        Self {
            kind,
            event_time,
            capture_time,
            timezone_offset: timezone_offset.into(),
            epcs: Vec::new(),
            action,
            business_step: None,
            disposition: None,
            read_point: None,
            business_location: None,
            business_transactions: Vec::new(),
            sources_destinations: Vec::new(),
            custom_fields: Vec::new(),
            transformation_id: None,
        }
    }
}
