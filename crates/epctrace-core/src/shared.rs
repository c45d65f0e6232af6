use serde::{Deserialize, Serialize};

/// Business transaction reference attached to an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessTransaction {
    /// Transaction type identifier (e.g. `urn:epcglobal:cbv:btt:po`).
    #[serde(rename = "type")]
    pub transaction_type: String,
    /// Transaction identifier.
    pub id: String,
}

/// Direction of a source/destination link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceDestDirection {
    /// Party or location the objects came from.
    Source,
    /// Party or location the objects are headed to.
    Destination,
}

/// Source or destination link attached to an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDestination {
    /// Link direction.
    pub direction: SourceDestDirection,
    /// Link type identifier (e.g. `urn:epcglobal:cbv:sdt:owning_party`).
    #[serde(rename = "type")]
    pub relation_type: String,
    /// Party or location identifier.
    pub id: String,
}

/// Output placement of a custom field.
///
/// Placement is the sole schema-extension mechanism: it decides where in the
/// wire tree the field is injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldPlacement {
    /// Instance/lot master data, grouped under `ilmd` in the extension.
    Ilmd,
    /// Direct top-level child of the event root.
    EventExtension,
    /// Direct child of the `readPoint` element.
    ReadPointExtension,
    /// Direct child of the `bizLocation` element.
    BusinessLocationExtension,
}

/// Namespaced custom field captured alongside the base event data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomField {
    /// Local element name.
    pub name: String,
    /// Element namespace; empty for fields without one.
    pub namespace: String,
    /// Field value, emitted as element text.
    pub value: String,
    /// Where the field lands in the output tree.
    pub placement: FieldPlacement,
}
