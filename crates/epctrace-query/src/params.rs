use serde::{Deserialize, Serialize};

/// One named query parameter with its values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParam {
    /// Parameter name from the standard's query vocabulary
    /// (e.g. `eventType`, `GE_eventTime`).
    pub name: String,
    /// Values in supply order; most parameters accept several.
    pub values: Vec<String>,
}

/// Opaque, caller-supplied criteria bag.
///
/// The transport layer builds one from the request; the engine passes it to
/// every filter unchanged, and filters inspect it by name/value. Parameter
/// order is preserved for deterministic error reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParams {
    params: Vec<QueryParam>,
}

impl QueryParams {
    /// Creates an empty criteria bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value to the named parameter, creating it if absent.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.params.iter_mut().find(|param| param.name == name) {
            Some(param) => param.values.push(value),
            None => self.params.push(QueryParam {
                name,
                values: vec![value],
            }),
        }
    }

    /// Builder form of [`push`](Self::push).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    /// Returns true if the named parameter was supplied.
    pub fn contains(&self, name: &str) -> bool {
        self.params.iter().any(|param| param.name == name)
    }

    /// Values of the named parameter; empty if absent.
    pub fn values(&self, name: &str) -> &[String] {
        self.params
            .iter()
            .find(|param| param.name == name)
            .map(|param| param.values.as_slice())
            .unwrap_or(&[])
    }

    /// First value of the named parameter.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.values(name).first().map(String::as_str)
    }

    /// Parameter names in supply order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|param| param.name.as_str())
    }

    /// Returns true if no parameter was supplied.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Number of distinct parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_groups_values_under_one_name() {
        let params = QueryParams::new()
            .with("eventType", "ObjectEvent")
            .with("eventType", "TransactionEvent")
            .with("EQ_action", "ADD");

        assert_eq!(params.len(), 2);
        assert_eq!(
            params.values("eventType"),
            ["ObjectEvent", "TransactionEvent"]
        );
        assert_eq!(params.first("EQ_action"), Some("ADD"));
        assert!(params.values("EQ_bizStep").is_empty());
    }
}
