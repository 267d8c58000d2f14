//! Structural selectors and sort specifications
//!
//! Selectors are structured values serialized by serde, never hand-assembled
//! query strings, so a malformed selector literal cannot be expressed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field-equality selector over stored JSON payloads.
///
/// A record matches when every listed field is present with exactly the given
/// string value. An empty selector matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selector {
    fields: BTreeMap<String, String>,
}

impl Selector {
    /// An empty selector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field == value`.
    #[must_use]
    pub fn field(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// The required field/value pairs.
    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    /// Evaluate the selector against a decoded payload.
    pub fn matches(&self, value: &serde_json::Value) -> bool {
        self.fields
            .iter()
            .all(|(field, expected)| value.get(field).and_then(|v| v.as_str()) == Some(expected))
    }
}

/// Sort direction for a one-field sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending field order.
    Asc,
    /// Descending field order.
    Desc,
}

/// Orders query results by one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    /// Field to order by; records missing the field sort as the empty string.
    pub field: String,
    /// Direction.
    pub order: SortOrder,
}

impl SortSpec {
    /// Ascending sort on `field`.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Asc,
        }
    }

    /// Descending sort on `field`.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Desc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn selector_requires_every_field() {
        let selector = Selector::new()
            .field("assetType", "Result")
            .field("status", "Pass");
        assert!(selector.matches(&json!({"assetType": "Result", "status": "Pass", "x": "1"})));
        assert!(!selector.matches(&json!({"assetType": "Result", "status": "Fail"})));
        assert!(!selector.matches(&json!({"assetType": "Result"})));
    }

    #[test]
    fn empty_selector_matches_everything() {
        assert!(Selector::new().matches(&json!({"anything": "at all"})));
    }

    #[test]
    fn selector_serializes_as_flat_map() {
        let selector = Selector::new().field("assetType", "Result");
        let json = serde_json::to_value(&selector).unwrap();
        assert_eq!(json, json!({"assetType": "Result"}));
    }
}
