//! Records, field maps, and kind discriminators
//!
//! A [`Record`] is the unit of storage: a kind tag, the unique storage key, and
//! kind-specific scalar fields. Records serialize to flat JSON objects, which
//! is also the shape the substrate's structural queries select on.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Discriminator distinguishing structurally different asset types that share
/// the same repository operations.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordKind(String);

impl RecordKind {
    /// Wrap a raw kind tag.
    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }

    /// The raw kind tag.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordKind {
    fn from(kind: &str) -> Self {
        Self(kind.to_string())
    }
}

/// Kind-specific scalar fields, keyed by field name. Ordered so serialized
/// payloads are stable.
pub type FieldMap = BTreeMap<String, String>;

/// The unit of storage.
///
/// Within one collection the `id` is unique at any point of committed history;
/// the repository enforces that a deleted id is never re-created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Kind tag, stored alongside the fields so structural queries can select
    /// on it.
    #[serde(rename = "assetType")]
    pub kind: RecordKind,

    /// The storage key.
    pub id: String,

    /// Kind-specific scalar fields.
    #[serde(flatten)]
    pub fields: FieldMap,
}

impl Record {
    /// Build a record from its parts.
    pub fn new(kind: RecordKind, id: impl Into<String>, fields: FieldMap) -> Self {
        Self {
            kind,
            id: id.into(),
            fields,
        }
    }

    /// A field value, if present.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Set or overwrite a field value.
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Serialize to the stored JSON payload.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode a stored JSON payload.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(Error::from)
    }

    /// True when every named field is present and equal between `self` and
    /// `other`. A field missing on either side compares unequal.
    pub fn fields_equal(&self, other: &Record, names: &[String]) -> bool {
        names.iter().all(|name| {
            matches!(
                (self.field(name), other.field(name)),
                (Some(a), Some(b)) if a == b
            )
        })
    }
}
