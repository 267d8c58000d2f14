//! Schema descriptors driving the generic repository
//!
//! A [`RecordSchema`] value carries a kind tag and the field list with
//! required-ness. The repository is generic over it, so record kinds differ
//! in data, not in code.

use crate::error::{Error, Result};
use crate::record::{FieldMap, Record, RecordKind};
use serde::{Deserialize, Serialize};

/// One field of a record kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name as it appears in the stored payload.
    pub name: String,
    /// Required fields must be present and non-blank at create time.
    pub required: bool,
}

impl FieldSpec {
    /// A required field.
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: true,
        }
    }

    /// An optional field.
    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
        }
    }
}

/// Descriptor for one record kind: the kind tag plus its field list.
///
/// All repository operations are parameterized by a schema, so adding a record
/// kind is a data change, not a code change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSchema {
    /// Kind tag written into every stored record.
    pub kind: RecordKind,
    /// Declared fields.
    pub fields: Vec<FieldSpec>,
}

impl RecordSchema {
    /// Build a schema from its parts.
    pub fn new(kind: impl Into<RecordKind>, fields: Vec<FieldSpec>) -> Self {
        Self {
            kind: kind.into(),
            fields,
        }
    }

    /// Check the field map against the declared fields and assemble a record.
    ///
    /// Fails with [`Error::Validation`] when the id or any required field is
    /// blank or missing. Undeclared fields are passed through untouched: the
    /// ledger's structural queries treat the payload as a flat document, and
    /// match/confirm operations add fields the create path does not know about.
    pub fn build_record(&self, id: &str, fields: FieldMap) -> Result<Record> {
        if id.trim().is_empty() {
            return Err(Error::validation("id", "must not be blank"));
        }
        for spec in self.fields.iter().filter(|spec| spec.required) {
            match fields.get(&spec.name) {
                Some(value) if !value.trim().is_empty() => {}
                _ => {
                    return Err(Error::validation(&spec.name, "required field is blank"));
                }
            }
        }
        Ok(Record::new(self.kind.clone(), id, fields))
    }

    /// Decode a stored payload and check its kind tag against this schema.
    pub fn decode(&self, bytes: &[u8]) -> Result<Record> {
        let record = Record::from_bytes(bytes)?;
        if record.kind != self.kind {
            return Err(Error::Serialization(format!(
                "expected a {} record, found {}",
                self.kind, record.kind
            )));
        }
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> RecordSchema {
        RecordSchema::new(
            "Result",
            vec![
                FieldSpec::required("studentId"),
                FieldSpec::optional("status"),
            ],
        )
    }

    #[test]
    fn builds_record_with_kind_tag() {
        let mut fields = FieldMap::new();
        fields.insert("studentId".into(), "S1".into());
        let record = schema().build_record("R1", fields).unwrap();
        assert_eq!(record.kind.as_str(), "Result");
        assert_eq!(record.id, "R1");
    }

    #[test]
    fn blank_required_field_fails_validation() {
        let mut fields = FieldMap::new();
        fields.insert("studentId".into(), "   ".into());
        let err = schema().build_record("R1", fields).unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "studentId"));
    }

    #[test]
    fn blank_id_fails_validation() {
        let mut fields = FieldMap::new();
        fields.insert("studentId".into(), "S1".into());
        let err = schema().build_record(" ", fields).unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "id"));
    }

    #[test]
    fn decode_rejects_foreign_kind() {
        let mut fields = FieldMap::new();
        fields.insert("ctc".into(), "30".into());
        let offer = Record::new(RecordKind::new("OfferLetter"), "O1", fields);
        let err = schema().decode(&offer.to_bytes().unwrap()).unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
