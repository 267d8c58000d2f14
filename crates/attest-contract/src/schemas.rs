//! Record schemas for the two shipped kinds
//!
//! Academic credential results live in world state; job offers live in the
//! restricted offers collection. Both are plain schema values: adding a kind
//! means adding a constructor here (or loading one from configuration), not
//! duplicating repository code.

use attest_core::{FieldSpec, RecordSchema};

/// Publicly held academic credential result.
///
/// `owner` is absent until a successful reconciliation assigns the candidate's
/// owner; `status` starts as the caller-supplied grade status and is rewritten
/// by match/confirm.
pub fn result_schema() -> RecordSchema {
    RecordSchema::new(
        "Result",
        vec![
            FieldSpec::required("studentId"),
            FieldSpec::required("totalMarks"),
            FieldSpec::required("obtainedMarks"),
            FieldSpec::required("percentage"),
            FieldSpec::required("status"),
            FieldSpec::optional("owner"),
        ],
    )
}

/// Restricted job offer. Created exclusively from transient fields so the
/// sensitive values never appear in public transaction arguments. Carries the
/// reconciliation fields and the owner the match assigns to the target.
pub fn offer_schema() -> RecordSchema {
    RecordSchema::new(
        "OfferLetter",
        vec![
            FieldSpec::required("ctc"),
            FieldSpec::required("dateOfJoining"),
            FieldSpec::required("dateOfRelease"),
            FieldSpec::required("companyName"),
            FieldSpec::optional("name"),
            FieldSpec::optional("email"),
            FieldSpec::optional("owner"),
            FieldSpec::optional("totalMarks"),
            FieldSpec::optional("obtainedMarks"),
            FieldSpec::optional("percentage"),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use attest_core::FieldMap;

    #[test]
    fn offer_requires_the_sensitive_quartet() {
        let schema = offer_schema();
        let mut fields = FieldMap::new();
        fields.insert("ctc".into(), "30".into());
        fields.insert("dateOfJoining".into(), "2026-09-01".into());
        fields.insert("dateOfRelease".into(), "2026-08-25".into());
        assert!(schema.build_record("O1", fields.clone()).is_err());

        fields.insert("companyName".into(), "Initech".into());
        assert!(schema.build_record("O1", fields).is_ok());
    }
}
