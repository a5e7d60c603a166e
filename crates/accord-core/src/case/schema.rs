//! JSON Schema validation for case files.
//!
//! Case files are validated against schema/case.schema.json, embedded at
//! compile time and compiled once per process.

use std::sync::OnceLock;
use thiserror::Error;

const CASE_SCHEMA_JSON: &str = include_str!("../../../../schema/case.schema.json");

static COMPILED_SCHEMA: OnceLock<Result<jsonschema::Validator, String>> = OnceLock::new();

/// Errors from schema loading.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Failed to load schema: {0}")]
    LoadError(String),
}

fn get_validator() -> Result<&'static jsonschema::Validator, SchemaError> {
    let result = COMPILED_SCHEMA.get_or_init(|| {
        let schema_value: serde_json::Value = serde_json::from_str(CASE_SCHEMA_JSON)
            .map_err(|e| format!("Invalid schema JSON: {}", e))?;

        jsonschema::options()
            .build(&schema_value)
            .map_err(|e| format!("Failed to compile schema: {}", e))
    });

    result
        .as_ref()
        .map_err(|e| SchemaError::LoadError(e.clone()))
}

/// Validate a case JSON value against the schema.
///
/// Returns every violation, each suffixed with its instance path.
pub fn validate_case_schema(case_json: &serde_json::Value) -> Result<(), Vec<String>> {
    let validator = get_validator().map_err(|e| vec![e.to_string()])?;

    let errors: Vec<String> = validator
        .iter_errors(case_json)
        .map(|e| format!("{} at {}", e, e.instance_path))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Check whether a case JSON value satisfies the schema.
pub fn is_valid_case(case_json: &serde_json::Value) -> bool {
    get_validator()
        .map(|v| v.is_valid(case_json))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_case_passes() {
        let value = serde_json::json!({ "case_id": "case-001" });
        assert!(validate_case_schema(&value).is_ok());
    }

    #[test]
    fn test_missing_case_id_fails() {
        let value = serde_json::json!({ "summary": "no id" });
        let errors = validate_case_schema(&value).unwrap_err();
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_distress_out_of_range_fails() {
        let value = serde_json::json!({
            "case_id": "case-001",
            "emotional_distress_severity": 11
        });
        assert!(validate_case_schema(&value).is_err());
    }

    #[test]
    fn test_negative_damages_fail() {
        let value = serde_json::json!({
            "case_id": "case-001",
            "economic_damages": -5
        });
        assert!(validate_case_schema(&value).is_err());
    }

    #[test]
    fn test_unknown_field_fails() {
        let value = serde_json::json!({
            "case_id": "case-001",
            "settlement_wish": 1000000
        });
        assert!(validate_case_schema(&value).is_err());
    }

    #[test]
    fn test_full_case_passes() {
        let value = serde_json::json!({
            "case_id": "hartwell-2024",
            "mission_name": "Hartwell accommodation dispute",
            "summary": "Employee terminated after requesting accommodation",
            "legal_issues": ["ADA accommodation", "retaliation"],
            "regulatory_context": ["EEOC", "state labor board"],
            "human_story": "Twelve years of service ended by a voicemail.",
            "jurisdiction": "CA",
            "claim_types": ["wrongful_termination", "disability_discrimination", "whistleblower"],
            "economic_damages": 85000,
            "claimed_damages": null,
            "emotional_distress_severity": 7,
            "punitive_damages_viable": true,
            "public_interest": 6,
            "legal_context": {
                "favorable_precedents": 3,
                "average_settlement": 150000,
                "comparable_cases": 2
            }
        });
        assert!(validate_case_schema(&value).is_ok());
        assert!(is_valid_case(&value));
    }

    #[test]
    fn test_is_valid_helper_rejects() {
        assert!(!is_valid_case(&serde_json::json!({ "case_id": "" })));
    }
}
