//! Case parsing from YAML/JSON.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use super::schema::validate_case_schema;

/// Errors that can occur when loading case facts.
#[derive(Error, Debug)]
pub enum CaseError {
    #[error("Failed to read case file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Case does not match schema: {}", .0.join("; "))]
    SchemaViolation(Vec<String>),

    #[error("Case validation failed: {0}")]
    ValidationError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Legal theory a claim rests on.
///
/// Unrecognized claim names deserialize to [`ClaimType::Other`] and carry no
/// base value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimType {
    WrongfulTermination,
    DisabilityDiscrimination,
    Harassment,
    Retaliation,
    WageClaims,
    #[serde(other)]
    Other,
}

impl ClaimType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimType::WrongfulTermination => "wrongful_termination",
            ClaimType::DisabilityDiscrimination => "disability_discrimination",
            ClaimType::Harassment => "harassment",
            ClaimType::Retaliation => "retaliation",
            ClaimType::WageClaims => "wage_claims",
            ClaimType::Other => "other",
        }
    }

    /// Base settlement value contributed by this claim.
    ///
    /// Wage claims are calculated from the economic damages already in the
    /// base, so they contribute nothing extra here.
    pub fn base_value(&self) -> f64 {
        match self {
            ClaimType::WrongfulTermination => 50_000.0,
            ClaimType::DisabilityDiscrimination => 75_000.0,
            ClaimType::Harassment => 60_000.0,
            ClaimType::Retaliation => 45_000.0,
            ClaimType::WageClaims => 0.0,
            ClaimType::Other => 0.0,
        }
    }
}

/// Precedent and market data for the case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegalContext {
    #[serde(default)]
    pub favorable_precedents: u32,

    /// Average settlement in comparable matters
    #[serde(default)]
    pub average_settlement: f64,

    /// Number of comparable cases backing the estimate
    #[serde(default)]
    pub comparable_cases: u32,
}

/// The normalized facts of a case.
///
/// Every numeric field defaults to zero so partially filled records still score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseFacts {
    pub case_id: String,

    #[serde(default)]
    pub mission_name: Option<String>,

    #[serde(default)]
    pub summary: String,

    #[serde(default)]
    pub legal_issues: Vec<String>,

    #[serde(default)]
    pub regulatory_context: Vec<String>,

    #[serde(default)]
    pub human_story: Option<String>,

    #[serde(default)]
    pub jurisdiction: Option<String>,

    #[serde(default)]
    pub claim_types: Vec<ClaimType>,

    /// Provable economic loss
    #[serde(default)]
    pub economic_damages: f64,

    /// Total damages claimed; falls back to `economic_damages`
    #[serde(default)]
    pub claimed_damages: Option<f64>,

    /// 0–10
    #[serde(default)]
    pub emotional_distress_severity: f64,

    #[serde(default)]
    pub punitive_damages_viable: bool,

    /// 0–10
    #[serde(default)]
    pub public_interest: f64,

    #[serde(default)]
    pub legal_context: LegalContext,
}

impl CaseFacts {
    /// Create an otherwise empty case.
    pub fn new(case_id: impl Into<String>) -> Self {
        Self {
            case_id: case_id.into(),
            ..Default::default()
        }
    }

    /// Parse case facts from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, CaseError> {
        let value: serde_json::Value = serde_yaml::from_str(yaml)?;
        Self::from_value(value)
    }

    /// Parse case facts from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, CaseError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Parse case facts from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, CaseError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse case facts from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CaseError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parse a file, choosing the format by extension (`.json` or YAML otherwise).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CaseError> {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json_file(path)
        } else {
            Self::from_yaml_file(path)
        }
    }

    fn from_value(value: serde_json::Value) -> Result<Self, CaseError> {
        validate_case_schema(&value).map_err(CaseError::SchemaViolation)?;
        let case: CaseFacts = serde_json::from_value(value)?;
        case.validate()?;
        Ok(case)
    }

    /// Semantic checks beyond the schema.
    ///
    /// Also applies to records built in code, which never pass through the schema.
    pub fn validate(&self) -> Result<(), CaseError> {
        if self.case_id.trim().is_empty() {
            return Err(CaseError::MissingField("case_id".to_string()));
        }

        let non_negative = [
            ("economic_damages", self.economic_damages),
            ("claimed_damages", self.claimed_damages.unwrap_or(0.0)),
            ("legal_context.average_settlement", self.legal_context.average_settlement),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(CaseError::ValidationError(format!(
                    "{} must be a non-negative number, got {}",
                    field, value
                )));
            }
        }

        let scales = [
            ("emotional_distress_severity", self.emotional_distress_severity),
            ("public_interest", self.public_interest),
        ];
        for (field, value) in scales {
            if !(0.0..=10.0).contains(&value) {
                return Err(CaseError::ValidationError(format!(
                    "{} must be within 0-10, got {}",
                    field, value
                )));
            }
        }

        Ok(())
    }

    /// Damages used for financial exposure.
    pub fn damages_at_stake(&self) -> f64 {
        self.claimed_damages.unwrap_or(self.economic_damages)
    }

    /// Display name for prompts and reports.
    pub fn display_name(&self) -> &str {
        self.mission_name.as_deref().unwrap_or(&self.case_id)
    }
}
