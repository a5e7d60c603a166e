//! Case facts: the normalized record a mission is run against.

mod parser;
mod schema;

pub use parser::{CaseError, CaseFacts, ClaimType, LegalContext};
pub use schema::{is_valid_case, validate_case_schema, SchemaError};
