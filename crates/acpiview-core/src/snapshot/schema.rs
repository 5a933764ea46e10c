//! JSON Schema validation for record snapshots.
//!
//! Snapshots are checked against schema/records.schema.json before they are
//! deserialised, so a typo in a field name is reported instead of silently
//! defaulted.

use std::sync::OnceLock;

/// Embedded snapshot schema (loaded at compile time).
const RECORDS_SCHEMA_JSON: &str = include_str!("../../../../schema/records.schema.json");

/// Compiled JSON Schema validator (initialized once, reused).
static COMPILED_SCHEMA: OnceLock<Result<jsonschema::Validator, String>> = OnceLock::new();

fn get_validator() -> Result<&'static jsonschema::Validator, String> {
    let result = COMPILED_SCHEMA.get_or_init(|| {
        let schema_value: serde_json::Value = serde_json::from_str(RECORDS_SCHEMA_JSON)
            .map_err(|e| format!("Invalid schema JSON: {}", e))?;

        jsonschema::options()
            .build(&schema_value)
            .map_err(|e| format!("Failed to compile schema: {}", e))
    });

    result.as_ref().map_err(Clone::clone)
}

/// Validate a snapshot JSON value against the schema.
///
/// Returns every violation, formatted as `message at /instance/path`.
pub fn validate_snapshot_schema(snapshot: &serde_json::Value) -> Result<(), Vec<String>> {
    let validator = get_validator().map_err(|e| vec![e])?;

    let errors: Vec<String> = validator
        .iter_errors(snapshot)
        .map(|e| format!("{} at {}", e, e.instance_path))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
