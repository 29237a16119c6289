//! Request input validation against JSON schemas

use crate::error::InspectError;
use serde_json::Value;

pub type Result<T> = std::result::Result<T, InspectError>;

/// Validate input against an operation's input schema
pub fn validate_input(input: &Value, schema: &Value) -> Result<()> {
    if let Some(required) = schema.get("required").and_then(|r| r.as_array()) {
        for field_name in required {
            let field_str = field_name.as_str()
                .ok_or_else(|| InspectError::ValidationError("Invalid schema: required field not a string".to_string()))?;

            if input.get(field_str).is_none() {
                return Err(InspectError::ValidationError(
                    format!("Missing required field: {}", field_str)
                ));
            }
        }
    }

    if let Some(properties) = schema.get("properties").and_then(|p| p.as_object()) {
        if let Some(input_obj) = input.as_object() {
            for (key, value) in input_obj {
                if let Some(prop_schema) = properties.get(key) {
                    validate_type(key, value, prop_schema)?;
                }
            }
        }
    }

    Ok(())
}

/// Validate that a value matches the expected type, recursing into array items
fn validate_type(key: &str, value: &Value, schema: &Value) -> Result<()> {
    if let Some(expected_type) = schema.get("type").and_then(|t| t.as_str()) {
        let valid = match expected_type {
            "string" => value.is_string(),
            "integer" => value.is_u64() || value.is_i64(),
            "number" => value.is_number(),
            "boolean" => value.is_boolean(),
            "array" => value.is_array(),
            "object" => value.is_object(),
            "null" => value.is_null(),
            _ => true, // Unknown types pass validation
        };

        if !valid {
            return Err(InspectError::ValidationError(
                format!("Type mismatch for {}: expected {}, got {}", key, expected_type, value)
            ));
        }
    }

    if let (Some(n), Some(minimum)) = (value.as_f64(), schema.get("minimum").and_then(|m| m.as_f64())) {
        if n < minimum {
            return Err(InspectError::ValidationError(
                format!("{} must be at least {}, got {}", key, minimum, value)
            ));
        }
    }

    if let (Some(items), Some(item_schema)) = (value.as_array(), schema.get("items")) {
        if let Some(n) = schema.get("minItems").and_then(|n| n.as_u64()) {
            if (items.len() as u64) < n {
                return Err(InspectError::ValidationError(
                    format!("{} needs at least {} items, got {}", key, n, items.len())
                ));
            }
        }
        if let Some(n) = schema.get("maxItems").and_then(|n| n.as_u64()) {
            if (items.len() as u64) > n {
                return Err(InspectError::ValidationError(
                    format!("{} allows at most {} items, got {}", key, n, items.len())
                ));
            }
        }
        for item in items {
            validate_type(key, item, item_schema)?;
        }
    }

    Ok(())
}
