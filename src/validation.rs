//! Input validation for request parameters
//!
//! Malformed parameters are rejected here before any bus emission, with
//! limits on payload size, nesting depth, key counts, and string lengths.
//! Parameters must be JSON objects because the request id is merged into
//! them on the wire.

use crate::error::{Result, StrideError};
use serde_json::Value;

/// Maximum allowed size for a serialized parameter payload (256KB)
const MAX_PARAMS_SIZE_BYTES: usize = 256 * 1024;

/// Maximum nesting depth for parameter objects/arrays
const MAX_PARAMS_DEPTH: usize = 10;

/// Maximum number of keys in a parameter object or items in an array
const MAX_PARAMS_KEYS: usize = 500;

/// Maximum string length for parameter string values
const MAX_PARAMS_STRING_LENGTH: usize = 10_000;

/// Validates request parameters prior to dispatch
pub fn validate_request_params(params: &Value) -> Result<()> {
    if !params.is_object() {
        return Err(StrideError::ValidationError(
            "Request parameters must be a JSON object".to_string(),
        ));
    }

    let serialized = serde_json::to_string(params)
        .map_err(|e| StrideError::ValidationError(format!("Invalid JSON structure: {e}")))?;

    if serialized.len() > MAX_PARAMS_SIZE_BYTES {
        return Err(StrideError::ValidationError(format!(
            "Parameter payload too large: {} bytes (max: {})",
            serialized.len(),
            MAX_PARAMS_SIZE_BYTES
        )));
    }

    validate_params_depth(params, 0)
}

/// Validates parameter depth and per-node limits recursively
fn validate_params_depth(value: &Value, current_depth: usize) -> Result<()> {
    if current_depth > MAX_PARAMS_DEPTH {
        return Err(StrideError::ValidationError(format!(
            "Parameter nesting too deep: {current_depth} (max: {MAX_PARAMS_DEPTH})"
        )));
    }

    match value {
        Value::Object(map) => {
            if map.len() > MAX_PARAMS_KEYS {
                return Err(StrideError::ValidationError(format!(
                    "Too many parameter keys: {} (max: {})",
                    map.len(),
                    MAX_PARAMS_KEYS
                )));
            }

            for (key, val) in map {
                if key.len() > MAX_PARAMS_STRING_LENGTH {
                    return Err(StrideError::ValidationError(format!(
                        "Parameter key too long: {} chars (max: {})",
                        key.len(),
                        MAX_PARAMS_STRING_LENGTH
                    )));
                }

                validate_params_depth(val, current_depth + 1)?;
            }
        }
        Value::Array(arr) => {
            if arr.len() > MAX_PARAMS_KEYS {
                return Err(StrideError::ValidationError(format!(
                    "Parameter array too large: {} items (max: {})",
                    arr.len(),
                    MAX_PARAMS_KEYS
                )));
            }

            for item in arr {
                validate_params_depth(item, current_depth + 1)?;
            }
        }
        Value::String(s) => {
            if s.len() > MAX_PARAMS_STRING_LENGTH {
                return Err(StrideError::ValidationError(format!(
                    "Parameter string too long: {} chars (max: {})",
                    s.len(),
                    MAX_PARAMS_STRING_LENGTH
                )));
            }
        }
        _ => {} // Numbers, booleans, null are always safe
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_params_accepted() {
        let params = json!({"goals": ["exploration"], "distance": 5000});
        assert!(validate_request_params(&params).is_ok());
    }

    #[test]
    fn test_non_object_params_rejected() {
        assert!(validate_request_params(&json!(["exploration"])).is_err());
        assert!(validate_request_params(&json!("exploration")).is_err());
        assert!(validate_request_params(&json!(null)).is_err());
    }

    #[test]
    fn test_deep_nesting_rejected() {
        let mut value = json!({"leaf": 1});
        for _ in 0..12 {
            value = json!({ "nested": value });
        }
        assert!(validate_request_params(&value).is_err());
    }

    #[test]
    fn test_oversized_string_rejected() {
        let params = json!({"notes": "x".repeat(20_000)});
        assert!(validate_request_params(&params).is_err());
    }
}
