//! Payload helpers for the id-scoped events exchanged with the generation
//! backend.
//!
//! Backend events carry flat camelCase JSON objects; these helpers pull out
//! the fields the lifecycle controller cares about without forcing a schema
//! on the rest of the payload.

use serde_json::{Map, Value};

use crate::constants::events::REQUEST_ID_FIELD;
use crate::orchestration::types::RequestId;

/// Extract the request id an event is scoped to, if any
pub fn request_id_of(context: &Value) -> Option<RequestId> {
    context
        .get(REQUEST_ID_FIELD)
        .and_then(Value::as_str)
        .and_then(RequestId::parse)
}

/// Extract a progress value from a processing ping, clamped to 0-100
pub fn progress_of(context: &Value) -> Option<u8> {
    context
        .get("progress")
        .and_then(Value::as_u64)
        .map(|p| p.min(100) as u8)
}

/// Extract the failure message from a failed event, falling back to a
/// generic message when the backend omits one
pub fn error_message_of(context: &Value) -> String {
    context
        .get("error")
        .or_else(|| context.get("message"))
        .and_then(Value::as_str)
        .unwrap_or("Generation failed")
        .to_string()
}

/// Extract the result payload from a ready event.
///
/// Backends either nest the result under a `result` key or inline it beside
/// `requestId`; in the inline case the id field is stripped from the payload.
pub fn payload_of(context: &Value) -> Value {
    if let Some(result) = context.get("result") {
        return result.clone();
    }
    match context {
        Value::Object(map) => {
            let stripped: Map<String, Value> = map
                .iter()
                .filter(|(k, _)| k.as_str() != REQUEST_ID_FIELD)
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            Value::Object(stripped)
        }
        other => other.clone(),
    }
}

/// Merge the request id into a params object for a `:requested` emission
pub fn with_request_id(params: &Value, id: RequestId) -> Value {
    let mut map = match params {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    map.insert(REQUEST_ID_FIELD.to_string(), Value::String(id.to_string()));
    Value::Object(map)
}
