use serde_json::{Map, Value};

/// One structured input record with field order preserved.
pub type RawRecord = Map<String, Value>;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),
}

/// Parse one JSONL line. Invalid UTF-8, empty lines and non-object values are
/// all parse errors.
///
/// # Errors
///
/// Returns `ParseError` if the line is not a single JSON object.
pub fn parse_record(line: &[u8]) -> Result<RawRecord, ParseError> {
    match serde_json::from_slice::<Value>(line)? {
        Value::Object(map) => Ok(map),
        other => Err(ParseError::NotAnObject(kind(&other))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
