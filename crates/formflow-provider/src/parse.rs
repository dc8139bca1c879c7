use serde_json::{Map, Value};

use crate::error::ProviderError;

const FENCE: &str = "```";

/// Remove a surrounding markdown code fence, with or without a language tag.
///
/// Text that does not start with a fence is only trimmed, so applying this
/// twice is the same as applying it once.
pub fn strip_code_fence(text: &str) -> &str {
  let trimmed = text.trim();
  let Some(rest) = trimmed.strip_prefix(FENCE) else {
    return trimmed;
  };

  let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphabetic());
  let rest = rest.strip_suffix(FENCE).unwrap_or(rest);
  rest.trim()
}

/// Parse a model reply into a JSON object.
///
/// The error carries the unmodified reply for diagnosis.
pub fn parse_output(raw: &str) -> Result<Map<String, Value>, ProviderError> {
  let unparseable = |message: String| ProviderError::UnparseableOutput {
    raw: raw.to_string(),
    message,
  };

  match serde_json::from_str::<Value>(strip_code_fence(raw)) {
    Ok(Value::Object(map)) => Ok(map),
    Ok(other) => Err(unparseable(format!(
      "expected a JSON object, got {}",
      json_kind(&other)
    ))),
    Err(e) => Err(unparseable(e.to_string())),
  }
}

fn json_kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}
