use crate::types::TriggerParams;
use serde_json::Value;

const FRAGMENT_SEPARATOR: &str = "\n";

/// Parse a JSON request body. Malformed bodies are logged and treated as absent.
pub fn parse_payload(body: &[u8]) -> Option<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return None;
    }

    match serde_json::from_slice(body) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(error = %e, "ignoring malformed JSON payload");
            None
        }
    }
}

/// Build the outgoing text: `value1`, `value2`, then the payload, one per line.
///
/// Returns `None` when there is nothing to send.
pub fn compose_message(params: &TriggerParams, payload: Option<&Value>) -> Option<String> {
    let mut fragments: Vec<String> = Vec::with_capacity(3);

    for value in [&params.value1, &params.value2].into_iter().flatten() {
        if !value.is_empty() {
            fragments.push(value.clone());
        }
    }

    if let Some(payload) = payload.filter(|v| has_content(v)) {
        // Serializing a `Value` cannot fail: its map keys are always strings.
        if let Ok(text) = serde_json::to_string(payload) {
            fragments.push(text);
        }
    }

    if fragments.is_empty() {
        None
    } else {
        Some(fragments.join(FRAGMENT_SEPARATOR))
    }
}

/// Empty containers, empty strings, `null`, `false` and zero carry nothing worth sending.
fn has_content(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
