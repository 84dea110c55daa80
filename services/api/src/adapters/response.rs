//! services/api/src/adapters/response.rs
//!
//! Response text normalization for the generative API.
//!
//! The remote endpoint's JSON schema is not stable across provider
//! versions: newer responses carry a `candidates` list with nested
//! `content.parts[].text`, older ones put a usable string under one of
//! several top-level keys. This module classifies a raw response into one
//! of the known shapes and extracts a single usable text string, or fails
//! with [`NoUsableText`] carrying the best-known finish reason.
//!
//! No retries happen here; transient-failure handling belongs to the
//! transport in `gemini.rs`.

use serde::Deserialize;
use serde_json::Value;

/// Typed failure: the response contained no usable text anywhere.
#[derive(Debug, thiserror::Error)]
#[error("no usable text in generation response (finish_reason: {})", finish_reason.as_deref().unwrap_or("unknown"))]
pub struct NoUsableText {
    pub finish_reason: Option<String>,
}

/// The known response shapes, plus everything else.
#[derive(Debug)]
pub enum ResponseShape {
    /// A non-empty `candidates` list.
    Candidates(Vec<Candidate>),
    /// A usable string found under one of the known top-level keys.
    Keyed(String),
    /// Nothing matched; the raw value is kept for the printable fallback.
    Unrecognized(Value),
}

/// One entry of a `candidates` list. Field presence varies by API version,
/// so everything is optional.
#[derive(Debug, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default, alias = "finishReason")]
    pub finish_reason: Option<Value>,
}

/// `content` is either a bare string (old API) or an object holding a
/// `parts` list (new API).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CandidateContent {
    Text(String),
    Parts {
        parts: Vec<Part>,
    },
    /// A content object without parts (e.g. only a role marker).
    Other(Value),
}

#[derive(Debug, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

/// Classifies a raw response value into one of the known shapes.
///
/// The probes run in fixed priority order: the candidate list first, then
/// `output` (object or bare string), then the flat string keys.
pub fn classify(value: &Value) -> ResponseShape {
    if let Some(list) = value.get("candidates").and_then(Value::as_array) {
        let candidates: Vec<Candidate> = list
            .iter()
            .filter_map(|c| serde_json::from_value(c.clone()).ok())
            .collect();
        if !candidates.is_empty() {
            return ResponseShape::Candidates(candidates);
        }
    }

    if let Some(output) = value.get("output") {
        match output {
            Value::String(s) if !s.trim().is_empty() => {
                return ResponseShape::Keyed(s.trim().to_string());
            }
            Value::Object(map) => {
                for key in ["content", "text"] {
                    if let Some(Value::String(s)) = map.get(key) {
                        if !s.trim().is_empty() {
                            return ResponseShape::Keyed(s.trim().to_string());
                        }
                    }
                }
            }
            _ => {}
        }
    }

    for key in ["text", "response", "content", "result", "generated_text"] {
        if let Some(Value::String(s)) = value.get(key) {
            if !s.trim().is_empty() {
                return ResponseShape::Keyed(s.trim().to_string());
            }
        }
    }

    ResponseShape::Unrecognized(value.clone())
}

/// Extracts a single non-empty trimmed text string from a raw response.
///
/// Candidate shape: all non-empty part texts of the FIRST candidate,
/// newline-joined, else the candidate's bare string accessors. When every
/// structured attempt misses, the value's printable form is returned; only
/// a truly empty printable form fails.
pub fn extract_text(value: &Value) -> Result<String, NoUsableText> {
    match classify(value) {
        ResponseShape::Candidates(candidates) => {
            let first = &candidates[0];
            if let Some(text) = candidate_text(first) {
                return Ok(text);
            }
            printable(value).ok_or_else(|| NoUsableText {
                finish_reason: finish_reason_display(first),
            })
        }
        ResponseShape::Keyed(text) => Ok(text),
        ResponseShape::Unrecognized(raw) => {
            printable(&raw).ok_or(NoUsableText { finish_reason: None })
        }
    }
}

fn candidate_text(candidate: &Candidate) -> Option<String> {
    match &candidate.content {
        Some(CandidateContent::Parts { parts }) => {
            let texts: Vec<&str> = parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect();
            if !texts.is_empty() {
                return Some(texts.join("\n"));
            }
        }
        Some(CandidateContent::Text(s)) if !s.trim().is_empty() => {
            return Some(s.trim().to_string());
        }
        _ => {}
    }
    for alt in [&candidate.text, &candidate.output] {
        if let Some(s) = alt {
            if !s.trim().is_empty() {
                return Some(s.trim().to_string());
            }
        }
    }
    None
}

fn finish_reason_display(candidate: &Candidate) -> Option<String> {
    candidate.finish_reason.as_ref().map(|v| match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

/// The value's printable string form: the string itself for JSON strings,
/// compact JSON otherwise. `None` when trimmed-empty.
fn printable(value: &Value) -> Option<String> {
    let raw = match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn candidate_parts_are_joined_with_newlines() {
        let resp = json!({
            "candidates": [{
                "content": { "parts": [{ "text": " first " }, { "text": "second" }, { "text": "  " }] },
                "finishReason": "STOP"
            }]
        });
        assert_eq!(extract_text(&resp).unwrap(), "first\nsecond");
    }

    #[test]
    fn only_first_candidate_is_used() {
        let resp = json!({
            "candidates": [
                { "content": { "parts": [{ "text": "winner" }] } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        });
        assert_eq!(extract_text(&resp).unwrap(), "winner");
    }

    #[test]
    fn old_style_candidate_string_fields() {
        let as_content = json!({ "candidates": [{ "content": "from content" }] });
        assert_eq!(extract_text(&as_content).unwrap(), "from content");

        let as_output = json!({ "candidates": [{ "output": "from output" }] });
        assert_eq!(extract_text(&as_output).unwrap(), "from output");
    }

    #[test]
    fn candidates_take_priority_over_flat_keys() {
        let resp = json!({
            "candidates": [{ "text": "candidate text" }],
            "text": "flat text"
        });
        assert_eq!(extract_text(&resp).unwrap(), "candidate text");
    }

    #[test]
    fn output_object_and_string_forms() {
        let object = json!({ "output": { "content": "nested" } });
        assert_eq!(extract_text(&object).unwrap(), "nested");

        let string = json!({ "output": "bare" });
        assert_eq!(extract_text(&string).unwrap(), "bare");
    }

    #[test]
    fn flat_keys_probe_in_order() {
        let resp = json!({ "generated_text": "late key", "response": "early key" });
        assert_eq!(extract_text(&resp).unwrap(), "early key");
    }

    #[test]
    fn whitespace_only_keys_are_skipped() {
        let resp = json!({ "text": "   ", "result": "usable" });
        assert_eq!(extract_text(&resp).unwrap(), "usable");
    }

    #[test]
    fn unrecognized_shape_falls_back_to_printable_json() {
        let resp = json!({ "weird": 42 });
        let shape = classify(&resp);
        assert!(matches!(shape, ResponseShape::Unrecognized(_)));
        assert_eq!(extract_text(&resp).unwrap(), r#"{"weird":42}"#);
    }

    #[test]
    fn plain_string_value_is_its_own_printable_form() {
        let resp = json!("just text");
        assert_eq!(extract_text(&resp).unwrap(), "just text");
    }

    #[test]
    fn empty_printable_form_fails_with_finish_reason() {
        let resp = json!({
            "candidates": [{ "content": { "role": "model" }, "finishReason": "SAFETY" }]
        });
        // The candidate has no text anywhere; the printable fallback is the
        // raw JSON, which is non-empty, so this still succeeds.
        assert!(extract_text(&resp).is_ok());

        let empty = json!("   ");
        let err = extract_text(&empty).unwrap_err();
        assert!(err.finish_reason.is_none());

        let null = Value::Null;
        assert!(extract_text(&null).is_err());
    }

    #[test]
    fn numeric_finish_reason_is_stringified() {
        let candidate: Candidate =
            serde_json::from_value(json!({ "finishReason": 2 })).unwrap();
        assert_eq!(finish_reason_display(&candidate), Some("2".to_string()));
    }
}
