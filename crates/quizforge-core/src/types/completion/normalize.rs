//! Recovering blank answers from heterogeneous response shapes.
//!
//! Upstream producers have not agreed on one response shape, so the scorer
//! tries, in order: the canonical `{ "answers": [...] }` object, a bare array
//! of answers, a JSON-encoded string holding either, and finally a scan of the
//! object's own fields for an array of `{ blankId, value }` items.

use serde_json::Value;

use crate::model::BlankAnswer;

/// Where a set of answers was recovered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    Canonical,
    BareArray,
    EncodedString,
    FieldScan,
}

impl ResponseShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseShape::Canonical => "canonical",
            ResponseShape::BareArray => "bare-array",
            ResponseShape::EncodedString => "encoded-string",
            ResponseShape::FieldScan => "field-scan",
        }
    }
}

/// Answers recovered from a raw response, in submission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedResponse {
    /// Which normalisation step recovered the answers.
    pub shape: ResponseShape,
    /// In submission order.
    pub answers: Vec<BlankAnswer>,
}

/// Recover `(blankId, value)` pairs from a raw response.
///
/// Returns `None` when no recognizable answer list exists anywhere in it.
pub fn normalize_response(response: &Value) -> Option<NormalizedResponse> {
    if let Some((shape, answers)) = structured_answers(response) {
        return Some(NormalizedResponse { shape, answers });
    }

    if let Value::String(encoded) = response {
        if let Ok(decoded) = serde_json::from_str::<Value>(encoded) {
            if let Some((_, answers)) = structured_answers(&decoded) {
                tracing::debug!("decoded completion answers from a JSON string");
                return Some(NormalizedResponse {
                    shape: ResponseShape::EncodedString,
                    answers,
                });
            }
        }
    }

    // TODO: drop the field scan once every producer emits the canonical shape.
    if let Value::Object(fields) = response {
        for (key, value) in fields {
            if value.as_array().is_some_and(Vec::is_empty) {
                continue;
            }
            if let Some(answers) = answer_list(value) {
                tracing::warn!(
                    field = %key,
                    "recovered completion answers by scanning response fields"
                );
                return Some(NormalizedResponse {
                    shape: ResponseShape::FieldScan,
                    answers,
                });
            }
        }
    }

    None
}

fn structured_answers(value: &Value) -> Option<(ResponseShape, Vec<BlankAnswer>)> {
    match value {
        Value::Object(fields) => fields
            .get("answers")
            .and_then(answer_list)
            .map(|answers| (ResponseShape::Canonical, answers)),
        Value::Array(_) => answer_list(value).map(|answers| (ResponseShape::BareArray, answers)),
        _ => None,
    }
}

/// An array counts as an answer list when it is empty or at least one item
/// looks like an answer. Items that don't are skipped.
fn answer_list(value: &Value) -> Option<Vec<BlankAnswer>> {
    let items = value.as_array()?;
    if items.is_empty() {
        return Some(Vec::new());
    }
    let answers: Vec<BlankAnswer> = items.iter().filter_map(blank_answer).collect();
    if answers.is_empty() {
        None
    } else {
        Some(answers)
    }
}

fn blank_answer(item: &Value) -> Option<BlankAnswer> {
    let blank_id = scalar_text(item.get("blankId")?)?;
    let value = item
        .get("value")
        .or_else(|| item.get("answer"))
        .and_then(scalar_text)
        .unwrap_or_default();
    Some(BlankAnswer { blank_id, value })
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pairs(normalized: &NormalizedResponse) -> Vec<(&str, &str)> {
        normalized
            .answers
            .iter()
            .map(|a| (a.blank_id.as_str(), a.value.as_str()))
            .collect()
    }

    #[test]
    fn canonical_shape() {
        let normalized = normalize_response(&json!({
            "type": "completion",
            "answers": [{ "blankId": "b1", "value": "sun" }, { "blankId": "b2", "value": "" }]
        }))
        .unwrap();
        assert_eq!(normalized.shape, ResponseShape::Canonical);
        assert_eq!(pairs(&normalized), vec![("b1", "sun"), ("b2", "")]);
    }

    #[test]
    fn bare_array_shape() {
        let normalized = normalize_response(&json!([{ "blankId": 1, "value": 42 }])).unwrap();
        assert_eq!(normalized.shape, ResponseShape::BareArray);
        assert_eq!(pairs(&normalized), vec![("1", "42")]);
    }

    #[test]
    fn encoded_string_shape() {
        let encoded = json!(r#"{"answers":[{"blankId":"b1","value":"park"}]}"#);
        let normalized = normalize_response(&encoded).unwrap();
        assert_eq!(normalized.shape, ResponseShape::EncodedString);
        assert_eq!(pairs(&normalized), vec![("b1", "park")]);

        let encoded_array = json!(r#"[{"blankId":"b1","value":"park"}]"#);
        assert_eq!(
            normalize_response(&encoded_array).unwrap().shape,
            ResponseShape::EncodedString
        );
    }

    #[test]
    fn field_scan_shape() {
        let normalized = normalize_response(&json!({
            "type": "completion",
            "tags": [],
            "userInput": [{ "blankId": "b1", "answer": "sunny" }]
        }))
        .unwrap();
        assert_eq!(normalized.shape, ResponseShape::FieldScan);
        assert_eq!(pairs(&normalized), vec![("b1", "sunny")]);
    }

    #[test]
    fn missing_value_is_empty() {
        let normalized = normalize_response(&json!({ "answers": [{ "blankId": "b1" }] })).unwrap();
        assert_eq!(pairs(&normalized), vec![("b1", "")]);
    }

    #[test]
    fn unrecognizable_inputs() {
        assert!(normalize_response(&json!({})).is_none());
        assert!(normalize_response(&json!(null)).is_none());
        assert!(normalize_response(&json!("not json")).is_none());
        assert!(normalize_response(&json!({ "answers": ["a", "b"] })).is_none());
        assert!(normalize_response(&json!({ "notes": [{ "text": "x" }] })).is_none());
    }

    #[test]
    fn empty_canonical_list_is_recognized() {
        let normalized = normalize_response(&json!({ "answers": [] })).unwrap();
        assert!(normalized.answers.is_empty());
    }
}
