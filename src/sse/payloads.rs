//! SSE payload extraction
//!
//! The JSON carried by a `data:` frame is read field by field out of a
//! [`serde_json::Value`]. Every field is optional, unknown fields are
//! ignored, and a field of the wrong type counts as absent, so one odd field
//! never hides an `error` sitting next to it.

use serde_json::Value;

/// Raw payload of one `data:` frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FramePayload {
    /// Incremental text fragment
    pub delta: Option<String>,
    /// Completion flag, paired with `text`
    pub done: Option<bool>,
    /// Full answer text sent with the completion flag
    pub text: Option<String>,
    /// Error message from the backend
    pub error: Option<String>,
}

impl FramePayload {
    /// Pick the known fields out of a JSON object.
    ///
    /// Returns `None` if the value is not an object at all.
    pub(crate) fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let string = |key: &str| object.get(key).and_then(|v| v.as_str()).map(str::to_string);
        Some(Self {
            delta: string("delta"),
            done: object.get("done").and_then(|v| v.as_bool()),
            text: string("text"),
            error: string("error"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_fields_ignored() {
        let payload =
            FramePayload::from_value(&json!({"delta":"hi","model":"x","usage":{"tokens":3}}))
                .unwrap();
        assert_eq!(payload.delta.as_deref(), Some("hi"));
        assert!(payload.done.is_none());
    }

    #[test]
    fn test_empty_object() {
        assert_eq!(FramePayload::from_value(&json!({})), Some(FramePayload::default()));
    }

    #[test]
    fn test_wrong_typed_field_counts_as_absent() {
        let payload =
            FramePayload::from_value(&json!({"error":"quota exceeded","delta":5,"done":"yes"}))
                .unwrap();
        assert_eq!(payload.error.as_deref(), Some("quota exceeded"));
        assert!(payload.delta.is_none());
        assert!(payload.done.is_none());
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(FramePayload::from_value(&json!("text")).is_none());
        assert!(FramePayload::from_value(&json!([1, 2])).is_none());
        assert!(FramePayload::from_value(&json!(null)).is_none());
    }
}
