//! Recovery of a JSON payload embedded in free-form tool output.
//!
//! The enumeration script prints its result between two sentinel strings;
//! everything around them is REPL banner and diagnostic noise.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::SessionError;

/// The two literal strings around an embedded payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadMarkers {
    pub start: String,
    pub end: String,
}

impl Default for PayloadMarkers {
    fn default() -> Self {
        Self {
            start: "###JSON_START###".to_string(),
            end: "###JSON_END###".to_string(),
        }
    }
}

impl PayloadMarkers {
    /// The text strictly between the first start marker and the last end
    /// marker, or `None` when either is missing or they are out of order.
    pub fn slice<'a>(&self, text: &'a str) -> Option<&'a str> {
        let begin = text.find(&self.start)? + self.start.len();
        let end = text.rfind(&self.end)?;
        text.get(begin..end)
    }
}

/// Extract and parse the JSON array between `markers` in `text`.
pub fn extract_payload(text: &str, markers: &PayloadMarkers) -> Result<Vec<Value>, SessionError> {
    let Some(raw) = markers.slice(text) else {
        debug!(len = text.len(), "payload markers not found in output");
        return Err(SessionError::MalformedOutput);
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => Ok(items),
        Ok(other) => Err(SessionError::ParseFailure(format!(
            "expected a JSON array, found {}",
            json_type(&other)
        ))),
        Err(e) => Err(SessionError::ParseFailure(e.to_string())),
    }
}

const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn extract(text: &str) -> Result<Vec<Value>, SessionError> {
        extract_payload(text, &PayloadMarkers::default())
    }

    #[test]
    fn recovers_payload_between_markers() {
        let items = extract("noise###JSON_START###[1,2]###JSON_END###trailer").unwrap();
        assert_eq!(items, vec![json!(1), json!(2)]);
    }

    #[test]
    fn missing_start_marker_is_malformed() {
        let err = extract("noise[1,2]###JSON_END###").unwrap_err();
        assert!(matches!(err, SessionError::MalformedOutput));
    }

    #[test]
    fn missing_end_marker_is_malformed() {
        let err = extract("###JSON_START###[1,2]").unwrap_err();
        assert!(matches!(err, SessionError::MalformedOutput));
    }

    #[test]
    fn end_before_start_is_malformed() {
        let err = extract("###JSON_END### junk ###JSON_START###[]").unwrap_err();
        assert!(matches!(err, SessionError::MalformedOutput));
    }

    #[test]
    fn uses_last_end_marker() {
        let text = concat!(
            "     ____\n    / _  |   Frida 16.5.9\n",
            "###JSON_START###[\"a.b.C\", \"###JSON_END###\"]###JSON_END###\n",
            "[Remote::Example ]-> "
        );
        let items = extract(text).unwrap();
        assert_eq!(items, vec![json!("a.b.C"), json!("###JSON_END###")]);
    }

    #[test]
    fn invalid_json_is_parse_failure() {
        let err = extract("###JSON_START###[1,2###JSON_END###").unwrap_err();
        assert!(matches!(err, SessionError::ParseFailure(_)));
    }

    #[test]
    fn non_array_payload_is_parse_failure() {
        let err = extract("###JSON_START###{\"a\":1}###JSON_END###").unwrap_err();
        match err {
            SessionError::ParseFailure(msg) => assert!(msg.contains("an object")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_array_is_valid() {
        assert!(extract("###JSON_START### [] ###JSON_END###").unwrap().is_empty());
    }

    #[test]
    fn custom_markers() {
        let markers = PayloadMarkers {
            start: "<<".into(),
            end: ">>".into(),
        };
        let items = extract_payload("x<<[true]>>y", &markers).unwrap();
        assert_eq!(items, vec![json!(true)]);
    }
}
