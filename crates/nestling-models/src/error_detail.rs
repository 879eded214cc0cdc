//! Backend error payloads.
//!
//! Failures arrive as `{"detail": ...}` where `detail` is either a plain
//! message or a list of field-level validation errors. [`ErrorDetail`]
//! models both shapes and collapses either into one display string, so
//! no caller has to re-parse the backend's error format.

use serde::Deserialize;
use serde_json::{Map, Value};

/// Body of a non-success response.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub detail: ErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Message(String),
    Fields(Vec<FieldError>),
}

/// One validation failure. Unknown keys are retained so an entry without
/// a `msg` can still be rendered.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldError {
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl ErrorDetail {
    /// Collapse the detail into a single display string.
    ///
    /// A plain message passes through unchanged; field errors are joined
    /// with `", "`.
    pub fn normalize(&self) -> String {
        match self {
            ErrorDetail::Message(message) => message.clone(),
            ErrorDetail::Fields(fields) => fields
                .iter()
                .map(|field| field.display_message())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

impl FieldError {
    fn display_message(&self) -> String {
        match &self.msg {
            Some(msg) => msg.clone(),
            None => Value::Object(self.rest.clone()).to_string(),
        }
    }
}

/// Extract a display message from a raw error body, if it parses.
pub fn extract_detail(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|body| body.detail.normalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_message_passes_through() {
        let detail = ErrorDetail::Message("rate limited".to_string());
        assert_eq!(detail.normalize(), "rate limited");
        // Normalizing a plain message is the identity; repeating it
        // changes nothing.
        assert_eq!(
            ErrorDetail::Message(detail.normalize()).normalize(),
            "rate limited"
        );
    }

    #[test]
    fn field_errors_join_their_messages() {
        let body = r#"{"detail":[
            {"loc":["body","email"],"msg":"field required","type":"value_error.missing"},
            {"loc":["body","password"],"msg":"too short","type":"value_error"}
        ]}"#;
        assert_eq!(
            extract_detail(body).unwrap(),
            "field required, too short"
        );
    }

    #[test]
    fn field_error_without_msg_renders_the_entry() {
        let body = r#"{"detail":[{"loc":["body"],"code":17}]}"#;
        let message = extract_detail(body).unwrap();
        assert!(message.contains("\"code\":17"), "got: {message}");
    }

    #[test]
    fn unstructured_body_yields_none() {
        assert_eq!(extract_detail("upstream exploded"), None);
        assert_eq!(extract_detail(""), None);
        assert_eq!(extract_detail(r#"{"error":"nope"}"#), None);
    }
}
