//! Handler return values rendered by the JSON layer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;

use crate::domain::AppError;

/// Value produced by a protected handler.
///
/// The handler does not render its own body. The reply travels to the JSON
/// layer in the response extensions and is rendered there: a JSON object is
/// serialized, a string is sent as is, anything else is a fault.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply(Value);

impl Reply {
    /// Structured reply from any serializable value.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, AppError> {
        Ok(Self(serde_json::to_value(value)?))
    }

    /// Pre-rendered reply, sent without further encoding.
    pub fn text(body: impl Into<String>) -> Self {
        Self(Value::String(body.into()))
    }

    /// Render the body the JSON layer sends.
    ///
    /// # Errors
    ///
    /// Arrays, numbers, booleans and `null` are rejected with
    /// [`AppError::Serialization`].
    pub fn render(self) -> Result<String, AppError> {
        match self.0 {
            Value::Object(map) => Ok(serde_json::to_string(&map)?),
            Value::String(body) => Ok(body),
            other => Err(AppError::Serialization(format!(
                "cannot render a JSON {} as a response body",
                kind(&other)
            ))),
        }
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

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let mut response = StatusCode::OK.into_response();
        response.extensions_mut().insert(self);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_is_serialized() {
        let reply = Reply::json(&json!({"address": "A", "balance": 5})).unwrap();
        let body = reply.render().unwrap();
        let parsed: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed, json!({"address": "A", "balance": 5}));
    }

    #[test]
    fn test_string_passes_through_unchanged() {
        let body = Reply::text("I am the root page!").render().unwrap();
        assert_eq!(body, "I am the root page!");

        let pre_encoded = Reply::text(r#"{"already":"json"}"#).render().unwrap();
        assert_eq!(pre_encoded, r#"{"already":"json"}"#);
    }

    #[test]
    fn test_empty_object() {
        assert_eq!(Reply::json(&json!({})).unwrap().render().unwrap(), "{}");
    }

    #[test]
    fn test_other_values_are_faults() {
        for value in [json!([1, 2]), json!(42), json!(true), Value::Null] {
            let err = Reply::json(&value).unwrap().render().unwrap_err();
            assert!(matches!(err, AppError::Serialization(_)));
        }
    }

    #[test]
    fn test_into_response_carries_reply() {
        let response = Reply::text("hi").into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.extensions().get::<Reply>(),
            Some(&Reply::text("hi"))
        );
    }
}
