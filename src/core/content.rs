//! Invocation request/response shapes and their JSON envelope.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

use crate::core::error::DispatchError;
use crate::core::tool::{JsonObject, ToolOutput};

/// One incoming call. Not persisted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InvocationRequest {
    #[serde(rename = "name")]
    pub tool_name: String,
    #[serde(default, deserialize_with = "object_or_null")]
    pub arguments: JsonObject,
}

impl InvocationRequest {
    pub fn new(tool_name: impl Into<String>, arguments: JsonObject) -> Self {
        Self { tool_name: tool_name.into(), arguments }
    }

    /// Build from a loose JSON value; `arguments` must be an object when present.
    pub fn from_value(value: JsonValue) -> Result<Self, DispatchError> {
        serde_json::from_value(value).map_err(|e| DispatchError::InvalidParams(e.to_string()))
    }
}

fn object_or_null<'de, D>(de: D) -> Result<JsonObject, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<JsonObject>::deserialize(de).map(Option::unwrap_or_default)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub text: String,
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self { kind: ContentKind::Text, text: text.into() }
    }
}

/// Successful invocation payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub content: Vec<ContentBlock>,
}

impl ToolResponse {
    pub fn from_output(output: ToolOutput) -> Self {
        let text = match output {
            ToolOutput::Text(text) => text,
            ToolOutput::Json(value) => {
                serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
            }
        };
        Self { content: vec![ContentBlock::text(text)] }
    }
}

pub type InvocationResult = Result<ToolResponse, DispatchError>;

/// Wire envelope for a result.
///
/// Success and handler failures both render as `{content, isError?}`; client faults
/// render as `{error: {kind, message}}` so the transport can map them to protocol errors.
pub fn envelope(result: &InvocationResult) -> JsonValue {
    match result {
        Ok(resp) => json!({ "content": resp.content }),
        Err(DispatchError::HandlerFailure(msg)) => json!({
            "content": [ContentBlock::text(format!("Error: {msg}"))],
            "isError": true,
        }),
        Err(e) => {
            let mut fault = json!({ "kind": e.kind(), "message": e.to_string() });
            if let DispatchError::RateLimited { retry_after_secs } = e {
                fault["retryAfterSecs"] = json!(retry_after_secs);
            }
            json!({ "error": fault })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_parses_name_and_arguments() {
        let req = InvocationRequest::from_value(json!({
            "name": "get_collection",
            "arguments": {"name": "docs"}
        }))
        .unwrap();
        assert_eq!(req.tool_name, "get_collection");
        assert_eq!(req.arguments["name"], "docs");
    }

    #[test]
    fn missing_or_null_arguments_become_empty_bag() {
        let req = InvocationRequest::from_value(json!({"name": "x"})).unwrap();
        assert!(req.arguments.is_empty());
        let req = InvocationRequest::from_value(json!({"name": "x", "arguments": null})).unwrap();
        assert!(req.arguments.is_empty());
    }

    #[test]
    fn non_object_arguments_are_invalid_params() {
        let err = InvocationRequest::from_value(json!({"name": "x", "arguments": [1]})).unwrap_err();
        assert_eq!(err.kind(), "InvalidParams");
    }

    #[test]
    fn json_output_becomes_single_pretty_block() {
        let resp = ToolResponse::from_output(ToolOutput::Json(json!({"a": [1, 2]})));
        assert_eq!(resp.content.len(), 1);
        assert!(resp.content[0].text.contains("\n"));
        let back: JsonValue = serde_json::from_str(&resp.content[0].text).unwrap();
        assert_eq!(back, json!({"a": [1, 2]}));
    }

    #[test]
    fn envelope_shapes() {
        let ok: InvocationResult = Ok(ToolResponse::from_output(ToolOutput::Text("hi".into())));
        let v = envelope(&ok);
        assert_eq!(v["content"][0]["type"], "text");
        assert_eq!(v["content"][0]["text"], "hi");
        assert!(v.get("isError").is_none());

        let failed: InvocationResult = Err(DispatchError::HandlerFailure("boom".into()));
        let v = envelope(&failed);
        assert_eq!(v["isError"], true);
        assert_eq!(v["content"][0]["text"], "Error: boom");

        let limited: InvocationResult = Err(DispatchError::RateLimited { retry_after_secs: 12 });
        let v = envelope(&limited);
        assert_eq!(v["error"]["kind"], "RateLimited");
        assert_eq!(v["error"]["retryAfterSecs"], 12);
    }
}
