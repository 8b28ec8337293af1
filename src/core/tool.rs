use async_trait::async_trait;
use serde_json::{json, Map, Value as JsonValue};

use crate::core::error::ToolError;

/// Argument bag handed to a tool.
pub type JsonObject = Map<String, JsonValue>;

/// Primitive shape a field must have at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Number,
    /// Whole number in `1..=u32::MAX`.
    PositiveInteger,
    StringArray,
    ObjectArray,
    Object,
    /// A string restricted to a closed set of values.
    Enum(&'static [&'static str]),
}

impl FieldKind {
    pub fn matches(&self, value: &JsonValue) -> bool {
        match self {
            FieldKind::String => value.is_string(),
            FieldKind::Number => value.is_number(),
            FieldKind::PositiveInteger => value
                .as_u64()
                .is_some_and(|n| n > 0 && u32::try_from(n).is_ok()),
            FieldKind::StringArray => value
                .as_array()
                .is_some_and(|items| items.iter().all(JsonValue::is_string)),
            FieldKind::ObjectArray => value
                .as_array()
                .is_some_and(|items| items.iter().all(JsonValue::is_object)),
            FieldKind::Object => value.is_object(),
            FieldKind::Enum(allowed) => value
                .as_str()
                .is_some_and(|s| allowed.contains(&s)),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Number => "number",
            FieldKind::PositiveInteger => "a positive integer",
            FieldKind::StringArray => "array of strings",
            FieldKind::ObjectArray => "array of objects",
            FieldKind::Object => "object",
            FieldKind::Enum(_) => "one of the allowed values",
        }
    }

    fn schema(&self) -> JsonValue {
        match self {
            FieldKind::String => json!({ "type": "string" }),
            FieldKind::Number => json!({ "type": "number" }),
            FieldKind::PositiveInteger => json!({ "type": "integer", "minimum": 1 }),
            FieldKind::StringArray => json!({ "type": "array", "items": { "type": "string" } }),
            FieldKind::ObjectArray => json!({ "type": "array", "items": { "type": "object" } }),
            FieldKind::Object => json!({ "type": "object" }),
            FieldKind::Enum(allowed) => json!({ "type": "string", "enum": allowed }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub description: &'static str,
}

/// Input contract of one tool. Immutable once registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDescriptor {
    name: String,
    description: String,
    fields: Vec<FieldSpec>,
    same_length: Vec<&'static [&'static str]>,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            fields: Vec::new(),
            same_length: Vec::new(),
        }
    }

    pub fn required(mut self, name: &'static str, kind: FieldKind, description: &'static str) -> Self {
        self.fields.push(FieldSpec { name, kind, required: true, description });
        self
    }

    pub fn optional(mut self, name: &'static str, kind: FieldKind, description: &'static str) -> Self {
        self.fields.push(FieldSpec { name, kind, required: false, description });
        self
    }

    /// Array fields that, when present, must hold the same number of items.
    pub fn same_length(mut self, fields: &'static [&'static str]) -> Self {
        self.same_length.push(fields);
        self
    }

    pub fn same_length_groups(&self) -> impl Iterator<Item = &'static [&'static str]> + '_ {
        self.same_length.iter().copied()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Required fields in declared order.
    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.required)
    }

    pub fn optional_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| !f.required)
    }

    /// JSON Schema rendering used by `tools/list`.
    pub fn input_schema(&self) -> JsonObject {
        let mut properties = JsonObject::new();
        for field in &self.fields {
            let mut schema = field.kind.schema();
            if let Some(obj) = schema.as_object_mut() {
                obj.insert("description".into(), JsonValue::String(field.description.into()));
            }
            properties.insert(field.name.into(), schema);
        }
        let required: Vec<&str> = self.required_fields().map(|f| f.name).collect();

        let mut out = JsonObject::new();
        out.insert("type".into(), json!("object"));
        out.insert("properties".into(), JsonValue::Object(properties));
        out.insert("required".into(), json!(required));
        out
    }
}

/// What a handler hands back on success; the dispatcher turns it into content blocks.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    Text(String),
    /// Serialized as one pretty-printed text block.
    Json(JsonValue),
}

/// Adapter contract: validated arguments in, one collaborator call, output or fault out.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, arguments: &JsonObject) -> Result<ToolOutput, ToolError>;
}

/// Reads a field the dispatcher has already validated.
pub fn str_arg<'a>(arguments: &'a JsonObject, field: &str) -> Result<&'a str, ToolError> {
    arguments
        .get(field)
        .and_then(JsonValue::as_str)
        .ok_or_else(|| ToolError::Message(format!("argument '{field}' is not a string")))
}

pub fn string_list_arg(arguments: &JsonObject, field: &str) -> Result<Vec<String>, ToolError> {
    arguments
        .get(field)
        .and_then(JsonValue::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_owned))
                .collect()
        })
        .ok_or_else(|| ToolError::Message(format!("argument '{field}' is not an array")))
}

/// Optional field; absent and null both read as `None`.
pub fn opt_arg<'a>(arguments: &'a JsonObject, field: &str) -> Option<&'a JsonValue> {
    arguments.get(field).filter(|v| !v.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl ToolHandler for Echo {
        async fn call(&self, args: &JsonObject) -> Result<ToolOutput, ToolError> {
            Ok(ToolOutput::Json(JsonValue::Object(args.clone())))
        }
    }

    #[tokio::test]
    async fn it_runs_echo() {
        let mut args = JsonObject::new();
        args.insert("x".into(), json!(1));
        let out = Echo.call(&args).await.unwrap();
        assert_eq!(out, ToolOutput::Json(json!({"x": 1})));
    }

    #[test]
    fn kinds_match_runtime_values() {
        assert!(FieldKind::String.matches(&json!("a")));
        assert!(!FieldKind::String.matches(&json!(1)));
        assert!(FieldKind::Number.matches(&json!(2.5)));
        assert!(FieldKind::PositiveInteger.matches(&json!(3)));
        assert!(!FieldKind::PositiveInteger.matches(&json!(2.5)));
        assert!(!FieldKind::PositiveInteger.matches(&json!(0)));
        assert!(!FieldKind::PositiveInteger.matches(&json!(-1)));
        assert!(!FieldKind::PositiveInteger.matches(&json!(5_000_000_000u64)));
        assert!(FieldKind::StringArray.matches(&json!(["a", "b"])));
        assert!(FieldKind::StringArray.matches(&json!([])));
        assert!(!FieldKind::StringArray.matches(&json!(["a", 1])));
        assert!(FieldKind::ObjectArray.matches(&json!([{}, {"k": 1}])));
        assert!(!FieldKind::ObjectArray.matches(&json!([{}, "x"])));
        assert!(FieldKind::Object.matches(&json!({})));
        assert!(!FieldKind::Object.matches(&json!([])));
        let topics = FieldKind::Enum(&["routing", "auth"]);
        assert!(topics.matches(&json!("routing")));
        assert!(!topics.matches(&json!("cooking")));
    }

    #[test]
    fn schema_lists_required_in_declared_order() {
        let d = ToolDescriptor::new("query_collection", "Query")
            .required("collection_name", FieldKind::String, "Name of the collection")
            .required("query_texts", FieldKind::StringArray, "Query texts")
            .optional("n_results", FieldKind::Number, "Result count");
        let schema = d.input_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["collection_name", "query_texts"]));
        assert_eq!(schema["properties"]["query_texts"]["items"]["type"], "string");
        assert_eq!(schema["properties"]["n_results"]["description"], "Result count");
    }

    #[test]
    fn enum_fields_render_allowed_values() {
        let d = ToolDescriptor::new("docs", "Docs").required(
            "topic",
            FieldKind::Enum(&["a", "b"]),
            "Topic",
        );
        assert_eq!(d.input_schema()["properties"]["topic"]["enum"], json!(["a", "b"]));
    }

    #[test]
    fn opt_arg_treats_null_as_absent() {
        let mut args = JsonObject::new();
        args.insert("where".into(), JsonValue::Null);
        assert!(opt_arg(&args, "where").is_none());
        assert!(opt_arg(&args, "missing").is_none());
    }
}
