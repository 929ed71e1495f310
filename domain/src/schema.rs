//! Schema registry types
//!
//! [`SchemaSpec`] names a JSON Schema used to constrain a structured
//! invocation; [`ToolDefinition`] describes a callable tool to the model.
//! Both are forwarded verbatim to the backend, so the constraints the
//! model sees are exactly the constraints decoding enforces.

use schemars::{gen::SchemaSettings, JsonSchema};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named JSON Schema constraining a structured model response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaSpec {
    /// Schema name sent to the backend (e.g. "event_extraction")
    pub name: String,
    /// The JSON Schema document itself
    pub schema: Value,
}

impl SchemaSpec {
    pub fn new(name: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }

    /// Build a spec from a Rust type deriving [`JsonSchema`].
    ///
    /// Uses inlined draft-07 output so the document is self-contained
    /// (backends reject schemas with external `$ref`s). Pair the type with
    /// `#[serde(deny_unknown_fields)]` to get an
    /// `additionalProperties: false` strict contract.
    pub fn of<T: JsonSchema>(name: impl Into<String>) -> Self {
        let generator = SchemaSettings::draft07()
            .with(|s| s.inline_subschemas = true)
            .into_generator();
        let root = generator.into_root_schema_for::<T>();
        let schema = serde_json::to_value(root.schema).unwrap_or(Value::Null);
        Self::new(name, schema)
    }
}

/// Definition of a tool the model may request, with a JSON-Schema
/// description of its arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique tool name (e.g. "get_weather")
    pub name: String,
    /// Human-readable description shown to the model
    pub description: String,
    /// JSON Schema for the arguments object
    pub parameters: Value,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {},
                "additionalProperties": false,
            }),
        }
    }

    pub fn with_parameters(mut self, parameters: Value) -> Self {
        self.parameters = parameters;
        self
    }

    /// Derive the argument schema from a Rust type.
    pub fn with_parameters_of<T: JsonSchema>(self) -> Self {
        let spec = SchemaSpec::of::<T>("parameters");
        self.with_parameters(spec.schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(JsonSchema)]
    #[serde(deny_unknown_fields)]
    #[allow(dead_code)]
    struct Extraction {
        description: String,
        is_calendar_event: bool,
        confidence_score: f64,
    }

    #[test]
    fn spec_of_type_lists_required_fields() {
        let spec = SchemaSpec::of::<Extraction>("extraction");
        assert_eq!(spec.name, "extraction");

        let required = spec.schema["required"]
            .as_array()
            .expect("required array");
        let names: Vec<_> = required.iter().filter_map(|v| v.as_str()).collect();
        assert!(names.contains(&"description"));
        assert!(names.contains(&"is_calendar_event"));
        assert!(names.contains(&"confidence_score"));
    }

    #[test]
    fn deny_unknown_fields_closes_the_schema() {
        let spec = SchemaSpec::of::<Extraction>("extraction");
        assert_eq!(spec.schema["additionalProperties"], serde_json::json!(false));
    }

    #[test]
    fn tool_definition_defaults_to_empty_object_schema() {
        let tool = ToolDefinition::new("get_weather", "Current temperature for coordinates");
        assert_eq!(tool.parameters["type"], "object");
        assert_eq!(tool.parameters["additionalProperties"], serde_json::json!(false));
    }

    #[derive(JsonSchema)]
    #[allow(dead_code)]
    struct WeatherArgs {
        latitude: f64,
        longitude: f64,
    }

    #[test]
    fn tool_parameters_from_type() {
        let tool = ToolDefinition::new("get_weather", "Current temperature for coordinates")
            .with_parameters_of::<WeatherArgs>();
        assert!(tool.parameters["properties"]["latitude"].is_object());
        assert!(tool.parameters["properties"]["longitude"].is_object());
    }
}
