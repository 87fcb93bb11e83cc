//! Tool definition types for LLM tool use

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tool definition handed to the LLM provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name (must match the name the tool is registered under)
    pub name: String,

    pub description: String,

    /// JSON schema for the tool's input parameters
    pub input_schema: Value,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// Helpers to build JSON schemas for tool inputs
pub mod schema {
    use serde_json::{Value, json};

    /// Object schema with properties and a list of required keys
    ///
    /// # Example
    ///
    /// ```
    /// use agent_llm::tools::schema;
    /// use serde_json::json;
    ///
    /// let schema = schema::object(
    ///     json!({
    ///         "query": schema::string("Search query"),
    ///         "page_size": schema::integer("Maximum results"),
    ///     }),
    ///     &["query"],
    /// );
    /// assert_eq!(schema["required"][0], "query");
    /// ```
    pub fn object(properties: Value, required: &[&str]) -> Value {
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Object schema without properties, for argument-less tools
    pub fn empty_object() -> Value {
        object(json!({}), &[])
    }

    pub fn string(description: &str) -> Value {
        json!({
            "type": "string",
            "description": description,
        })
    }

    /// String property restricted to a fixed set of values
    pub fn string_enum(description: &str, values: &[&str]) -> Value {
        json!({
            "type": "string",
            "description": description,
            "enum": values,
        })
    }

    pub fn number(description: &str) -> Value {
        json!({
            "type": "number",
            "description": description,
        })
    }

    pub fn integer(description: &str) -> Value {
        json!({
            "type": "integer",
            "description": description,
        })
    }

    pub fn array(description: &str, items: Value) -> Value {
        json!({
            "type": "array",
            "description": description,
            "items": items,
        })
    }

    /// Property accepting one of several schemas
    pub fn any_of(description: &str, variants: Vec<Value>) -> Value {
        json!({
            "description": description,
            "anyOf": variants,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_definition_creation() {
        let schema = schema::object(json!({ "query": schema::string("Search query") }), &["query"]);

        let tool = ToolDefinition::new("wikipedia_tool", "Look up a topic", schema.clone());
        assert_eq!(tool.name, "wikipedia_tool");
        assert_eq!(tool.input_schema, schema);
        assert_eq!(tool.input_schema["properties"]["query"]["type"], "string");
    }

    #[test]
    fn test_schema_builders() {
        assert_eq!(schema::integer("n")["type"], "integer");
        assert_eq!(schema::number("x")["type"], "number");
        assert_eq!(schema::string_enum("c", &["business"])["enum"][0], "business");
        assert_eq!(schema::empty_object()["required"], json!([]));

        let symbols = schema::any_of(
            "tickers",
            vec![schema::string("csv"), schema::array("list", json!({"type": "string"}))],
        );
        assert_eq!(symbols["anyOf"].as_array().map(Vec::len), Some(2));
    }
}
