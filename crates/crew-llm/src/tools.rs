//! Tool descriptions advertised to the model

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name, description and JSON Schema of one callable tool
///
/// `name` must match the tool registered with the agent; the model sees
/// `description` when deciding which tool to call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// JSON Schema fragments for tool inputs
pub mod schema {
    use serde_json::{Map, Value, json};

    /// Object schema from `(name, property)` pairs
    ///
    /// ```
    /// use crew_llm::tools::schema;
    ///
    /// let input = schema::object(
    ///     [
    ///         ("ticker", schema::string("Stock ticker symbol")),
    ///         ("limit", schema::integer("Posts per subreddit")),
    ///     ],
    ///     &["ticker"],
    /// );
    /// assert_eq!(input["required"][0], "ticker");
    /// assert_eq!(input["properties"]["limit"]["type"], "integer");
    /// ```
    pub fn object<'a, I>(properties: I, required: &[&str]) -> Value
    where
        I: IntoIterator<Item = (&'a str, Value)>,
    {
        let properties: Map<String, Value> = properties
            .into_iter()
            .map(|(name, property)| (name.to_string(), property))
            .collect();
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    pub fn string(description: &str) -> Value {
        json!({ "type": "string", "description": description })
    }

    pub fn integer(description: &str) -> Value {
        json!({ "type": "integer", "description": description })
    }

    /// Array of strings
    pub fn strings(description: &str) -> Value {
        json!({
            "type": "array",
            "items": { "type": "string" },
            "description": description,
        })
    }

    /// The single required `ticker` argument most stock tools take
    pub fn ticker() -> Value {
        object([("ticker", string("Stock ticker symbol, e.g. AAPL"))], &["ticker"])
    }
}
