//! Tool trait definition

use crate::ToolOutcome;
use async_trait::async_trait;
use crew_llm::ToolDefinition;
use serde_json::Value;

/// Trait for tools that agents can call
///
/// Each tool provides a name, description and JSON schema for its input.
/// Implementations catch every internal failure and report it through
/// [`ToolOutcome::Failed`].
#[async_trait]
pub trait Tool: Send + Sync {
    /// Invoke the tool with the model-supplied arguments
    async fn invoke(&self, input: Value) -> ToolOutcome;

    /// Tool name; unique within a registry
    fn name(&self) -> &str;

    /// Description that tells the model when to use the tool
    fn description(&self) -> &str;

    /// JSON Schema of the tool's input
    fn input_schema(&self) -> Value;

    /// Definition advertised to the model
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description(), self.input_schema())
    }
}

/// Argument extraction helpers for tool inputs
pub mod params {
    use crate::ToolFailure;
    use serde_json::Value;

    /// Required non-empty string argument
    pub fn required_str<'a>(input: &'a Value, key: &str) -> Result<&'a str, ToolFailure> {
        input
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ToolFailure::invalid_input(format!("missing string argument '{key}'")))
    }

    /// Optional non-negative integer argument
    pub fn optional_u64(input: &Value, key: &str) -> Result<Option<u64>, ToolFailure> {
        match input.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(v) => v.as_u64().map(Some).ok_or_else(|| {
                ToolFailure::invalid_input(format!("argument '{key}' must be a non-negative integer"))
            }),
        }
    }

    /// Optional list of strings argument
    pub fn optional_str_list(input: &Value, key: &str) -> Result<Option<Vec<String>>, ToolFailure> {
        match input.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        ToolFailure::invalid_input(format!("argument '{key}' must hold strings"))
                    })
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Some),
            Some(_) => Err(ToolFailure::invalid_input(format!(
                "argument '{key}' must be a list of strings"
            ))),
        }
    }

}
