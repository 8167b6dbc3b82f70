//! Tool bundles exposed to the worker agents.
pub mod arithmetic;
pub mod currency;
pub mod expenses;
pub mod flights;
pub mod hotels;
pub mod places;
pub mod weather;

use async_trait::async_trait;

use crate::errors::ToolResult;
use crate::models::content::Content;
use crate::models::tool::{Tool, ToolCall};

/// A named set of tools a worker can offer to its model
#[async_trait]
pub trait Toolkit: Send + Sync {
    /// Get the name of the toolkit, used as the tool name prefix
    fn name(&self) -> &str;

    /// Get the toolkit description
    fn description(&self) -> &str;

    /// Get usage notes appended to the worker's system prompt
    fn instructions(&self) -> &str;

    /// Get available tools, unprefixed
    fn tools(&self) -> &[Tool];

    /// Call a tool by its unprefixed name
    async fn call(&self, tool_call: ToolCall) -> ToolResult<Vec<Content>>;
}

/// Schema for tools whose only argument is a place name
pub(crate) fn single_string_schema(field: &str, description: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "required": [field],
        "properties": {
            field: {
                "type": "string",
                "description": description
            }
        }
    })
}

/// Reject blank free-text arguments
pub(crate) fn require_text(tool: &str, field: &str, value: &str) -> ToolResult<()> {
    if value.trim().is_empty() {
        return Err(crate::errors::ToolError::InvalidParameters(format!(
            "{}: {} must not be empty",
            tool, field
        )));
    }
    Ok(())
}
