use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::Toolkit;
use crate::calculator;
use crate::errors::{ToolError, ToolResult};
use crate::models::content::Content;
use crate::models::tool::{Tool, ToolCall};
use crate::validation::{parse_arguments, Amount};

#[derive(Debug, Deserialize)]
struct Operands {
    a: Amount,
    b: Amount,
}

pub struct ArithmeticToolkit {
    tools: Vec<Tool>,
}

impl Default for ArithmeticToolkit {
    fn default() -> Self {
        Self::new()
    }
}

impl ArithmeticToolkit {
    pub fn new() -> Self {
        let schema = json!({
            "type": "object",
            "required": ["a", "b"],
            "properties": {
                "a": {"type": ["number", "string"], "description": "First operand"},
                "b": {"type": ["number", "string"], "description": "Second operand"}
            }
        });

        Self {
            tools: vec![
                Tool::new("add", "Add two numbers.", schema.clone()),
                Tool::new("multiply", "Multiply two numbers.", schema),
            ],
        }
    }

    fn apply(&self, tool: &str, arguments: Value, op: fn(f64, f64) -> f64) -> ToolResult<Vec<Content>> {
        let Operands { a, b } = parse_arguments(tool, arguments)?;
        Ok(vec![Content::text(op(a.0, b.0).to_string())])
    }
}

#[async_trait]
impl Toolkit for ArithmeticToolkit {
    fn name(&self) -> &str {
        "arithmetic"
    }

    fn description(&self) -> &str {
        "Exact addition and multiplication"
    }

    fn instructions(&self) -> &str {
        ""
    }

    fn tools(&self) -> &[Tool] {
        &self.tools
    }

    async fn call(&self, tool_call: ToolCall) -> ToolResult<Vec<Content>> {
        match tool_call.name.as_str() {
            "add" => self.apply("add", tool_call.arguments, calculator::add),
            "multiply" => self.apply("multiply", tool_call.arguments, calculator::multiply),
            _ => Err(ToolError::NotFound(tool_call.name)),
        }
    }
}
