use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::{ToolError, ToolResult, WorkflowError};
use crate::models::content::Content;
use crate::models::conversation::Conversation;
use crate::models::message::Message;
use crate::models::tool::{Tool, ToolCall};
use crate::prompt_template::load_prompt;
use crate::providers::base::Provider;
use crate::registry::WorkerKind;
use crate::toolkits::Toolkit;

pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 8;
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Serialize)]
struct PromptContext {
    today: String,
    toolkits: Vec<ToolkitInfo>,
}

#[derive(Clone, Debug, Serialize)]
struct ToolkitInfo {
    name: String,
    description: String,
    instructions: String,
}

impl ToolkitInfo {
    fn new(name: &str, description: &str, instructions: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            instructions: instructions.to_string(),
        }
    }
}

/// A worker integrates the shared LLM with the toolkits of one travel domain
pub struct WorkerAgent {
    kind: WorkerKind,
    provider: Arc<dyn Provider>,
    toolkits: Vec<Box<dyn Toolkit>>,
    max_tool_rounds: usize,
    tool_timeout: Duration,
}

impl WorkerAgent {
    pub fn new(kind: WorkerKind, provider: Arc<dyn Provider>) -> Self {
        Self {
            kind,
            provider,
            toolkits: Vec::new(),
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            tool_timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }

    pub fn with_limits(mut self, max_tool_rounds: usize, tool_timeout: Duration) -> Self {
        self.max_tool_rounds = max_tool_rounds;
        self.tool_timeout = tool_timeout;
        self
    }

    pub fn add_toolkit(&mut self, toolkit: Box<dyn Toolkit>) {
        self.toolkits.push(toolkit);
    }

    pub fn kind(&self) -> WorkerKind {
        self.kind
    }

    /// Get all tools from all toolkits with proper toolkit prefixing
    pub fn prefixed_tools(&self) -> Vec<Tool> {
        let mut tools = Vec::new();
        for toolkit in &self.toolkits {
            for tool in toolkit.tools() {
                tools.push(Tool::new(
                    format!("{}__{}", toolkit.name(), tool.name),
                    &tool.description,
                    tool.parameters.clone(),
                ));
            }
        }
        tools
    }

    /// Find the toolkit and unprefixed tool name for a prefixed tool name
    fn resolve_tool<'a>(&self, prefixed_name: &'a str) -> Option<(&dyn Toolkit, &'a str)> {
        let (toolkit_name, tool_name) = prefixed_name.split_once("__")?;
        if tool_name.is_empty() || tool_name.contains("__") {
            return None;
        }
        self.toolkits
            .iter()
            .find(|toolkit| toolkit.name() == toolkit_name)
            .map(|toolkit| (&**toolkit, tool_name))
    }

    /// Dispatch a single tool call to the appropriate toolkit, bounded by the tool timeout
    async fn dispatch_tool_call(&self, tool_call: ToolResult<ToolCall>) -> ToolResult<Vec<Content>> {
        let call = tool_call?;
        let (toolkit, tool_name) = self
            .resolve_tool(&call.name)
            .ok_or_else(|| ToolError::NotFound(call.name.clone()))?;

        tracing::info!(worker = %self.kind, tool = %call.name, "calling tool");
        let toolkit_call = ToolCall::new(tool_name, call.arguments);

        match tokio::time::timeout(self.tool_timeout, toolkit.call(toolkit_call)).await {
            Ok(result) => result,
            Err(_) => Err(ToolError::Timeout(self.tool_timeout.as_secs())),
        }
    }

    fn system_prompt(&self) -> Result<String, WorkflowError> {
        let toolkits: Vec<ToolkitInfo> = self
            .toolkits
            .iter()
            .map(|toolkit| {
                ToolkitInfo::new(toolkit.name(), toolkit.description(), toolkit.instructions())
            })
            .collect();

        let context = PromptContext {
            today: chrono::Local::now().format("%Y-%m-%d").to_string(),
            toolkits,
        };

        load_prompt(self.kind.prompt_template(), &context)
            .map_err(|e| WorkflowError::Prompt(e.to_string()))
    }

    /// Run the tool sub-loop until the model answers without requesting tools.
    ///
    /// Every assistant message and every batch of tool results is appended to
    /// the conversation. Tool failures are recorded as error responses and the
    /// loop continues; provider failures end the request.
    pub async fn reply(&self, conversation: &mut Conversation) -> Result<(), WorkflowError> {
        let tools = self.prefixed_tools();
        let system_prompt = self.system_prompt()?;
        let mut rounds = 0;

        loop {
            let (response, usage) = self
                .provider
                .complete(&system_prompt, conversation.messages(), &tools)
                .await
                .map_err(|error| WorkflowError::Provider {
                    worker: self.kind,
                    error,
                })?;
            tracing::debug!(worker = %self.kind, ?usage, "worker completion");

            let tool_requests: Vec<_> = response.tool_requests().into_iter().cloned().collect();
            conversation.push(response);

            if tool_requests.is_empty() {
                return Ok(());
            }

            if rounds == self.max_tool_rounds {
                return Err(WorkflowError::ToolRoundsExceeded {
                    worker: self.kind,
                    limit: self.max_tool_rounds,
                });
            }
            rounds += 1;

            // One call at a time, in the order the model asked for them
            let mut tool_results = Message::tool();
            for request in tool_requests {
                let output = self.dispatch_tool_call(request.tool_call).await;
                if let Err(error) = &output {
                    tracing::warn!(worker = %self.kind, %error, "tool call failed");
                }
                tool_results = tool_results.with_tool_response(request.id, output);
            }
            conversation.push(tool_results);
        }
    }
}
