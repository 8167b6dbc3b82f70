//! The routing decision-maker.
//!
//! The supervisor reads the whole conversation and names the worker that acts
//! next, or `FINISH`. Its output is restricted to a closed set of labels and
//! anything else is rejected rather than guessed at.

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use strum::IntoEnumIterator;

use crate::errors::RoutingError;
use crate::models::conversation::Conversation;
use crate::models::message::Message;
use crate::models::tool::Tool;
use crate::prompt_template::{load_prompt, SUPERVISOR_PROMPT};
use crate::providers::base::Provider;
use crate::registry::{WorkerInfo, WorkerKind};

pub const ROUTE_TOOL: &str = "route";
pub const FINISH_LABEL: &str = "FINISH";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingDecision {
    Route(WorkerKind),
    Finish,
}

impl FromStr for RoutingDecision {
    type Err = RoutingError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        let label = label.trim();
        if label == FINISH_LABEL || label == "Finish" {
            return Ok(RoutingDecision::Finish);
        }
        WorkerKind::from_str(label)
            .map(RoutingDecision::Route)
            .map_err(|_| RoutingError::InvalidDecision(label.to_string()))
    }
}

impl fmt::Display for RoutingDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingDecision::Route(kind) => write!(f, "{}", kind),
            RoutingDecision::Finish => f.write_str(FINISH_LABEL),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Supervisor: Send + Sync {
    /// Decide which worker acts next given everything said so far
    async fn decide(&self, conversation: &Conversation) -> Result<RoutingDecision, RoutingError>;
}

#[derive(Debug, Deserialize)]
struct RouteArgs {
    next: String,
    #[serde(default)]
    reason: Option<String>,
}

/// Supervisor backed by the LLM, constrained to a single `route` tool call
pub struct LlmSupervisor {
    provider: Arc<dyn Provider>,
    system_prompt: String,
    route_tool: Tool,
}

impl LlmSupervisor {
    pub fn new(provider: Arc<dyn Provider>, workers: &[WorkerInfo]) -> Result<Self> {
        let mut context = std::collections::HashMap::new();
        context.insert("workers", workers);
        let system_prompt = load_prompt(SUPERVISOR_PROMPT, &context)?;

        let mut labels: Vec<String> = WorkerKind::iter().map(|k| k.to_string()).collect();
        labels.push(FINISH_LABEL.to_string());

        let route_tool = Tool::new(
            ROUTE_TOOL,
            "Select the worker that should act next, or FINISH when the user's request is fully answered.",
            json!({
                "type": "object",
                "required": ["next"],
                "properties": {
                    "next": {
                        "type": "string",
                        "enum": labels,
                        "description": "The worker to run next, or FINISH"
                    },
                    "reason": {
                        "type": "string",
                        "description": "One sentence explaining the choice"
                    }
                }
            }),
        );

        Ok(Self {
            provider,
            system_prompt,
            route_tool,
        })
    }

    fn extract(response: &Message) -> Result<RouteArgs, RoutingError> {
        if let Some(request) = response.tool_requests().first() {
            let call = request
                .tool_call
                .as_ref()
                .map_err(|e| RoutingError::InvalidDecision(e.to_string()))?;
            if call.name != ROUTE_TOOL {
                return Err(RoutingError::InvalidDecision(call.name.clone()));
            }
            return serde_json::from_value(call.arguments.clone())
                .map_err(|_| RoutingError::InvalidDecision(call.arguments.to_string()));
        }

        let text = response.text().ok_or(RoutingError::MissingDecision)?;
        match serde_json::from_str::<RouteArgs>(text.trim()) {
            Ok(args) => Ok(args),
            Err(_) => Ok(RouteArgs {
                next: text,
                reason: None,
            }),
        }
    }
}

#[async_trait]
impl Supervisor for LlmSupervisor {
    async fn decide(&self, conversation: &Conversation) -> Result<RoutingDecision, RoutingError> {
        let (response, _) = self
            .provider
            .complete(
                &self.system_prompt,
                conversation.messages(),
                std::slice::from_ref(&self.route_tool),
            )
            .await
            .map_err(RoutingError::Provider)?;

        let args = Self::extract(&response)?;
        let decision = args.next.parse::<RoutingDecision>()?;

        tracing::info!(
            %decision,
            reason = args.reason.as_deref().unwrap_or(""),
            "supervisor decision"
        );
        Ok(decision)
    }
}
