use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::registry::WorkerKind;

/// Failure of a single tool invocation.
///
/// These never abort a request: the worker records them as an error tool
/// response so the model can read the message and correct itself.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Tool execution failed: {0}")]
    ExecutionError(String),

    #[error("Tool call timed out after {0} seconds")]
    Timeout(u64),
}

pub type ToolResult<T> = Result<T, ToolError>;

/// Violations of the routing contract. Fatal for the request.
#[derive(Error, Debug)]
pub enum RoutingError {
    #[error("Supervisor returned {0:?}, which is not one of TransportAgent, HotelAgent, ItineraryAgent or FINISH")]
    InvalidDecision(String),

    #[error("Supervisor response did not contain a routing decision")]
    MissingDecision,

    #[error("Routing loop did not finish within {0} round trips")]
    RoundTripsExceeded(usize),

    #[error("Supervisor model call failed: {0:#}")]
    Provider(anyhow::Error),
}

/// Everything that can end a `/query` request with an error.
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Query must not be empty")]
    EmptyQuery,

    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error("{worker} did not produce an answer within {limit} tool rounds")]
    ToolRoundsExceeded { worker: WorkerKind, limit: usize },

    #[error("{worker} model call failed: {error:#}")]
    Provider {
        worker: WorkerKind,
        error: anyhow::Error,
    },

    #[error("Failed to render prompt: {0}")]
    Prompt(String),

    #[error("No worker has answered the query")]
    NoAnswer,

    #[error("Request was cancelled before it completed")]
    Cancelled,
}

/// Startup failures: missing keys, unreadable or invalid configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing environment variable: {env_var}")]
    MissingEnvVar { env_var: String },

    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}
