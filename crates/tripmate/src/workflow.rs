//! The ROUTE / DISPATCH / DONE loop for one query.
//!
//! The supervisor picks a worker, the worker runs its tool sub-loop and
//! control returns to the supervisor, until it answers FINISH. The number of
//! supervisor decisions is bounded, and the whole run can be abandoned through
//! a cancellation future.

use std::future::Future;
use std::sync::Arc;

use crate::errors::{RoutingError, WorkflowError};
use crate::models::conversation::Conversation;
use crate::models::message::Message;
use crate::registry::{AgentRegistry, WorkerKind};
use crate::supervisor::{RoutingDecision, Supervisor};

pub struct Workflow {
    supervisor: Arc<dyn Supervisor>,
    registry: Arc<AgentRegistry>,
    max_round_trips: usize,
}

impl Workflow {
    pub fn new(
        supervisor: Arc<dyn Supervisor>,
        registry: Arc<AgentRegistry>,
        max_round_trips: usize,
    ) -> Self {
        Self {
            supervisor,
            registry,
            max_round_trips,
        }
    }

    /// Answer `query`, or stop with `WorkflowError::Cancelled` as soon as `cancel` resolves
    pub async fn run<F>(&self, query: &str, cancel: F) -> Result<String, WorkflowError>
    where
        F: Future<Output = ()>,
    {
        if query.trim().is_empty() {
            return Err(WorkflowError::EmptyQuery);
        }

        tokio::select! {
            biased;
            _ = cancel => {
                tracing::warn!("query cancelled before completion");
                Err(WorkflowError::Cancelled)
            }
            result = self.execute(query) => result,
        }
    }

    async fn execute(&self, query: &str) -> Result<String, WorkflowError> {
        let mut conversation = Conversation::from_query(query);

        for round_trip in 1..=self.max_round_trips {
            match self.supervisor.decide(&conversation).await? {
                RoutingDecision::Finish => {
                    tracing::info!(round_trip, "workflow finished");
                    return conversation.last_answer().ok_or(WorkflowError::NoAnswer);
                }
                RoutingDecision::Route(kind) => {
                    self.dispatch(kind, &mut conversation, round_trip).await?;
                }
            }
        }

        tracing::error!(limit = self.max_round_trips, "routing loop did not finish");
        Err(RoutingError::RoundTripsExceeded(self.max_round_trips).into())
    }

    async fn dispatch(
        &self,
        kind: WorkerKind,
        conversation: &mut Conversation,
        round_trip: usize,
    ) -> Result<(), WorkflowError> {
        let agent = self
            .registry
            .get(kind)
            .ok_or_else(|| RoutingError::InvalidDecision(kind.to_string()))?;

        tracing::info!(worker = %kind, round_trip, "dispatching");
        conversation.push(
            Message::system().with_text(format!("Supervisor routed this step to {}", kind)),
        );
        agent.reply(conversation).await
    }
}
