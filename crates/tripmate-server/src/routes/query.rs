use crate::{error::ApiError, state::AppState};
use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tracing::Instrument;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
struct QueryRequest {
    query: String,
}

#[derive(Debug, Serialize)]
struct QueryResponse {
    answer: String,
}

async fn handler(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("query", %request_id);

    // axum drops this future when the client goes away, which drops the
    // sender and resolves the workflow's cancellation future
    let (_disconnect_guard, disconnected) = oneshot::channel::<()>();
    let workflow = state.workflow.clone();

    let task = tokio::spawn(
        async move {
            tracing::info!(query = %request.query, "received query");
            let cancel = async {
                let _ = disconnected.await;
            };
            workflow.run(&request.query, cancel).await
        }
        .instrument(span),
    );

    let answer = task.await??;
    Ok(Json(QueryResponse { answer }))
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/query", post(handler))
        .with_state(state)
}
