use crate::{error::ApiError, state::AppState};
use axum::{extract::State, response::Html, routing::get, Router};
use tower_http::services::ServeDir;

async fn index(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let path = state.static_dir.join("index.html");
    match tokio::fs::read_to_string(&path).await {
        Ok(page) => Ok(Html(page)),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "frontend not available");
            Err(ApiError::NotFound("Frontend files missing".to_string()))
        }
    }
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .nest_service("/static", ServeDir::new(&state.static_dir))
        .with_state(state)
}
