// Export route modules
pub mod frontend;
pub mod health;
pub mod query;

use crate::state::AppState;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// Function to configure all routes
pub fn configure(state: AppState) -> Router {
    Router::new()
        .merge(query::routes(state.clone()))
        .merge(health::routes())
        .merge(frontend::routes(state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
