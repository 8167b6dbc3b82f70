use std::path::PathBuf;
use std::sync::Arc;
use tripmate::workflow::Workflow;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub workflow: Arc<Workflow>,
    pub static_dir: PathBuf,
}

impl AppState {
    pub fn new(workflow: Workflow, static_dir: impl Into<PathBuf>) -> Self {
        Self {
            workflow: Arc::new(workflow),
            static_dir: static_dir.into(),
        }
    }
}
