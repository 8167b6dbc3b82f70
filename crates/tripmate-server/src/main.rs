mod configuration;
mod error;
mod routes;
mod state;

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tripmate::{
    config::{load_env_file, ApiKeys},
    providers::{base::Provider, factory},
    registry::AgentRegistry,
    services::ServiceClients,
    supervisor::LlmSupervisor,
    workflow::Workflow,
};

use crate::configuration::AppConfig;
use crate::state::AppState;

/// Supervisor-routed travel assistant over HTTP
#[derive(Debug, Parser)]
#[command(name = "tripmated", version, about)]
struct Args {
    /// YAML configuration file (defaults to config/config.yaml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding index.html and the frontend assets
    #[arg(long, default_value = "static")]
    static_dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    load_env_file();

    let config = AppConfig::new(args.config.as_deref()).context("Failed to load configuration")?;
    let keys = ApiKeys::from_env(config.app.llm.provider)
        .context("Failed to read API keys from the environment")?;

    let provider_config = config.app.provider_config(&keys.llm);
    tracing::info!(
        provider = %config.app.llm.provider,
        model = provider_config.model(),
        "using LLM provider"
    );
    let provider: Arc<dyn Provider> = Arc::from(factory::get_provider(provider_config)?);

    let workflow_settings = &config.app.workflow;
    // Half the tool budget per HTTP request, so a place search that times out
    // on its primary provider still has time for the fallback
    let services = ServiceClients::from_keys(&keys, workflow_settings.tool_timeout() / 2)?;
    let registry = AgentRegistry::new(provider.clone(), &services, workflow_settings);
    let supervisor = LlmSupervisor::new(provider, &registry.workers())?;
    let workflow = Workflow::new(
        Arc::new(supervisor),
        Arc::new(registry),
        workflow_settings.max_round_trips,
    );

    let app = routes::configure(AppState::new(workflow, args.static_dir));

    let listener = tokio::net::TcpListener::bind(config.server.socket_addr()?).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
