//! CLI entrypoint for relay
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod demo;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use relay_application::ModelInvoker;
use relay_infrastructure::{ChatBackendConfig, ChatCompletionsBackend, ConfigLoader, FileConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "relay", about = "LLM workflow orchestration demos", version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a config file (overrides discovered configs)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Ignore all config files and use defaults
    #[arg(long, global = true)]
    no_config: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the prompt-chaining calendar pipeline
    Chain { input: String },
    /// Classify a request and dispatch to an intent handler
    Route { input: String },
    /// Fan out calendar and security validation, then gate
    Validate { input: String },
    /// Answer a weather question through the tool loop
    Weather { input: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).map_err(|err| anyhow::anyhow!(err))?
    };

    info!(model = %config.backend.model, "Starting relay");

    // === Dependency Injection ===
    let invoker = Arc::new(ModelInvoker::new(build_backend(&config)?, &config.execution));

    match cli.command {
        Command::Chain { input } => demo::chaining::run(invoker, &input).await,
        Command::Route { input } => demo::routing::run(invoker, &config.execution, &input).await,
        Command::Validate { input } => {
            demo::validation::run(invoker, &config.execution, &input).await
        }
        Command::Weather { input } => demo::weather::run(invoker, &config.execution, &input).await,
    }
}

fn build_backend(config: &FileConfig) -> Result<Arc<ChatCompletionsBackend>> {
    let api_key = std::env::var(&config.backend.api_key_env).with_context(|| {
        format!(
            "environment variable {} is not set",
            config.backend.api_key_env
        )
    })?;

    let backend_config = ChatBackendConfig::new(
        config.backend.endpoint.clone(),
        api_key,
        config.backend.model.clone(),
    )
    .with_timeout_ms(config.backend.timeout_ms);

    Ok(Arc::new(ChatCompletionsBackend::new(backend_config)?))
}
