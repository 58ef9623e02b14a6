//! CLI entrypoint for ai-cli
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use aicli_application::{
    ChatModel, ConversationAgent, DiscoverFeaturesUseCase, Feature, FeatureRegistry, Features,
    InferenceProvider, McpClientManager, ToolManager, ToolsProvider,
};
use aicli_domain::{Policies, Tool};
use aicli_infrastructure::{
    ConfigLoader, ConfiguredMcpProvider, FileConfig, FsToolsProvider, GithubToolsProvider,
    OllamaProvider, TransportConnector,
};
use aicli_presentation::{ChatRepl, Cli, Command, ConsoleFormatter, ReplProgress};
use anyhow::{Context, Result, bail};
use clap::Parser;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn verbosity_filter(verbose: u8) -> EnvFilter {
    match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    }
}

/// Install the subscriber. The returned guard flushes the log file on drop.
fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let Some(path) = &cli.log_file else {
        tracing_subscriber::registry()
            .with(verbosity_filter(cli.verbose))
            .with(console)
            .init();
        return Ok(None);
    };

    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::path::PathBuf::from("."),
    };
    let file_name = path
        .file_name()
        .with_context(|| format!("invalid log file path: {}", path.display()))?;
    std::fs::create_dir_all(&directory)
        .with_context(|| format!("failed to create log directory {}", directory.display()))?;

    let appender = tracing_appender::rolling::never(&directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::registry()
        .with(verbosity_filter(cli.verbose))
        .with(console)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer),
        )
        .init();
    Ok(Some(guard))
}

fn build_registry(config: &FileConfig) -> Result<Arc<FeatureRegistry>> {
    let registry = Arc::new(FeatureRegistry::new());

    registry.register_inference(Arc::new(OllamaProvider::new(config.ollama_settings())));

    registry.register_tools(Arc::new(FsToolsProvider::new()));
    registry.register_tools(Arc::new(GithubToolsProvider::new()));
    for (name, description, settings) in config.mcp_servers()? {
        if registry.tools_provider(&name).is_some() {
            bail!("MCP server '{name}' clashes with a built-in tools provider");
        }
        registry.register_tools(Arc::new(ConfiguredMcpProvider::new(name, description, settings)));
    }

    Ok(registry)
}

async fn discover(config: &FileConfig, policies: Option<&Policies>) -> Result<Features> {
    let registry = build_registry(config)?;
    let features = DiscoverFeaturesUseCase::new(registry)
        .execute(&config.to_discovery_config(), policies)
        .await;
    Ok(features)
}

async fn local_tools(providers: &[Arc<dyn ToolsProvider>]) -> Vec<Tool> {
    let mut tools = Vec::new();
    for provider in providers {
        match provider.get_tools().await {
            Ok(local) => tools.extend(local),
            Err(e) => warn!(provider = %provider.name(), error = %e, "Failed to load tools"),
        }
    }
    tools
}

async fn run_chat(config: &FileConfig, features: Features) -> Result<()> {
    let Some(inference) = features.inference.clone() else {
        let report = ConsoleFormatter::format_report(&features.report());
        eprintln!("{report}");
        bail!("No inference provider is available");
    };

    let model = inference
        .get_inference(None)
        .await
        .with_context(|| format!("failed to create a model for {}", inference.name()))?;
    info!(inference = %inference.name(), model = %model.name(), "Inference selected");
    let banner = format!("Using {} ({})", inference.name(), model.name());

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, shutting down");
            ctrl_c.cancel();
        }
    });

    let connector = TransportConnector::new(config.agent.request_timeout());
    let mcp = McpClientManager::start(&connector, &features.tools, &cancel).await;
    let listing = mcp.tools().await;
    for (provider, error) in &listing.failures {
        eprintln!("Warning: tools of '{provider}' are unavailable: {error}");
    }

    let mut tools = local_tools(&features.tools).await;
    tools.extend(listing.tools);
    let tool_manager = Arc::new(ToolManager::new(&features.tools, tools));
    info!(
        toolsets = tool_manager.toolsets().len(),
        tools = tool_manager.tool_count(),
        "Tools assembled"
    );

    let system_prompt = config
        .agent
        .system_prompt
        .clone()
        .or_else(|| inference.system_prompt());
    let progress = Arc::new(ReplProgress::new());
    let agent = ConversationAgent::new(model, tool_manager, system_prompt, config.to_execution_params())
        .with_progress(progress.clone());

    println!("{banner}");
    let mut repl = ChatRepl::new(Arc::new(agent), progress);
    let result = repl.run(cancel.clone()).await;

    cancel.cancel();
    mcp.stop_all().await;
    result.context("chat input failed")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(&cli)?;

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref(), cli.policies.as_deref());
        return Ok(());
    }

    info!("Starting ai-cli");

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())?
    };
    let policies = ConfigLoader::load_policies(cli.policies.as_deref())?;

    let features = discover(&config, policies.as_ref()).await?;

    match cli.command() {
        Command::Discover { output } => {
            println!("{}", ConsoleFormatter::format(&features.report(), output.into()));
            Ok(())
        }
        Command::Chat => run_chat(&config, features).await,
    }
}
