use anyhow::Context;
use clap::Parser;
use sems_api::{ServerConfig, create_app};
use sems_engine::Engine;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Command line arguments for the sems server
#[derive(Parser, Debug)]
#[command(name = "sems")]
#[command(about = "Live telemetry and control endpoint for charging stations")]
struct Args {
    /// Path to the server configuration JSON file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to bind the server to
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Directory served under /static (overrides the config file)
    #[arg(long)]
    static_dir: Option<PathBuf>,
}

async fn load_config(path: Option<&PathBuf>) -> anyhow::Result<ServerConfig> {
    let Some(path) = path else {
        tracing::info!("No config file given, using defaults");
        return Ok(ServerConfig::default());
    };

    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    let config = ServerConfig::from_json(&content)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))?;

    tracing::info!("Loaded server config from {}", path.display());
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .pretty()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut config = load_config(args.config.as_ref()).await?;
    if let Some(static_dir) = args.static_dir {
        config.static_dir = static_dir;
    }

    tracing::info!(
        "Ticking every {} ms, serving static files from {}",
        config.tick_interval_ms,
        config.static_dir.display()
    );

    // Create the live engine and build our application with routes
    let engine = Engine::new(config.tick_interval());
    let app = create_app(engine, config);

    // Run our app with hyper
    let bind_addr = format!("0.0.0.0:{}", args.port);
    tracing::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
