use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cf_domain::config::Config;
use cf_gateway::api;
use cf_gateway::state::AppState;

#[derive(Parser)]
#[command(name = "chatforge", about = "Multi-provider LLM chat gateway")]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP gateway (the default).
    Serve,
    /// Print the effective configuration and exit.
    ConfigShow,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        None | Some(Command::Serve) => serve(config).await,
        Some(Command::ConfigShow) => {
            let rendered =
                toml::to_string_pretty(&config).context("serializing effective config")?;
            println!("{rendered}");
            Ok(())
        }
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let state = AppState::from_config(config).context("building application state")?;

    if state.llm.is_empty() {
        tracing::warn!(
            "no LLM providers registered; chat endpoints will answer 503 until one is added"
        );
    }

    let addr = format!(
        "{}:{}",
        state.config.server.host, state.config.server.port
    );
    let router = api::router::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(addr = %addr, "chatforge gateway listening");

    axum::serve(listener, router).await.context("serving")?;
    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
        }
        None => {
            let default = std::path::Path::new("config.toml");
            if default.exists() {
                let raw = std::fs::read_to_string(default).context("reading config.toml")?;
                toml::from_str(&raw).context("parsing config.toml")
            } else {
                tracing::debug!("no config file found, using defaults");
                Ok(Config::default())
            }
        }
    }
}
