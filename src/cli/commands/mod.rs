
use crate::config::{Config, read_config};
use crate::dispatch::Dispatcher;
use crate::line::{LineClient, build};
use crate::product::ProductList;
use crate::rakuten::{DEFAULT_HITS, ProductSearch, RakutenClient};
use crate::utils::http::build_http_client;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "shopcrab")]
#[command(about = "LINE bot that answers keywords with Rakuten product cards")]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to $SHOPCRAB_CONFIG, then built-in defaults)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the webhook server
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long, short)]
        port: Option<u16>,
    },
    /// Search once and print the Flex reply that would be sent
    Search { keyword: String },
    /// Check configuration and credentials
    CheckConfig,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Serve { host, port } => serve(config_path, host, port).await,
        Commands::Search { keyword } => search(config_path, &keyword).await,
        Commands::CheckConfig => super::doctor::run(config_path),
    }
}

/// Read the config and apply command-line overrides before validating, so a
/// bad `--port` is reported the same way as a bad config value.
fn serve_config(
    config_path: Option<&Path>,
    host: Option<String>,
    port: Option<u16>,
) -> Result<Config> {
    let mut config = read_config(config_path)?;
    if let Some(host) = host {
        config.gateway.host = host;
    }
    if let Some(port) = port {
        config.gateway.port = port;
    }
    config
        .validate()
        .context("Configuration validation failed")?;
    Ok(config)
}

async fn serve(config_path: Option<&Path>, host: Option<String>, port: Option<u16>) -> Result<()> {
    info!("Loading configuration...");
    let config = serve_config(config_path, host, port)?;

    let http = build_http_client(&config.http)?;
    let search = Arc::new(RakutenClient::new(&config.rakuten, http.clone()));
    let replier = Arc::new(LineClient::new(&config.line, http));
    let dispatcher = Arc::new(Dispatcher::new(
        config.line.channel_secret.clone(),
        search,
        replier,
    ));

    let gw = &config.gateway;
    let server = crate::gateway::start(&gw.host, gw.port, &gw.webhook_path, dispatcher).await?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            println!("\nShutting down...");
        }
        _ = server => {
            warn!("HTTP server stopped");
        }
    }
    Ok(())
}

async fn search(config_path: Option<&Path>, keyword: &str) -> Result<()> {
    let config = read_config(config_path)?;
    config
        .validate_search()
        .context("Configuration validation failed")?;

    let client = RakutenClient::new(&config.rakuten, build_http_client(&config.http)?);
    let items = client.search(keyword, DEFAULT_HITS).await?;
    info!("{} product(s) for {:?}", items.len(), keyword);
    println!("{}", render_reply(&items)?);
    Ok(())
}

/// Pretty-printed JSON of the reply message for `items`.
fn render_reply(items: &ProductList) -> Result<String> {
    serde_json::to_string_pretty(&build(items)).context("Failed to serialize reply")
}
