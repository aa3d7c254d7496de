use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use snaplink::analytics::AnalyticsAggregator;
use snaplink::config::Config;
use snaplink::shortener::{CodeGenerator, LinkRegistry};
use snaplink::storage;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "snaplink-admin")]
#[command(about = "Snaplink link management CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a short link
    Shorten {
        /// Target URL
        url: String,
        /// Custom short code (3-20 characters of [A-Za-z0-9_-])
        #[arg(long)]
        code: Option<String>,
    },
    /// Print the target of an active short code
    Resolve { code: String },
    /// Deactivate a short code
    Deactivate { code: String },
    /// Show total and recent clicks
    Analytics { code: String },
    /// Show daily clicks for the last 30 days
    Stats { code: String },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let storage = storage::connect(&config.database).await?;
    storage.init().await?;

    let registry = LinkRegistry::new(
        Arc::clone(&storage),
        CodeGenerator::new(config.short_code_length),
    );
    let aggregator = AnalyticsAggregator::new(Arc::clone(&storage));

    let result = match cli.command {
        Commands::Shorten { url, code } => registry
            .create_short_link(&url, code.as_deref())
            .await
            .context("failed to create short link")
            .and_then(|link| print_json(&link)),
        Commands::Resolve { code } => registry
            .resolve(&code)
            .await
            .with_context(|| format!("cannot resolve '{code}'"))
            .map(|url| println!("{url}")),
        Commands::Deactivate { code } => match registry.deactivate(&code).await {
            Ok(true) => {
                println!("✅ Deactivated {code}");
                Ok(())
            }
            Ok(false) => {
                println!("No short link named {code}");
                Ok(())
            }
            Err(e) => Err(anyhow::Error::new(e).context("failed to deactivate")),
        },
        Commands::Analytics { code } => aggregator
            .get_analytics(&code)
            .await
            .with_context(|| format!("cannot load analytics for '{code}'"))
            .and_then(|analytics| print_json(&analytics)),
        Commands::Stats { code } => aggregator
            .get_click_stats(&code)
            .await
            .with_context(|| format!("cannot load stats for '{code}'"))
            .and_then(|stats| print_json(&stats)),
    };

    storage.close().await;
    result
}
