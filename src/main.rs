//! Osmosis tools CLI
//!
//! Serves the tools over stdio, or calls one directly from the shell.

use clap::{Parser, Subcommand};
use osmosis_exec_tools::tx::pretty_json;
use osmosis_exec_tools::{Config, Error, Network, Result, ToolRegistry, ToolServer};
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "osmosis-tools")]
#[command(about = "Osmosis transaction execution tools for LLM hosts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a JSON config file (default: environment)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Network override: mainnet or testnet
    #[arg(short, long, global = true)]
    network: Option<Network>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve tools over stdio (newline-delimited JSON-RPC)
    Serve,

    /// Call a single tool and print its JSON result
    Call {
        /// Tool name, e.g. `send`
        tool: String,

        /// Arguments as a JSON object; `-` reads them from stdin
        #[arg(default_value = "{}")]
        args: String,
    },

    /// List available tools
    Tools,

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore if not found)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose { "debug" } else { "info" })
    });

    // stdout belongs to the protocol; all logs go to stderr
    let json_layer = cli
        .log_json
        .then(|| fmt::layer().json().with_writer(std::io::stderr));
    let text_layer = (!cli.log_json).then(|| fmt::layer().with_writer(std::io::stderr));
    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();

    let mut config = match &cli.config {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
            serde_json::from_str(&content).map_err(|e| Error::Config(e.to_string()))?
        }
        None => Config::from_env()?,
    };
    if let Some(network) = cli.network {
        config.network = network;
    }

    match cli.command {
        Commands::Serve => {
            let registry = ToolRegistry::from_config(&config);
            ToolServer::new(registry).serve_stdio().await?;
        }
        Commands::Call { tool, args } => {
            let args = read_args(&args)?;
            let registry = ToolRegistry::from_config(&config);
            let output = registry.call(&tool, args).await;
            println!("{}", pretty_json(&output));
        }
        Commands::Tools => {
            let registry = ToolRegistry::from_config(&config);
            for definition in registry.definitions() {
                println!(
                    "{:<30} {}",
                    definition["name"].as_str().unwrap_or_default(),
                    definition["description"].as_str().unwrap_or_default()
                );
            }
        }
        Commands::Config => {
            let shown = serde_json::json!({
                "config": config,
                "resolved": config.network_config(),
            });
            println!("{}", serde_json::to_string_pretty(&shown)?);
        }
    }

    Ok(())
}

/// Keeps mnemonics out of shell history when `-` is given
fn read_args(raw: &str) -> Result<serde_json::Value> {
    let text = if raw == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        raw.to_string()
    };
    serde_json::from_str(&text).map_err(|e| Error::InvalidArgument(format!("args: {}", e)))
}
