use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod chat;
pub mod serve;

use crate::core::AppConfig;

#[derive(Subcommand)]
enum Command {
    /// Run the API server
    Serve {
        /// Set the server host address
        #[arg(long)]
        host: Option<String>,

        /// Set the server port
        #[arg(long)]
        port: Option<u16>,

        /// Milliseconds to wait between response fragments
        #[arg(long)]
        chunk_delay_ms: Option<u64>,
    },
    /// Start an interactive chat session against a running server
    Chat {
        /// Base URL of the server
        #[arg(long)]
        api_url: Option<String>,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();

    // Flags win over the environment
    let mut config = AppConfig::default();

    // Handle each sub command
    match args.command {
        Some(Command::Serve {
            host,
            port,
            chunk_delay_ms,
        }) => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(millis) = chunk_delay_ms {
                config.chunk_delay = Duration::from_millis(millis);
            }
            serve::run(config).await?;
        }
        Some(Command::Chat { api_url }) => {
            if let Some(api_url) = api_url {
                config.api_url = api_url;
            }
            chat::run(config).await?;
        }
        None => {}
    }

    Ok(())
}
