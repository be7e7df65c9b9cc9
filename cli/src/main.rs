//! ChainRelay CLI.
//!
//! # Commands
//! ```text
//! chainrelay run         --config <config.yaml>
//! chainrelay parse-event --network <family> [--file <path.json>]
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd_parse_event;
mod cmd_run;

#[derive(Parser)]
#[command(
    name = "chainrelay",
    about = "Chain event listener, dedup, and notification pipeline",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline from a YAML config
    Run {
        /// Path to the YAML run config
        #[arg(short, long, default_value = "config.yaml")]
        config: String,
    },

    /// Parse one raw event and print its normalized form
    #[command(name = "parse-event")]
    ParseEvent {
        /// Network family: substrate | aave | compound | cosmos | erc20 | erc721
        #[arg(long)]
        network: String,
        /// Raw event JSON file (reads stdin when omitted)
        #[arg(long)]
        file: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config } => cmd_run::run(&config).await,
        Commands::ParseEvent { network, file } => cmd_parse_event::run(&network, file.as_deref()),
    }
}
