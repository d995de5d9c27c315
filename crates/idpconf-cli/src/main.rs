mod bundle;
mod cli;
mod commands;
mod config;
mod dssp;
mod error;
mod logging;
mod utils;

use crate::cli::{Cli, Commands};
use crate::error::{CliError, Result};
use clap::Parser;
use tokio::task;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run_app().await {
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, &cli.log_file)?;

    info!(
        "🚀 IDPConfGen CLI v{} starting up.",
        env!("CARGO_PKG_VERSION")
    );
    debug!("Full CLI arguments parsed: {:?}", &cli);

    if let Some(num_threads) = cli.threads {
        info!(
            "Setting Rayon global thread pool to {} threads.",
            num_threads
        );
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .map_err(|e| {
                CliError::Other(anyhow::anyhow!("Failed to build global thread pool: {}", e))
            })?;
    }

    let command_result = match cli.command {
        Commands::Fetch(args) => {
            info!("Dispatching to 'fetch' command.");
            commands::fetch::run(args).await
        }
        Commands::Sscalc(args) => {
            info!("Dispatching to 'sscalc' command.");
            commands::sscalc::run(args).await
        }
        Commands::Extract(args) => {
            info!("Dispatching to 'extract' command.");
            task::block_in_place(|| commands::extract::run(args))
        }
        Commands::Fasta(args) => {
            info!("Dispatching to 'fasta' command.");
            task::block_in_place(|| commands::fasta::run(args))
        }
        Commands::Attach(args) => {
            info!("Dispatching to 'attach' command.");
            task::block_in_place(|| commands::attach::run(args))
        }
    };

    match &command_result {
        Ok(_) => {
            info!("✅ Command completed successfully.");
            println!("✅ Command completed successfully.");
        }
        Err(e) => {
            error!("❌ Command failed: {}", e);
            eprintln!("❌ Command failed: {}", e);
        }
    }

    command_result
}
