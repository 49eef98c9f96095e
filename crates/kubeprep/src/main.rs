//! kubeprep CLI - Prepare Kubernetes clusters for a CI/CD platform
//!
//! This is the main entry point for the kubeprep command-line interface.

mod cli;
mod commands;
mod output;
mod prompt;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    if let Err(e) = run(cli).await {
        output::error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Context(args) => commands::context::run(args, cli.kubeconfig, cli.batch),
        Commands::Init(args) => {
            commands::init::run(args, cli.config.as_deref(), cli.kubeconfig, cli.batch).await
        }
    }
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
