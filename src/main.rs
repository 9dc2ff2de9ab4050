mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod infra;
mod services;
mod web;
mod workflow;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cmd::config::{self as config_cmd, ConfigArgs};
use crate::cmd::serve::{self, ServeArgs};
use crate::error::AppResult;

#[derive(Parser)]
#[command(
    name = "crisis-desk",
    author,
    version,
    about = "Drafts crisis press statements and revises them for legal safety"
)]
struct Cli {
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the statement web form.
    Serve(ServeArgs),
    /// Manage stored configuration.
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Config(args) => config_cmd::run(args.command),
        Commands::Serve(args) => serve::run(args).await,
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("crisis_desk={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
