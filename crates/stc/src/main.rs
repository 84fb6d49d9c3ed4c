//! STC CLI - static content resolution and rendering.
//!
//! Provides commands for:
//! - `render`: Render one content item to embeddable markup or JSON
//! - `resolve`: Show which file and settings a content item resolves to
//! - `list`: List the content items of a namespace
//! - `serve`: Start the HTTP server

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ListArgs, RenderArgs, ResolveArgs, ServeArgs};
use error::CliError;
use output::Output;

/// Application version from Cargo.toml.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// STC - static content resolution and rendering.
#[derive(Parser)]
#[command(name = "stc", version, about)]
struct Cli {
    /// Enable verbose output (info-level logs).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a content item.
    Render(RenderArgs),
    /// Show how a content item resolves without transforming it.
    Resolve(ResolveArgs),
    /// List the content items of a namespace.
    List(ListArgs),
    /// Start the HTTP server.
    Serve(ServeArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => args.execute(),
        Commands::Resolve(args) => args.execute(),
        Commands::List(args) => args.execute(),
        Commands::Serve(args) => serve(args),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

fn serve(args: ServeArgs) -> Result<(), CliError> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(args.execute(VERSION))
}
