//! # tessera
//!
//! Tessera - Server-side hypermedia templates in Rust.
//!
//! ## Name Origin
//!
//! A **tessera** is a single tile of a mosaic. Every template in a Tessera
//! project is one such tile; rendering a page sets them together.

mod commands;
mod config;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tessera")]
#[command(about = "Server-side hypermedia templates in Rust", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a tag to HTML
    Render(commands::render::RenderArgs),

    /// Compile and parse every template under a directory
    Check(commands::check::CheckArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render(args) => commands::render::run(args),
        Commands::Check(args) => commands::check::run(args),
    }
}
