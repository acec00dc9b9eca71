//! Diametric CLI
//!
//! Command-line access to the mapping engine over a JSON entity
//! definition file.
//!
//! # Commands
//!
//! - `schema` - Print the schema transaction as EDN
//! - `query` - Print the fetch query and its arguments for one entity type

mod commands;
mod definition;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Diametric entity mapping tools.
#[derive(Parser)]
#[command(name = "diametric")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the schema for every entity type in a definition file
    Schema {
        /// Path to the JSON definition file
        file: PathBuf,
    },

    /// Print the query fetching one entity type
    Query {
        /// Path to the JSON definition file
        file: PathBuf,

        /// Entity type name
        #[arg(short, long)]
        entity: String,

        /// Filter as key=value (repeatable)
        #[arg(short, long = "filter")]
        filters: Vec<String>,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays valid EDN
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Schema { file } => commands::schema::run(&file)?,
        Commands::Query {
            file,
            entity,
            filters,
        } => commands::query::run(&file, &entity, &filters)?,
        Commands::Version => {
            println!("Diametric CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Diametric Core v{}", diametric_core::VERSION);
        }
    }

    Ok(())
}
