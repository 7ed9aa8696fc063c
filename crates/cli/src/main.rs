//! Bazaar CLI - Database migrations and catalog tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply the storefront schema
//! bazaar-cli migrate
//!
//! # Insert the built-in sample catalog
//! bazaar-cli seed
//!
//! # Insert a catalog from a YAML file, even if products already exist
//! bazaar-cli seed --file catalog.yaml --force
//! ```
//!
//! Both commands read `BAZAAR_DATABASE_URL` (or `DATABASE_URL`) the same way
//! the storefront does.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bazaar-cli")]
#[command(author, version, about = "Bazaar CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the product catalog
    Seed {
        /// YAML catalog file (defaults to the built-in sample catalog)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Seed even if the catalog already has products
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file, force } => {
            let inserted = commands::seed::run(file.as_deref(), force).await?;
            tracing::info!(inserted, "Seeding complete");
        }
    }
    Ok(())
}
