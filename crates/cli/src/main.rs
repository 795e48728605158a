//! Mini Shop CLI - migrations and catalog management.
//!
//! # Usage
//!
//! ```bash
//! # Create the document table for STORE_BACKEND=postgres
//! shop-cli migrate
//!
//! # Load products from YAML into the configured store
//! shop-cli seed products seed/products.yaml
//!
//! # Show what the Products table holds
//! shop-cli products list
//! ```
//!
//! Store selection uses the same environment variables as the API service
//! (`STORE_BACKEND`, `PRODUCTS_TABLE`, `DATABASE_URL`, ...).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "shop-cli")]
#[command(author, version, about = "Mini Shop CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run `PostgreSQL` migrations for the document store
    Migrate,
    /// Load data into the configured store
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Inspect the product catalog
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Seed products from a YAML list
    Products {
        /// Path to the YAML file
        file: String,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List every product in the Products table
    List,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { target } => match target {
            SeedTarget::Products { file } => commands::seed::products(&file).await?,
        },
        Commands::Products { action } => match action {
            ProductsAction::List => commands::products::list().await?,
        },
    }
    Ok(())
}
