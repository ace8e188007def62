//! Kasse CLI - Terminal host shell for the POS core.
//!
//! # Usage
//!
//! ```bash
//! # Show the active catalog (fetches on first use)
//! kasse catalog
//!
//! # Configure the product feed URL without fetching
//! kasse source set https://example.com/products.json
//!
//! # Apply a scanned QR payload: set the URL and refresh in one step
//! kasse source scan https://example.com/products.json
//!
//! # Re-fetch the product list from the configured URL
//! kasse source refresh
//!
//! # Cash sale: two of p1, one of p2, customer hands over 15
//! kasse sell p1=2 p2 --tendered 15
//! ```
//!
//! # Commands
//!
//! - `catalog` - Print the active product list
//! - `source` - Show or change the product feed source
//! - `sell` - Run one sale through the checkout state machine

#![cfg_attr(not(test), forbid(unsafe_code))]
// A terminal front prints its output
#![allow(clippy::print_stdout)]

use clap::{Parser, Subcommand, ValueEnum};
use kasse_core::PaymentMethod;

mod commands;

#[derive(Parser)]
#[command(name = "kasse")]
#[command(author, version, about = "Kasse point-of-sale shell")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the active product list
    Catalog,
    /// Show or change the product feed source
    Source {
        #[command(subcommand)]
        action: SourceAction,
    },
    /// Run one sale through the checkout flow
    Sell {
        /// Items as `<product-id>` or `<product-id>=<quantity>`
        #[arg(required = true)]
        items: Vec<String>,

        /// Payment method
        #[arg(short, long, value_enum, default_value_t = MethodArg::Cash)]
        method: MethodArg,

        /// Cash amount handed over by the customer
        #[arg(short, long)]
        tendered: Option<String>,
    },
}

#[derive(Subcommand)]
enum SourceAction {
    /// Show the configured feed URL and last fetch time
    Show,
    /// Record a new feed URL without fetching
    Set {
        /// The product feed URL
        url: String,
    },
    /// Apply a scanned QR payload (set the URL, then refresh)
    Scan {
        /// The decoded QR payload, expected to be a URL
        payload: String,
    },
    /// Re-fetch the product list from the configured URL
    Refresh,
}

/// Payment method argument.
#[derive(Clone, Copy, ValueEnum)]
enum MethodArg {
    Cash,
    Twint,
}

impl From<MethodArg> for PaymentMethod {
    fn from(method: MethodArg) -> Self {
        match method {
            MethodArg::Cash => Self::Cash,
            MethodArg::Twint => Self::Twint,
        }
    }
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
    let config = kasse_client::ClientConfig::from_env()?;
    let manager = commands::open_manager(&config)?;

    match cli.command {
        Commands::Catalog => commands::catalog::show(&manager).await?,
        Commands::Source { action } => match action {
            SourceAction::Show => commands::catalog::show_source(&manager),
            SourceAction::Set { url } => commands::catalog::set_source(&manager, &url)?,
            SourceAction::Scan { payload } => {
                commands::catalog::scan_source(&manager, &payload).await?;
            }
            SourceAction::Refresh => commands::catalog::refresh(&manager).await?,
        },
        Commands::Sell {
            items,
            method,
            tendered,
        } => {
            commands::sell::run(&manager, &items, method.into(), tendered.as_deref()).await?;
        }
    }
    Ok(())
}
