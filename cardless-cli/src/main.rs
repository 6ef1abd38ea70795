//! Cardless CLI - bank account data in your terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{accounts, institutions, requisitions};

/// Cardless - GoCardless Bank Account Data in your terminal
///
/// Credentials are read from CARDLESS_SECRET_ID and CARDLESS_SECRET_KEY.
#[derive(Parser)]
#[command(name = "cardless", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List institutions available in a country
    Institutions {
        /// ISO 3166 two-letter country code
        #[arg(long, short)]
        country: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one institution
    Institution {
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List requisitions
    Requisitions {
        /// Page size
        #[arg(long, default_value_t = 100)]
        limit: u32,
        /// Items to skip
        #[arg(long, default_value_t = 0)]
        offset: u32,
        /// Follow next pages until the end
        #[arg(long, conflicts_with = "offset")]
        all: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one requisition
    Requisition {
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start a bank linking flow
    CreateRequisition {
        /// Institution id (see `cardless institutions`)
        #[arg(long)]
        institution: String,
        /// Where the bank sends the user back after consent
        #[arg(long)]
        redirect: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a requisition and its account access
    DeleteRequisition {
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show account details
    Account {
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show account balances
    Balances {
        account: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List booked and pending transactions
    Transactions {
        account: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let result = run(cli);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Core errors already carry their cause in the message
            output::error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Institutions { country, json } => institutions::list(&country, json),
        Commands::Institution { id, json } => institutions::show(&id, json),
        Commands::Requisitions { limit, offset, all, json } => {
            requisitions::list(limit, offset, all, json)
        }
        Commands::Requisition { id, json } => requisitions::show(&id, json),
        Commands::CreateRequisition { institution, redirect, json } => {
            requisitions::create(&institution, &redirect, json)
        }
        Commands::DeleteRequisition { id, json } => requisitions::delete(&id, json),
        Commands::Account { id, json } => accounts::show(&id, json),
        Commands::Balances { account, json } => accounts::balances(&account, json),
        Commands::Transactions { account, json } => accounts::transactions(&account, json),
    }
}
