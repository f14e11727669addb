use crate::models::transaction::TransactionType;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "cashbook", version, about = "Personal income and expense ledger")]
pub struct Cli {
    /// SQLite file holding the ledger
    #[arg(long, env = "CASHBOOK_DB", default_value = "cashbook.db", global = true)]
    pub db: PathBuf,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, env = "CASHBOOK_LOG", default_value = "warn", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Record a new transaction
    Add(AddArgs),
    /// Replace the fields of an existing transaction; omitted fields keep their value
    Edit(EditArgs),
    /// Delete one transaction
    Remove {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Delete every transaction
    Clear {
        #[arg(long, short)]
        yes: bool,
    },
    /// Show transactions, newest first
    List {
        #[arg(long)]
        category: Option<String>,
        #[arg(long = "type", value_name = "TYPE")]
        transaction_type: Option<TransactionType>,
    },
    /// Show the running balance
    Balance,
    /// Show income/expense totals and the monthly summary
    Report,
    /// Write all transactions to a dated CSV file
    Export {
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Add transactions from a CSV file in the export layout
    Import { file: PathBuf },
    /// List the suggested categories
    Categories {
        #[arg(long = "type", value_name = "TYPE")]
        transaction_type: Option<TransactionType>,
    },
    /// Interactive terminal browser
    Browse,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    #[arg(long)]
    pub amount: String,
    #[arg(long = "type", value_name = "TYPE")]
    pub transaction_type: String,
    #[arg(long)]
    pub category: String,
    #[arg(long, default_value = "")]
    pub payment_mode: String,
    #[arg(long, default_value = "")]
    pub description: String,
    /// YYYY-MM-DD, defaults to today
    #[arg(long)]
    pub date: Option<String>,
}

#[derive(Debug, Args)]
pub struct EditArgs {
    pub id: String,
    #[arg(long)]
    pub amount: Option<String>,
    #[arg(long = "type", value_name = "TYPE")]
    pub transaction_type: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub payment_mode: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub date: Option<String>,
}
