mod cli;
mod db;
mod error;
mod ledger;
mod models;
mod operations;

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use cli::{AddArgs, Cli, Command, EditArgs};
use db::connection::establish_connection;
use db::store::{KeyValueStore, SqliteStore};
use error::LedgerError;
use ledger::{Confirmation, Ledger};
use models::category::{all_categories, categories_for};
use models::transaction::TransactionInput;
use operations::aggregate::{balance, monthly_summary, totals};
use operations::filter::{filter_transactions, sort_by_date_desc, FilterCriteria};
use operations::format::format_currency;
use operations::render::{write_monthly_summary, write_totals, write_transactions};
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let conn = establish_connection(&cli.db)
        .with_context(|| format!("Failed to open database '{}'", cli.db.display()))?;
    let mut ledger = Ledger::load(SqliteStore::new(conn));

    match cli.command {
        Command::Add(args) => {
            let created = ledger.add(&add_input(args))?;
            println!("Transaction added successfully! (id {})", created.id);
        }
        Command::Edit(args) => {
            let input = edit_input(&ledger, args.id.as_str(), &args)?;
            let updated = ledger.update(&args.id, &input)?;
            println!("Transaction {} updated successfully!", updated.id);
        }
        Command::Remove { id, yes } => {
            let confirmation = confirm_or_prompt(
                yes,
                "Are you sure you want to delete this transaction? This action cannot be undone.",
            );
            if ledger.remove(&id, confirmation)? {
                println!("Transaction deleted successfully!");
            } else {
                println!("Nothing deleted.");
            }
        }
        Command::Clear { yes } => {
            let confirmation = confirm_or_prompt(
                yes,
                "Are you sure you want to delete all transactions? This action cannot be undone.",
            );
            if ledger.clear(confirmation)? {
                println!("All data cleared successfully!");
            } else {
                println!("Nothing deleted.");
            }
        }
        Command::List {
            category,
            transaction_type,
        } => {
            let criteria = FilterCriteria {
                category,
                transaction_type,
            };
            let visible = sort_by_date_desc(filter_transactions(ledger.transactions(), &criteria));
            write_transactions(&mut io::stdout().lock(), &visible)?;
        }
        Command::Balance => {
            println!("Balance: {}", format_currency(balance(ledger.transactions())));
        }
        Command::Report => {
            let mut out = io::stdout().lock();
            write_totals(&mut out, &totals(ledger.transactions()))?;
            writeln!(out)?;
            write_monthly_summary(&mut out, &monthly_summary(ledger.transactions()))?;
        }
        Command::Export { out } => {
            let today = Local::now().date_naive();
            let path = operations::export::export_to_dir(ledger.transactions(), &out, today)
                .map_err(anyhow::Error::msg)?;
            println!("Data exported successfully to {}", path.display());
        }
        Command::Import { file } => {
            let count =
                operations::import::import_csv(&mut ledger, &file).map_err(anyhow::Error::msg)?;
            println!("Successfully imported {} transactions.", count);
        }
        Command::Categories { transaction_type } => {
            let names = match transaction_type {
                Some(t) => categories_for(t).to_vec(),
                None => all_categories(),
            };
            for name in names {
                println!("{}", name);
            }
        }
        Command::Browse => {
            operations::browse::run_browse(&mut ledger).map_err(anyhow::Error::msg)?;
        }
    }

    Ok(())
}

fn add_input(args: AddArgs) -> TransactionInput {
    TransactionInput {
        amount: args.amount,
        transaction_type: args.transaction_type,
        category: args.category,
        payment_mode: args.payment_mode,
        description: args.description,
        date: args
            .date
            .unwrap_or_else(|| Local::now().date_naive().format("%Y-%m-%d").to_string()),
    }
}

/// Starts from the stored record and overlays whatever the user passed.
fn edit_input<S: KeyValueStore>(
    ledger: &Ledger<S>,
    id: &str,
    args: &EditArgs,
) -> Result<TransactionInput, LedgerError> {
    let existing = ledger
        .get(id)
        .ok_or_else(|| LedgerError::NotFound(id.to_string()))?;
    let mut input = TransactionInput::from_transaction(existing);

    let overrides = [
        (&args.amount, &mut input.amount),
        (&args.transaction_type, &mut input.transaction_type),
        (&args.category, &mut input.category),
        (&args.payment_mode, &mut input.payment_mode),
        (&args.description, &mut input.description),
        (&args.date, &mut input.date),
    ];
    for (value, field) in overrides {
        if let Some(value) = value {
            *field = value.clone();
        }
    }
    Ok(input)
}

fn confirm_or_prompt(yes: bool, question: &str) -> Confirmation {
    if yes {
        return Confirmation::Confirmed;
    }
    print!("{} [y/N] ", question);
    if io::stdout().flush().is_err() {
        return Confirmation::Declined;
    }
    match read_user_input() {
        Ok(answer) => Confirmation::from_answer(&answer),
        Err(_) => Confirmation::Declined,
    }
}

fn read_user_input() -> Result<String, String> {
    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .map_err(|_| "Failed to read line".to_string())?;
    Ok(input.trim().to_string())
}
