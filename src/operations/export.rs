use crate::models::transaction::Transaction;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const CSV_HEADER: &str = "Date,Type,Category,Amount,Payment Mode,Description";

/// One header row plus one row per transaction, in ledger order.
/// The description is always quoted so commas inside it survive. Category and
/// payment mode are quoted only when they need it.
pub fn export_csv(transactions: &[Transaction]) -> String {
    let mut lines = Vec::with_capacity(transactions.len() + 1);
    lines.push(CSV_HEADER.to_string());
    for transaction in transactions {
        lines.push(format!(
            "{},{},{},{},{},{}",
            transaction.date.format("%Y-%m-%d"),
            transaction.transaction_type,
            csv_field(&transaction.category),
            transaction.amount.normalize(),
            csv_field(&transaction.payment_mode),
            quoted(&transaction.description),
        ));
    }
    lines.join("\n")
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        quoted(value)
    } else {
        value.to_string()
    }
}

fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

pub fn export_filename(today: NaiveDate) -> String {
    format!("cashbook-export-{}.csv", today.format("%Y-%m-%d"))
}

/// Writes the export into `dir` and returns the created file's path.
pub fn export_to_dir(
    transactions: &[Transaction],
    dir: &Path,
    today: NaiveDate,
) -> Result<PathBuf, String> {
    if transactions.is_empty() {
        return Err("No transactions to export".to_string());
    }

    let path = dir.join(export_filename(today));
    fs::write(&path, export_csv(transactions))
        .map_err(|e| format!("Failed to write file '{}': {}", path.display(), e))?;

    info!(path = %path.display(), count = transactions.len(), "transactions exported");
    Ok(path)
}
