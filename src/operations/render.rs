//! Plain-text views over a transaction list. Nothing here touches the ledger;
//! callers hand in whatever slice they want shown.

use crate::models::transaction::{Transaction, TransactionType};
use crate::operations::aggregate::{MonthSummary, Totals};
use crate::operations::format::{format_currency, format_month, format_naive_date};
use std::io::{self, Write};

/// Display cells for one transaction: date, signed amount, category, payment
/// mode, description, id.
pub fn transaction_cells(transaction: &Transaction) -> [String; 6] {
    let sign = match transaction.transaction_type {
        TransactionType::Income => "+",
        TransactionType::Expense => "-",
    };
    [
        format_naive_date(transaction.date),
        format!("{}{}", sign, format_currency(transaction.amount)),
        transaction.category.clone(),
        transaction.payment_mode.clone(),
        transaction.description.clone(),
        transaction.id.clone(),
    ]
}

pub fn write_transactions<W: Write>(out: &mut W, transactions: &[&Transaction]) -> io::Result<()> {
    if transactions.is_empty() {
        writeln!(out, "No transactions found matching your filters.")?;
        return Ok(());
    }

    writeln!(
        out,
        "{:<10}  {:>14}  {:<14}  {:<14}  {:<30}  {}",
        "Date", "Amount", "Category", "Payment", "Description", "Id"
    )?;
    for transaction in transactions {
        let [date, amount, category, payment, description, id] = transaction_cells(transaction);
        writeln!(
            out,
            "{:<10}  {:>14}  {:<14}  {:<14}  {:<30}  {}",
            date,
            amount,
            category,
            payment,
            truncate(&description, 30),
            id
        )?;
    }
    Ok(())
}

pub fn write_totals<W: Write>(out: &mut W, totals: &Totals) -> io::Result<()> {
    writeln!(out, "Total income:   {}", format_currency(totals.income))?;
    writeln!(out, "Total expenses: {}", format_currency(totals.expense))?;
    writeln!(out, "Net balance:    {}", format_currency(totals.net))
}

pub fn write_monthly_summary<W: Write>(out: &mut W, months: &[MonthSummary]) -> io::Result<()> {
    if months.is_empty() {
        writeln!(out, "No transactions to summarize.")?;
        return Ok(());
    }

    for month in months {
        writeln!(out, "{}", format_month(&month.month))?;
        writeln!(out, "  Income:  {}", format_currency(month.income))?;
        writeln!(out, "  Expense: {}", format_currency(month.expense))?;
        writeln!(out, "  Balance: {}", format_currency(month.balance()))?;
    }
    Ok(())
}

pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut short: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    short.push_str("...");
    short
}
