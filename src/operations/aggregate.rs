use crate::models::transaction::{Transaction, TransactionType};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    pub income: Decimal,
    pub expense: Decimal,
    pub net: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthSummary {
    /// Calendar month as `YYYY-MM`.
    pub month: String,
    pub income: Decimal,
    pub expense: Decimal,
}

impl MonthSummary {
    pub fn balance(&self) -> Decimal {
        self.income - self.expense
    }
}

pub fn balance(transactions: &[Transaction]) -> Decimal {
    transactions
        .iter()
        .fold(Decimal::ZERO, |acc, t| acc + t.signed_amount())
}

pub fn totals(transactions: &[Transaction]) -> Totals {
    let (income, expense) = transactions.iter().fold(
        (Decimal::ZERO, Decimal::ZERO),
        |(income, expense), t| match t.transaction_type {
            TransactionType::Income => (income + t.amount, expense),
            TransactionType::Expense => (income, expense + t.amount),
        },
    );
    Totals {
        income,
        expense,
        net: income - expense,
    }
}

/// Income and expense per calendar month of `date`, most recent month first.
/// Months without transactions are not listed.
pub fn monthly_summary(transactions: &[Transaction]) -> Vec<MonthSummary> {
    let mut months: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();
    for t in transactions {
        let key = t.date.format("%Y-%m").to_string();
        let entry = months.entry(key).or_insert((Decimal::ZERO, Decimal::ZERO));
        match t.transaction_type {
            TransactionType::Income => entry.0 += t.amount,
            TransactionType::Expense => entry.1 += t.amount,
        }
    }

    months
        .into_iter()
        .rev()
        .map(|(month, (income, expense))| MonthSummary {
            month,
            income,
            expense,
        })
        .collect()
}
