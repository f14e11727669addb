use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            _ => Err("Invalid transaction type. Use 'income' or 'expense'.".to_string()),
        }
    }
}

/// One recorded income or expense event, as persisted in the backing store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub category: String,
    pub payment_mode: String,
    #[serde(default)]
    pub description: String,
    pub date: NaiveDate,
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    pub fn new(id: String, fields: TransactionFields, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            amount: fields.amount,
            transaction_type: fields.transaction_type,
            category: fields.category,
            payment_mode: fields.payment_mode,
            description: fields.description,
            date: fields.date,
            timestamp,
        }
    }

    /// Replaces every field except `id` with the given values.
    pub fn replace_fields(&mut self, fields: TransactionFields, timestamp: DateTime<Utc>) {
        self.amount = fields.amount;
        self.transaction_type = fields.transaction_type;
        self.category = fields.category;
        self.payment_mode = fields.payment_mode;
        self.description = fields.description;
        self.date = fields.date;
        self.timestamp = timestamp;
    }

    /// Contribution to the running balance: positive for income, negative for expense.
    pub fn signed_amount(&self) -> Decimal {
        match self.transaction_type {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }
}

/// Raw field values as entered by the user, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionInput {
    pub amount: String,
    pub transaction_type: String,
    pub category: String,
    pub payment_mode: String,
    pub description: String,
    pub date: String,
}

impl TransactionInput {
    /// Rebuilds the raw input for an existing record, e.g. as the base of an edit.
    pub fn from_transaction(transaction: &Transaction) -> Self {
        Self {
            amount: transaction.amount.to_string(),
            transaction_type: transaction.transaction_type.to_string(),
            category: transaction.category.clone(),
            payment_mode: transaction.payment_mode.clone(),
            description: transaction.description.clone(),
            date: transaction.date.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Validated, typed payload for a create or a full-replacement update.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionFields {
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    pub category: String,
    pub payment_mode: String,
    pub description: String,
    pub date: NaiveDate,
}
