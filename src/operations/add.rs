use crate::error::LedgerError;
use crate::models::category::is_known_category;
use crate::models::transaction::{TransactionFields, TransactionInput, TransactionType};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::warn;

/// Largest accepted amount. Keeps every sum over the ledger inside `Decimal` range.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// Checks user-entered values and converts them into typed transaction fields.
pub fn validate_input(input: &TransactionInput) -> Result<TransactionFields, LedgerError> {
    let amount_str = input.amount.trim();
    if amount_str.is_empty() {
        return Err(LedgerError::validation("Amount is required."));
    }
    let amount = match Decimal::from_str(amount_str) {
        Ok(parsed_amount) => parsed_amount,
        Err(_) => {
            return Err(LedgerError::validation(format!(
                "Invalid amount format {}. Please provide a valid decimal number.",
                amount_str
            )));
        }
    };
    check_amount(amount)?;

    if input.transaction_type.trim().is_empty() {
        return Err(LedgerError::validation("Transaction type is required."));
    }
    let transaction_type =
        TransactionType::from_str(&input.transaction_type).map_err(LedgerError::Validation)?;

    let category = input.category.trim().to_string();
    if category.is_empty() {
        return Err(LedgerError::validation("Category is required."));
    }
    if !is_known_category(transaction_type, &category) {
        warn!(%category, %transaction_type, "category is not in the vocabulary for this type");
    }

    let date_str = input.date.trim();
    if date_str.is_empty() {
        return Err(LedgerError::validation("Date is required."));
    }
    let date = match NaiveDate::parse_from_str(date_str, "%Y-%m-%d") {
        Ok(parsed_date) => parsed_date,
        Err(_) => {
            return Err(LedgerError::validation(
                "Invalid date format. Please use YYYY-MM-DD.",
            ));
        }
    };

    Ok(TransactionFields {
        amount,
        transaction_type,
        category,
        payment_mode: input.payment_mode.trim().to_string(),
        description: input.description.trim().to_string(),
        date,
    })
}

/// Range check shared by user input and records read back from storage.
pub fn check_amount(amount: Decimal) -> Result<(), LedgerError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(LedgerError::validation("Amount cannot be negative."));
    }
    if amount > MAX_AMOUNT {
        return Err(LedgerError::validation(format!(
            "Amount cannot exceed {}.",
            MAX_AMOUNT
        )));
    }
    Ok(())
}
