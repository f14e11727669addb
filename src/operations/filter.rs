use crate::models::transaction::{Transaction, TransactionType};

/// Optional constraints; every one that is set must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub category: Option<String>,
    pub transaction_type: Option<TransactionType>,
}

impl FilterCriteria {
    pub fn matches(&self, transaction: &Transaction) -> bool {
        if let Some(ref category) = self.category {
            if !category.is_empty() && transaction.category != *category {
                return false;
            }
        }
        if let Some(transaction_type) = self.transaction_type {
            if transaction.transaction_type != transaction_type {
                return false;
            }
        }
        true
    }
}

pub fn filter_transactions<'a>(
    transactions: &'a [Transaction],
    criteria: &FilterCriteria,
) -> Vec<&'a Transaction> {
    transactions
        .iter()
        .filter(|transaction| criteria.matches(transaction))
        .collect()
}

/// Newest date first. Equal dates keep their input order.
pub fn sort_by_date_desc(mut transactions: Vec<&Transaction>) -> Vec<&Transaction> {
    transactions.sort_by(|a, b| b.date.cmp(&a.date));
    transactions
}
