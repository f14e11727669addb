//! The authoritative transaction list and its single writer to the backing store.
//!
//! Every mutation validates first, then changes the in-memory list, then persists
//! the whole list in one write. A failed write rolls the in-memory change back so
//! the list always matches the last blob that was actually stored.

use crate::db::store::KeyValueStore;
use crate::error::{LedgerError, StorageError};
use crate::models::transaction::{Transaction, TransactionInput};
use crate::operations::add::{check_amount, validate_input};
use chrono::Utc;
use tracing::{debug, info, warn};

pub const STORAGE_KEY: &str = "cashbook_transactions";

/// Explicit answer from the user to a destructive prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

impl Confirmation {
    pub fn from_answer(answer: &str) -> Self {
        match answer.trim().to_lowercase().as_str() {
            "y" | "yes" => Confirmation::Confirmed,
            _ => Confirmation::Declined,
        }
    }
}

pub struct Ledger<S: KeyValueStore> {
    store: S,
    transactions: Vec<Transaction>,
    last_issued_id: u64,
}

impl<S: KeyValueStore> Ledger<S> {
    /// Reads the persisted list. Missing or unreadable data yields an empty ledger.
    /// A record that cannot be read is skipped and the rest are kept.
    pub fn load(store: S) -> Self {
        let transactions = read_transactions(&store);
        let last_issued_id = transactions
            .iter()
            .filter_map(|t| t.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        info!(count = transactions.len(), "ledger loaded");
        Self {
            store,
            transactions,
            last_issued_id,
        }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn get(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    pub fn add(&mut self, input: &TransactionInput) -> Result<Transaction, LedgerError> {
        let fields = validate_input(input)?;
        let id = self.next_id();
        let transaction = Transaction::new(id, fields, Utc::now());

        self.transactions.push(transaction.clone());
        if let Err(e) = self.persist() {
            self.transactions.pop();
            return Err(LedgerError::StorageWrite(e));
        }

        info!(id = %transaction.id, "transaction added");
        Ok(transaction)
    }

    pub fn update(&mut self, id: &str, input: &TransactionInput) -> Result<Transaction, LedgerError> {
        let pos = self
            .position(id)
            .ok_or_else(|| LedgerError::NotFound(id.to_string()))?;
        let fields = validate_input(input)?;

        let previous = self.transactions[pos].clone();
        self.transactions[pos].replace_fields(fields, Utc::now());
        if let Err(e) = self.persist() {
            self.transactions[pos] = previous;
            return Err(LedgerError::StorageWrite(e));
        }

        info!(id, "transaction updated");
        Ok(self.transactions[pos].clone())
    }

    /// Deletes the transaction with `id`. Returns `false` without touching anything
    /// when the user declined.
    pub fn remove(&mut self, id: &str, confirmation: Confirmation) -> Result<bool, LedgerError> {
        if confirmation == Confirmation::Declined {
            debug!(id, "remove declined");
            return Ok(false);
        }
        let pos = self
            .position(id)
            .ok_or_else(|| LedgerError::NotFound(id.to_string()))?;

        let removed = self.transactions.remove(pos);
        if let Err(e) = self.persist() {
            self.transactions.insert(pos, removed);
            return Err(LedgerError::StorageWrite(e));
        }

        info!(id, "transaction removed");
        Ok(true)
    }

    pub fn clear(&mut self, confirmation: Confirmation) -> Result<bool, LedgerError> {
        if confirmation == Confirmation::Declined {
            debug!("clear declined");
            return Ok(false);
        }

        let previous = std::mem::take(&mut self.transactions);
        if let Err(e) = self.persist() {
            self.transactions = previous;
            return Err(LedgerError::StorageWrite(e));
        }

        info!(count = previous.len(), "ledger cleared");
        Ok(true)
    }

    /// Writes the full current list to the backing store, replacing what was there.
    pub fn persist(&mut self) -> Result<(), StorageError> {
        let blob = serde_json::to_string(&self.transactions)?;
        self.store.set(STORAGE_KEY, &blob)?;
        debug!(count = self.transactions.len(), bytes = blob.len(), "ledger persisted");
        Ok(())
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.transactions.iter().position(|t| t.id == id)
    }

    /// Millisecond wall-clock id, bumped past the last issued id so ids keep
    /// increasing even within the same millisecond.
    fn next_id(&mut self) -> String {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        let start = now.max(self.last_issued_id.saturating_add(1));
        // Past u64::MAX, fall back to the first free id from the clock.
        let candidate = (start..=u64::MAX)
            .chain(now..start)
            .find(|candidate| self.get(&candidate.to_string()).is_none())
            .unwrap_or(now);
        self.last_issued_id = self.last_issued_id.max(candidate);
        candidate.to_string()
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }
}

fn read_transactions<S: KeyValueStore>(store: &S) -> Vec<Transaction> {
    let blob = match store.get(STORAGE_KEY) {
        Ok(Some(blob)) => blob,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!(error = %e, "failed to read stored transactions, starting empty");
            return Vec::new();
        }
    };

    let records: Vec<serde_json::Value> = match serde_json::from_str(&blob) {
        Ok(records) => records,
        Err(e) => {
            warn!(error = %e, "stored transactions are malformed, starting empty");
            return Vec::new();
        }
    };

    let total = records.len();
    let transactions: Vec<Transaction> = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match read_record(record) {
            Ok(transaction) => Some(transaction),
            Err(reason) => {
                warn!(index, %reason, "skipping unreadable stored transaction");
                None
            }
        })
        .collect();
    if transactions.len() < total {
        warn!(skipped = total - transactions.len(), "some stored transactions were dropped");
    }
    transactions
}

fn read_record(record: serde_json::Value) -> Result<Transaction, String> {
    let transaction: Transaction = serde_json::from_value(record).map_err(|e| e.to_string())?;
    check_amount(transaction.amount).map_err(|e| e.to_string())?;
    Ok(transaction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::establish_test_connection;
    use crate::db::store::test_support::{MemoryStore, ReadOnlyStore};
    use crate::db::store::SqliteStore;
    use crate::models::transaction::TransactionType;
    use rust_decimal::Decimal;

    fn input(amount: &str, transaction_type: &str, category: &str, date: &str) -> TransactionInput {
        TransactionInput {
            amount: amount.to_string(),
            transaction_type: transaction_type.to_string(),
            category: category.to_string(),
            payment_mode: "Cash".to_string(),
            description: String::new(),
            date: date.to_string(),
        }
    }

    fn stored_blob(ledger: &Ledger<MemoryStore>) -> Option<String> {
        ledger.store().values.get(STORAGE_KEY).cloned()
    }

    #[test]
    fn test_load_missing_key_is_empty() {
        let ledger = Ledger::load(MemoryStore::default());
        assert!(ledger.transactions().is_empty());
    }

    #[test]
    fn test_load_malformed_blob_is_empty() {
        let mut store = MemoryStore::default();
        store.values.insert(STORAGE_KEY.to_string(), "{not json".to_string());
        assert!(Ledger::load(store).transactions().is_empty());

        let mut store = MemoryStore::default();
        store.values.insert(STORAGE_KEY.to_string(), r#"{"id":"1"}"#.to_string());
        assert!(Ledger::load(store).transactions().is_empty());
    }

    #[test]
    fn test_load_skips_unreadable_records_and_keeps_the_rest() {
        let mut store = MemoryStore::default();
        store.values.insert(
            STORAGE_KEY.to_string(),
            concat!(
                r#"[{"id":"1","amount":500,"type":"income","category":"Salary","paymentMode":"","description":"","date":"2024-01-05","timestamp":"2024-01-05T10:00:00Z"},"#,
                r#"{"id":"2","amount":null,"type":"expense","category":"Food","paymentMode":"","description":"","date":"","timestamp":"2024-01-05T10:00:00Z"},"#,
                r#"{"id":"3","amount":79228162514264337593543950335,"type":"income","category":"Gift","paymentMode":"","description":"","date":"2024-01-06","timestamp":"2024-01-06T10:00:00Z"},"#,
                r#"{"id":"4","amount":20,"type":"expense","category":"Food","paymentMode":"Cash","date":"2024-01-07","timestamp":"2024-01-07T10:00:00Z"}]"#,
            )
            .to_string(),
        );

        let mut ledger = Ledger::load(store);
        let ids: Vec<&str> = ledger.transactions().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "4"]);

        ledger.add(&input("10", "expense", "Food", "2024-01-08")).unwrap();
        let reloaded = Ledger::load(MemoryStore {
            values: ledger.store().values.clone(),
            writes: 0,
        });
        assert_eq!(reloaded.transactions().len(), 3);
        assert_eq!(reloaded.get("1").map(|t| t.amount), Some(Decimal::new(500, 0)));
    }

    #[test]
    fn test_add_rejects_amount_that_would_overflow_totals() {
        let mut ledger = Ledger::load(MemoryStore::default());
        ledger.add(&input("1", "income", "Gift", "2024-01-05")).unwrap();

        let result = ledger.add(&input("79228162514264337593543950335", "income", "Gift", "2024-01-05"));
        assert!(matches!(result, Err(LedgerError::Validation(_))));
        assert_eq!(ledger.transactions().len(), 1);
        assert_eq!(ledger.store().writes, 1);
    }

    #[test]
    fn test_add_assigns_id_and_persists() {
        let mut ledger = Ledger::load(MemoryStore::default());
        let created = ledger.add(&input("1000", "income", "Salary", "2024-01-05")).unwrap();

        assert!(!created.id.is_empty());
        assert!(created.id.parse::<u64>().is_ok());
        assert_eq!(ledger.transactions(), &[created.clone()]);
        assert_eq!(ledger.store().writes, 1);

        let reloaded = Ledger::load(MemoryStore {
            values: ledger.store().values.clone(),
            writes: 0,
        });
        assert_eq!(reloaded.transactions(), &[created]);
    }

    #[test]
    fn test_add_ids_are_unique_and_increasing() {
        let mut ledger = Ledger::load(MemoryStore::default());
        let ids: Vec<u64> = (0..20)
            .map(|_| {
                ledger
                    .add(&input("1", "expense", "Food", "2024-01-05"))
                    .unwrap()
                    .id
                    .parse()
                    .unwrap()
            })
            .collect();
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_add_invalid_amount_leaves_store_unchanged() {
        let mut ledger = Ledger::load(MemoryStore::default());
        let result = ledger.add(&input("abc", "expense", "Food", "2024-01-05"));

        assert!(matches!(result, Err(LedgerError::Validation(_))));
        assert!(ledger.transactions().is_empty());
        assert_eq!(ledger.store().writes, 0);
        assert_eq!(stored_blob(&ledger), None);
    }

    #[test]
    fn test_update_preserves_id_and_replaces_fields() {
        let mut ledger = Ledger::load(MemoryStore::default());
        let created = ledger.add(&input("1000", "income", "Salary", "2024-01-05")).unwrap();
        ledger.add(&input("50", "expense", "Food", "2024-01-06")).unwrap();

        let mut replacement = input("300", "expense", "Rent", "2024-02-01");
        replacement.payment_mode = "Card".to_string();
        replacement.description = "February rent".to_string();
        let updated = ledger.update(&created.id, &replacement).unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.amount, Decimal::new(300, 0));
        assert_eq!(updated.transaction_type, TransactionType::Expense);
        assert_eq!(updated.category, "Rent");
        assert_eq!(updated.payment_mode, "Card");
        assert_eq!(updated.description, "February rent");
        assert_eq!(updated.date.to_string(), "2024-02-01");
        assert_eq!(ledger.transactions().len(), 2);
        assert_eq!(ledger.get(&created.id), Some(&updated));
    }

    #[test]
    fn test_update_unknown_id() {
        let mut ledger = Ledger::load(MemoryStore::default());
        ledger.add(&input("10", "expense", "Food", "2024-01-05")).unwrap();
        let before = ledger.transactions().to_vec();

        let result = ledger.update("missing", &input("20", "expense", "Food", "2024-01-05"));
        assert!(matches!(result, Err(LedgerError::NotFound(ref id)) if id == "missing"));
        assert_eq!(ledger.transactions(), before.as_slice());
        assert_eq!(ledger.store().writes, 1);
    }

    #[test]
    fn test_update_invalid_input_leaves_record_unchanged() {
        let mut ledger = Ledger::load(MemoryStore::default());
        let created = ledger.add(&input("10", "expense", "Food", "2024-01-05")).unwrap();

        let result = ledger.update(&created.id, &input("ten", "expense", "Food", "2024-01-05"));
        assert!(matches!(result, Err(LedgerError::Validation(_))));
        assert_eq!(ledger.get(&created.id), Some(&created));
    }

    #[test]
    fn test_remove_after_add_restores_contents() {
        let mut ledger = Ledger::load(MemoryStore::default());
        ledger.add(&input("10", "expense", "Food", "2024-01-05")).unwrap();
        let before = ledger.transactions().to_vec();
        let blob_before = stored_blob(&ledger);

        let created = ledger.add(&input("99", "income", "Gift", "2024-01-07")).unwrap();
        assert!(ledger.remove(&created.id, Confirmation::Confirmed).unwrap());

        assert_eq!(ledger.transactions(), before.as_slice());
        assert_eq!(stored_blob(&ledger), blob_before);
    }

    #[test]
    fn test_remove_declined_does_nothing() {
        let mut ledger = Ledger::load(MemoryStore::default());
        let created = ledger.add(&input("10", "expense", "Food", "2024-01-05")).unwrap();

        assert!(!ledger.remove(&created.id, Confirmation::Declined).unwrap());
        assert_eq!(ledger.transactions().len(), 1);
        assert_eq!(ledger.store().writes, 1);
    }

    #[test]
    fn test_remove_unknown_id() {
        let mut ledger = Ledger::load(MemoryStore::default());
        let result = ledger.remove("42", Confirmation::Confirmed);
        assert!(matches!(result, Err(LedgerError::NotFound(_))));
        assert_eq!(ledger.store().writes, 0);
    }

    #[test]
    fn test_clear_persists_empty_list() {
        let mut ledger = Ledger::load(MemoryStore::default());
        ledger.add(&input("10", "expense", "Food", "2024-01-05")).unwrap();
        ledger.add(&input("20", "income", "Gift", "2024-01-06")).unwrap();

        assert!(!ledger.clear(Confirmation::Declined).unwrap());
        assert_eq!(ledger.transactions().len(), 2);

        assert!(ledger.clear(Confirmation::Confirmed).unwrap());
        assert!(ledger.transactions().is_empty());
        assert_eq!(stored_blob(&ledger).as_deref(), Some("[]"));
    }

    #[test]
    fn test_clear_empty_ledger_succeeds() {
        let mut ledger = Ledger::load(MemoryStore::default());
        assert!(ledger.clear(Confirmation::Confirmed).unwrap());
        assert_eq!(stored_blob(&ledger).as_deref(), Some("[]"));
    }

    #[test]
    fn test_persist_is_idempotent() {
        let mut ledger = Ledger::load(MemoryStore::default());
        ledger.add(&input("10.50", "expense", "Food", "2024-01-05")).unwrap();
        ledger.add(&input("1000", "income", "Salary", "2024-01-01")).unwrap();

        ledger.persist().unwrap();
        let first = stored_blob(&ledger);
        ledger.persist().unwrap();
        assert_eq!(stored_blob(&ledger), first);
    }

    #[test]
    fn test_round_trip_through_sqlite() {
        let conn = establish_test_connection().unwrap();
        let mut ledger = Ledger::load(SqliteStore::new(conn));
        let mut with_text = input("1234.56", "expense", "Shopping", "2024-03-07");
        with_text.description = "Shoes, \"sale\" price".to_string();
        ledger.add(&with_text).unwrap();
        ledger.add(&input("0", "income", "Other Income", "2023-12-31")).unwrap();
        let expected = ledger.transactions().to_vec();

        let Ledger { store, .. } = ledger;
        let reloaded = Ledger::load(store);
        assert_eq!(reloaded.transactions(), expected.as_slice());
    }

    #[test]
    fn test_ids_continue_after_reload() {
        let mut store = MemoryStore::default();
        store.values.insert(
            STORAGE_KEY.to_string(),
            r#"[{"id":"99999999999999","amount":5,"type":"expense","category":"Food","paymentMode":"Cash","description":"","date":"2024-01-05","timestamp":"2024-01-05T10:00:00Z"}]"#.to_string(),
        );
        let mut ledger = Ledger::load(store);
        let created = ledger.add(&input("1", "expense", "Food", "2024-01-05")).unwrap();
        assert_eq!(created.id, "100000000000000");
    }

    #[test]
    fn test_ids_after_largest_possible_id() {
        let mut store = MemoryStore::default();
        store.values.insert(
            STORAGE_KEY.to_string(),
            r#"[{"id":"18446744073709551615","amount":5,"type":"expense","category":"Food","paymentMode":"Cash","description":"","date":"2024-01-05","timestamp":"2024-01-05T10:00:00Z"}]"#.to_string(),
        );
        let mut ledger = Ledger::load(store);

        let first = ledger.add(&input("1", "expense", "Food", "2024-01-05")).unwrap();
        let second = ledger.add(&input("2", "expense", "Food", "2024-01-05")).unwrap();
        assert_ne!(first.id, "18446744073709551615");
        assert_ne!(first.id, second.id);
        assert_eq!(ledger.transactions().len(), 3);
    }

    #[test]
    fn test_write_failure_rolls_back() {
        let mut ledger = Ledger::load(ReadOnlyStore::default());

        let result = ledger.add(&input("10", "expense", "Food", "2024-01-05"));
        assert!(matches!(result, Err(LedgerError::StorageWrite(_))));
        assert!(ledger.transactions().is_empty());
        assert!(ledger.clear(Confirmation::Confirmed).is_err());
    }

    #[test]
    fn test_write_failure_on_remove_keeps_record() {
        let mut source = MemoryStore::default();
        {
            let mut ledger = Ledger::load(MemoryStore::default());
            ledger.add(&input("10", "expense", "Food", "2024-01-05")).unwrap();
            source.values = ledger.store().values.clone();
        }
        let mut ledger = Ledger::load(ReadOnlyStore {
            values: source.values,
        });
        let id = ledger.transactions()[0].id.clone();

        let result = ledger.remove(&id, Confirmation::Confirmed);
        assert!(matches!(result, Err(LedgerError::StorageWrite(_))));
        assert_eq!(ledger.transactions().len(), 1);
    }

    #[test]
    fn test_write_failure_on_update_keeps_original() {
        let mut source = MemoryStore::default();
        {
            let mut ledger = Ledger::load(MemoryStore::default());
            ledger.add(&input("10", "expense", "Food", "2024-01-05")).unwrap();
            source.values = ledger.store().values.clone();
        }
        let mut ledger = Ledger::load(ReadOnlyStore {
            values: source.values,
        });
        let original = ledger.transactions()[0].clone();

        let result = ledger.update(&original.id, &input("75", "income", "Gift", "2024-02-01"));
        assert!(matches!(result, Err(LedgerError::StorageWrite(_))));
        assert_eq!(ledger.transactions(), &[original.clone()]);
        assert_eq!(ledger.get(&original.id), Some(&original));
    }

    #[test]
    fn test_confirmation_from_answer() {
        assert_eq!(Confirmation::from_answer("y"), Confirmation::Confirmed);
        assert_eq!(Confirmation::from_answer(" YES "), Confirmation::Confirmed);
        assert_eq!(Confirmation::from_answer(""), Confirmation::Declined);
        assert_eq!(Confirmation::from_answer("no"), Confirmation::Declined);
    }
}
