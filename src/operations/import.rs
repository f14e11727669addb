use crate::db::store::KeyValueStore;
use crate::ledger::Ledger;
use crate::models::transaction::TransactionInput;
use std::fs::File;
use std::path::Path;
use tracing::info;

const EXPECTED_COLUMNS: usize = 6;

/// Adds every row of a file in the export layout. Stops at the first bad row;
/// rows before it stay added.
pub fn import_csv<S: KeyValueStore>(ledger: &mut Ledger<S>, path: &Path) -> Result<usize, String> {
    let file = File::open(path)
        .map_err(|e| format!("Failed to open file '{}': {}", path.display(), e))?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .has_headers(true)
        .from_reader(file);

    let mut count = 0;
    for (record_index, result) in reader.records().enumerate() {
        // header is line 1
        let line = record_index + 2;
        let record = result.map_err(|e| format!("CSV parse error on line {}: {}", line, e))?;

        if record.len() != EXPECTED_COLUMNS {
            return Err(format!(
                "Invalid number of columns on line {}: expected {}, got {}",
                line,
                EXPECTED_COLUMNS,
                record.len()
            ));
        }

        let field = |i: usize| record.get(i).unwrap_or("").to_string();
        let input = TransactionInput {
            date: field(0),
            transaction_type: field(1),
            category: field(2),
            amount: field(3),
            payment_mode: field(4),
            description: field(5),
        };

        ledger
            .add(&input)
            .map_err(|e| format!("Line {}: {}", line, e))?;
        count += 1;
    }

    info!(path = %path.display(), count, "transactions imported");
    Ok(count)
}
