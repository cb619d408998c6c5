//! Transaction CSV loading.
//!
//! Expects a header row with at least `Date`, `City`, `Exp Type` and
//! `Amount`. Any other column (`index`, `Card Type`, `Gender`, ...) is
//! ignored. Rows with an unparseable date or amount are skipped and
//! counted rather than failing the load.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use spendmap_spending_models::Transaction;

use crate::SpendingError;
use crate::parsing::{parse_amount, parse_day_first_date};

const REQUIRED_COLUMNS: &[&str] = &["Date", "City", "Exp Type", "Amount"];

#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "City")]
    city: String,
    #[serde(rename = "Exp Type")]
    category: String,
    #[serde(rename = "Amount")]
    amount: String,
}

/// Outcome of a transaction load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedTransactions {
    /// Successfully parsed transactions, in file order.
    pub transactions: Vec<Transaction>,
    /// Number of rows that were skipped as malformed.
    pub skipped: usize,
}

/// Loads transactions from the CSV file at `path`.
///
/// # Errors
///
/// Returns [`SpendingError`] if the file cannot be opened or a required
/// column is missing.
pub fn load_transactions(path: &Path) -> Result<LoadedTransactions, SpendingError> {
    let file = std::fs::File::open(path)?;
    let loaded = read_transactions(file)?;
    log::info!(
        "Loaded {} transactions from {} ({} rows skipped)",
        loaded.transactions.len(),
        path.display(),
        loaded.skipped
    );
    Ok(loaded)
}

/// Reads transactions from any CSV source.
///
/// # Errors
///
/// Returns [`SpendingError`] if the header row cannot be read or a
/// required column is missing.
pub fn read_transactions<R: Read>(reader: R) -> Result<LoadedTransactions, SpendingError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == *column) {
            return Err(SpendingError::MissingColumn {
                column: (*column).to_string(),
            });
        }
    }

    let mut loaded = LoadedTransactions::default();

    for (line, result) in rdr.deserialize::<RawRow>().enumerate() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                log::warn!("Skipping malformed CSV row {}: {e}", line + 1);
                loaded.skipped += 1;
                continue;
            }
        };

        let (Some(date), Some(amount)) =
            (parse_day_first_date(&row.date), parse_amount(&row.amount))
        else {
            log::warn!(
                "Skipping CSV row {}: bad date {:?} or amount {:?}",
                line + 1,
                row.date,
                row.amount
            );
            loaded.skipped += 1;
            continue;
        };

        loaded.transactions.push(Transaction {
            date,
            city: row.city,
            category: row.category,
            amount,
        });
    }

    Ok(loaded)
}
