#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Transaction loading and spending aggregation.
//!
//! Reads card transactions from CSV ([`load`]) and computes, for every
//! (quarter, category, city) triple, the summed amount and its share of
//! the city's quarter total ([`aggregate`]).

pub mod aggregate;
pub mod load;
pub mod parsing;

use thiserror::Error;

pub use spendmap_spending_models::*;

/// Errors that can occur while loading transactions.
#[derive(Debug, Error)]
pub enum SpendingError {
    /// CSV reading failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A required column is absent from the header row.
    #[error("Missing required column: {column}")]
    MissingColumn {
        /// Name of the missing column.
        column: String,
    },
}
