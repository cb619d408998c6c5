#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Transaction and aggregated spending types.
//!
//! All tables are nested `BTreeMap`s keyed
//! `quarter → category → city`, so their JSON form is key-sorted and stable
//! between runs.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Synthetic quarter covering every transaction.
pub const ALL_TIME: &str = "All Time";

/// Synthetic category covering every transaction.
pub const ALL_CATEGORIES: &str = "All Categories";

/// A single card transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction date.
    pub date: NaiveDate,
    /// City name as it appears in the configured city list.
    pub city: String,
    /// Expense category (e.g. `"Food"`, `"Fuel"`).
    pub category: String,
    /// Transaction amount.
    pub amount: f64,
}

impl Transaction {
    /// The `"YYYY-Qn"` label of the calendar quarter this transaction
    /// falls in.
    #[must_use]
    pub fn year_quarter(&self) -> String {
        year_quarter(self.date)
    }
}

/// Formats the `"YYYY-Qn"` label for `date`.
#[must_use]
pub fn year_quarter(date: NaiveDate) -> String {
    format!("{}-Q{}", date.year(), date.month0() / 3 + 1)
}

/// `quarter → category → city → value`.
pub type SliceTable<T> = BTreeMap<String, BTreeMap<String, BTreeMap<String, T>>>;

/// Summed amounts per slice and city.
pub type SpendingTable = SliceTable<f64>;

/// Share of the city's quarter total, in percent.
pub type PercentageTable = SliceTable<f64>;

/// Color scale window for one slice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleBounds {
    /// Lower end of the gradient.
    pub min: f64,
    /// Upper end of the gradient.
    pub max: f64,
}

/// `quarter → category → scale window`.
pub type ScaleRanges = BTreeMap<String, BTreeMap<String, ScaleBounds>>;

/// `quarter → category → city index → artifact path`.
pub type ArtifactIndex = BTreeMap<String, BTreeMap<String, BTreeMap<usize, String>>>;
