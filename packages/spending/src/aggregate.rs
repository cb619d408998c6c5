//! Spending aggregation by quarter, category, and city.
//!
//! Every requested quarter gets an entry for [`ALL_CATEGORIES`] plus every
//! category observed in the data, and every slice gets an entry for every
//! configured city (zero when the city has no matching rows).
//!
//! A city whose quarter total is zero has no meaningful share; its
//! real-category percentages are reported as `0.0` instead of `NaN`.
//! [`ALL_CATEGORIES`] is always exactly `100.0`.

use std::collections::{BTreeMap, BTreeSet};

use spendmap_spending_models::{
    ALL_CATEGORIES, ALL_TIME, PercentageTable, SpendingTable, Transaction,
};

/// Sorted category list with [`ALL_CATEGORIES`] first.
#[must_use]
pub fn categories(transactions: &[Transaction]) -> Vec<String> {
    let distinct: BTreeSet<&str> = transactions.iter().map(|t| t.category.as_str()).collect();
    std::iter::once(ALL_CATEGORIES.to_string())
        .chain(distinct.into_iter().map(String::from))
        .collect()
}

/// Sorted `"YYYY-Qn"` list with [`ALL_TIME`] first.
#[must_use]
pub fn quarters(transactions: &[Transaction]) -> Vec<String> {
    let distinct: BTreeSet<String> = transactions.iter().map(Transaction::year_quarter).collect();
    std::iter::once(ALL_TIME.to_string())
        .chain(distinct)
        .collect()
}

/// `amount` as a percentage of `total`, or `0.0` when `total` is zero.
#[must_use]
pub fn percentage_of(amount: f64, total: f64) -> f64 {
    if total == 0.0 {
        0.0
    } else {
        amount / total * 100.0
    }
}

/// Computes the spending and percentage tables.
///
/// Transactions for cities outside `city_names` are ignored. A quarter in
/// `quarters` with no matching rows produces all-zero spending.
#[must_use]
pub fn aggregate(
    transactions: &[Transaction],
    city_names: &[String],
    quarters: &[String],
) -> (SpendingTable, PercentageTable) {
    log::info!("Calculating spending data for all quarters and categories");

    let category_list = categories(transactions);
    let real_categories = &category_list[1..];
    let wanted_cities: BTreeSet<&str> = city_names.iter().map(String::as_str).collect();

    // (quarter, category, city) -> sum, with "All Time" folded in.
    let mut sums: BTreeMap<(String, &str, &str), f64> = BTreeMap::new();
    for t in transactions {
        if !wanted_cities.contains(t.city.as_str()) {
            continue;
        }
        for quarter in [ALL_TIME.to_string(), t.year_quarter()] {
            *sums
                .entry((quarter, t.category.as_str(), t.city.as_str()))
                .or_insert(0.0) += t.amount;
        }
    }

    let mut spending = SpendingTable::new();
    let mut percentages = PercentageTable::new();

    for quarter in quarters {
        let quarter_spending = spending.entry(quarter.clone()).or_default();
        let quarter_percentages = percentages.entry(quarter.clone()).or_default();

        let amount_for = |category: &str, city: &str| {
            sums.get(&(quarter.clone(), category, city))
                .copied()
                .unwrap_or(0.0)
        };

        let totals: BTreeMap<&str, f64> = city_names
            .iter()
            .map(|city| {
                let total = real_categories
                    .iter()
                    .map(|category| amount_for(category, city))
                    .sum();
                (city.as_str(), total)
            })
            .collect();

        let all_spending = quarter_spending
            .entry(ALL_CATEGORIES.to_string())
            .or_default();
        let all_percentages = quarter_percentages
            .entry(ALL_CATEGORIES.to_string())
            .or_default();
        for city in city_names {
            all_spending.insert(city.clone(), totals[city.as_str()]);
            all_percentages.insert(city.clone(), 100.0);
        }

        for category in real_categories {
            let cat_spending = quarter_spending.entry(category.clone()).or_default();
            let cat_percentages = quarter_percentages.entry(category.clone()).or_default();
            for city in city_names {
                let amount = amount_for(category, city);
                cat_spending.insert(city.clone(), amount);
                cat_percentages.insert(
                    city.clone(),
                    percentage_of(amount, totals[city.as_str()]),
                );
            }
        }
    }

    (spending, percentages)
}
