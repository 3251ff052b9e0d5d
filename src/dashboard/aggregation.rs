//! Transaction data aggregation for the dashboard summary.
//!
//! Provides functions to total transaction amounts, pick out the most recent
//! transactions and sum amounts per category.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::transaction::{Transaction, TransactionKind};

/// The number of recent transactions of each kind shown on the dashboard.
pub(super) const RECENT_TRANSACTION_COUNT: usize = 5;

/// Totals and counts over all of a user's transactions.
#[derive(Debug, PartialEq, Serialize)]
pub(super) struct Summary {
    pub total_income: f64,
    pub total_expense: f64,
    /// `total_income - total_expense`
    pub balance: f64,
    pub income_count: usize,
    pub expense_count: usize,
}

/// A transaction tagged with whether it is an income or an expense.
#[derive(Debug, PartialEq, Serialize)]
pub(super) struct RecentTransaction<'a> {
    #[serde(flatten)]
    pub transaction: &'a Transaction,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

/// Sums the amounts of `transactions`.
pub(super) fn total(transactions: &[Transaction]) -> f64 {
    transactions
        .iter()
        .map(|transaction| transaction.amount)
        .sum()
}

/// Calculates the totals, balance and counts for a user's incomes and expenses.
pub(super) fn summarise(incomes: &[Transaction], expenses: &[Transaction]) -> Summary {
    let total_income = total(incomes);
    let total_expense = total(expenses);

    Summary {
        total_income,
        total_expense,
        balance: total_income - total_expense,
        income_count: incomes.len(),
        expense_count: expenses.len(),
    }
}

/// Takes the first [RECENT_TRANSACTION_COUNT] transactions and marks them
/// with `kind`.
///
/// Expects `transactions` to already be sorted newest first.
pub(super) fn most_recent(
    transactions: &[Transaction],
    kind: TransactionKind,
) -> Vec<RecentTransaction<'_>> {
    transactions
        .iter()
        .take(RECENT_TRANSACTION_COUNT)
        .map(|transaction| RecentTransaction {
            transaction,
            kind: kind.type_name(),
        })
        .collect()
}

/// Sums transaction amounts per category.
///
/// # Returns
/// Map of category label to the total amount in that category, ordered by label.
pub(super) fn sum_by_category(transactions: &[Transaction]) -> BTreeMap<&str, f64> {
    let mut totals = BTreeMap::new();

    for transaction in transactions {
        *totals.entry(transaction.category.as_str()).or_insert(0.0) += transaction.amount;
    }

    totals
}
