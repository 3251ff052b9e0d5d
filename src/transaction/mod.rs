//! Incomes and expenses.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionKind` that tells incomes and expenses apart
//! - Database functions for storing, querying, editing and deleting transactions
//! - Route handlers for the income and expense endpoints

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod list_endpoint;
mod request;

pub use self::core::{
    NewTransaction, Transaction, TransactionId, TransactionKind, TransactionUpdate,
    create_transaction_tables, get_transactions,
};
pub use create_endpoint::{TransactionState, create_transaction_endpoint};
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::edit_transaction_endpoint;
pub use list_endpoint::list_transactions_endpoint;

#[cfg(test)]
pub use self::core::{create_transaction, delete_transaction, update_transaction};
