//! Listing the logged-in user's incomes or expenses, newest first.

use axum::{Extension, Json, extract::State};
use serde_json::{Map, Value, json};

use crate::{
    Error,
    auth::UserID,
    transaction::{TransactionKind, core::get_transactions, create_endpoint::TransactionState},
};

/// A route handler that lists the logged-in user's incomes or expenses,
/// newest first, under `incomes` or `expenses`.
pub async fn list_transactions_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Extension(kind): Extension<TransactionKind>,
) -> Result<Json<Value>, Error> {
    let transactions = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        get_transactions(user_id, kind, &connection)?
    };

    let mut body = Map::new();
    body.insert(kind.list_key().to_owned(), json!(transactions));

    Ok(Json(Value::Object(body)))
}
