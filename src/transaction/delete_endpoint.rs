//! Deleting an income or expense owned by the logged-in user.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde_json::{Value, json};

use crate::{
    Error,
    auth::UserID,
    transaction::{
        TransactionKind, core::delete_transaction, create_endpoint::TransactionState,
        edit_endpoint::parse_transaction_id,
    },
};

/// A route handler for deleting one of the logged-in user's incomes or expenses.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Extension(kind): Extension<TransactionKind>,
    Path(transaction_id): Path<String>,
) -> Result<Json<Value>, Error> {
    let transaction_id = parse_transaction_id(&transaction_id, kind)?;

    {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        delete_transaction(transaction_id, user_id, kind, &connection)?;
    }

    Ok(Json(
        json!({ "message": format!("{} deleted successfully", kind.label()) }),
    ))
}
