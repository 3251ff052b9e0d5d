//! Editing an income or expense owned by the logged-in user.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde_json::{Map, Value, json};

use crate::{
    Error,
    auth::UserID,
    json_body::JsonBody,
    transaction::{
        TransactionId, TransactionKind, core::update_transaction,
        create_endpoint::TransactionState, request::TransactionRequest,
    },
};

/// Parse a transaction ID from a URL path segment.
///
/// A segment that is not an integer cannot refer to a transaction.
pub(super) fn parse_transaction_id(
    segment: &str,
    kind: TransactionKind,
) -> Result<TransactionId, Error> {
    segment
        .parse()
        .map_err(|_| Error::TransactionNotFound(kind))
}

/// A route handler for editing one of the logged-in user's incomes or expenses.
///
/// Only the fields present in the request body are changed. Responds with the
/// updated record under `income` or `expense`.
pub async fn edit_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Extension(kind): Extension<TransactionKind>,
    Path(transaction_id): Path<String>,
    JsonBody(request): JsonBody<TransactionRequest>,
) -> Result<Json<Value>, Error> {
    let transaction_id = parse_transaction_id(&transaction_id, kind)?;
    let update = request.into_update()?;

    let transaction = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        update_transaction(transaction_id, user_id, kind, update, &connection)?
    };

    let mut body = Map::new();
    body.insert(
        "message".to_owned(),
        json!(format!("{} updated successfully", kind.label())),
    );
    body.insert(kind.type_name().to_owned(), json!(transaction));

    Ok(Json(Value::Object(body)))
}
