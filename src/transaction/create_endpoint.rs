//! Defines the endpoint for recording a new income or expense.
use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;
use serde_json::{Map, Value, json};

use crate::{
    AppState, Error,
    auth::UserID,
    json_body::JsonBody,
    transaction::{TransactionKind, core::create_transaction, request::TransactionRequest},
};

/// The state needed to create, list, edit or delete transactions.
#[derive(Debug, Clone)]
pub struct TransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for recording a new income or expense for the logged-in user.
///
/// Responds with 201 Created and the new ID under `income_id` or `expense_id`.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Extension(kind): Extension<TransactionKind>,
    JsonBody(request): JsonBody<TransactionRequest>,
) -> Result<(StatusCode, Json<Value>), Error> {
    let new_transaction = request.into_new_transaction()?;

    let transaction = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        create_transaction(user_id, kind, new_transaction, &connection)?
    };

    tracing::debug!(
        "User {user_id} recorded {} {}",
        kind.type_name(),
        transaction.id
    );

    let mut body = Map::new();
    body.insert(
        "message".to_owned(),
        json!(format!("{} created successfully", kind.label())),
    );
    body.insert(kind.id_key().to_owned(), json!(transaction.id));

    Ok((StatusCode::CREATED, Json(Value::Object(body))))
}
