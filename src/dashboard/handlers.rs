//! HTTP handler for the dashboard summary.
//!
//! Fetches all of the user's incomes and expenses and aggregates them on
//! every request.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Serialize;

use crate::{
    AppState, Error,
    auth::UserID,
    dashboard::aggregation::{
        RecentTransaction, Summary, most_recent, sum_by_category, summarise,
    },
    transaction::{TransactionKind, get_transactions},
};

/// The state needed for the dashboard summary.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct RecentTransactions<'a> {
    incomes: Vec<RecentTransaction<'a>>,
    expenses: Vec<RecentTransaction<'a>>,
}

#[derive(Debug, Serialize)]
struct CategoryBreakdown<'a> {
    income: BTreeMap<&'a str, f64>,
    expense: BTreeMap<&'a str, f64>,
}

#[derive(Debug, Serialize)]
struct DashboardSummary<'a> {
    summary: Summary,
    recent_transactions: RecentTransactions<'a>,
    category_breakdown: CategoryBreakdown<'a>,
}

/// Respond with the logged-in user's totals, most recent transactions and
/// per-category totals.
pub async fn get_dashboard_summary(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let (incomes, expenses) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        (
            get_transactions(user_id, TransactionKind::Income, &connection)?,
            get_transactions(user_id, TransactionKind::Expense, &connection)?,
        )
    };

    let dashboard = DashboardSummary {
        summary: summarise(&incomes, &expenses),
        recent_transactions: RecentTransactions {
            incomes: most_recent(&incomes, TransactionKind::Income),
            expenses: most_recent(&expenses, TransactionKind::Expense),
        },
        category_breakdown: CategoryBreakdown {
            income: sum_by_category(&incomes),
            expense: sum_by_category(&expenses),
        },
    };

    Ok(Json(dashboard).into_response())
}
