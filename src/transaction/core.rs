//! Defines the core data models and database queries for incomes and expenses.

use rusqlite::{Connection, Row, named_params};
use serde::Serialize;
use time::{Date, OffsetDateTime};

use crate::{Error, auth::UserID};

// ============================================================================
// MODELS
// ============================================================================

/// The database ID of an income or expense.
pub type TransactionId = i64;

/// Whether money was earned or spent.
///
/// Incomes and expenses have the same shape but live in separate tables and
/// are reported under different JSON keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    /// Money earned.
    Income,
    /// Money spent.
    Expense,
}

impl TransactionKind {
    /// The name of the table holding this kind of transaction.
    pub fn table(self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }

    /// The capitalised name used in messages, e.g. "Income not found".
    pub fn label(self) -> &'static str {
        match self {
            TransactionKind::Income => "Income",
            TransactionKind::Expense => "Expense",
        }
    }

    /// The lower case name used for JSON keys and the dashboard `type` field.
    pub fn type_name(self) -> &'static str {
        self.table()
    }

    /// The JSON key for a newly created ID, e.g. `income_id`.
    pub fn id_key(self) -> &'static str {
        match self {
            TransactionKind::Income => "income_id",
            TransactionKind::Expense => "expense_id",
        }
    }

    /// The JSON key for a list of transactions, e.g. `incomes`.
    pub fn list_key(self) -> &'static str {
        match self {
            TransactionKind::Income => "incomes",
            TransactionKind::Expense => "expenses",
        }
    }
}

time::serde::format_description!(date_format, Date, "[year]-[month]-[day]");

/// An income or expense recorded by a user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that recorded the transaction.
    pub user_id: UserID,
    /// A short name for the transaction, e.g. "Salary".
    pub title: String,
    /// The amount of money earned or spent, never negative.
    pub amount: f64,
    /// A free-form category label, e.g. "Groceries".
    pub category: String,
    /// When the money was earned or spent.
    #[serde(with = "date_format")]
    pub date: Date,
    /// Optional notes, empty if not given.
    pub description: String,
    /// When the transaction was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The data needed to record a new transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// A short name for the transaction.
    pub title: String,
    /// The amount of money earned or spent.
    pub amount: f64,
    /// A free-form category label.
    pub category: String,
    /// When the money was earned or spent.
    pub date: Date,
    /// Optional notes.
    pub description: String,
}

/// The fields to change on an existing transaction, `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionUpdate {
    /// A new title.
    pub title: Option<String>,
    /// A new amount.
    pub amount: Option<f64>,
    /// A new category.
    pub category: Option<String>,
    /// A new date.
    pub date: Option<Date>,
    /// A new description.
    pub description: Option<String>,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const TRANSACTION_COLUMNS: &str =
    "id, user_id, title, amount, category, date, description, created_at";

/// Create the income and expense tables.
///
/// # Errors
/// Returns an error if a table cannot be created or if there is an SQL error.
pub fn create_transaction_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    for kind in [TransactionKind::Income, TransactionKind::Expense] {
        let table = kind.table();

        connection.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                amount REAL NOT NULL,
                category TEXT NOT NULL,
                date TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )"
            ),
            (),
        )?;

        connection.execute(
            &format!("CREATE INDEX IF NOT EXISTS idx_{table}_user_id ON {table}(user_id)"),
            (),
        )?;
    }

    Ok(())
}

fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        amount: row.get(3)?,
        category: row.get(4)?,
        date: row.get(5)?,
        description: row.get(6)?,
        created_at: row.get(7)?,
    })
}

/// Record a new transaction for `user_id`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error,
/// e.g. `user_id` does not refer to a registered user.
pub fn create_transaction(
    user_id: UserID,
    kind: TransactionKind,
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let table = kind.table();

    connection
        .prepare(&format!(
            "INSERT INTO {table} (user_id, title, amount, category, date, description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                user_id,
                new_transaction.title,
                new_transaction.amount,
                new_transaction.category,
                new_transaction.date,
                new_transaction.description,
                OffsetDateTime::now_utc(),
            ),
            map_transaction_row,
        )
        .map_err(Error::from)
}

/// Get every transaction of `kind` recorded by `user_id`.
///
/// Transactions are ordered by date, newest first. Transactions on the same
/// date are ordered by when they were recorded, newest first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_transactions(
    user_id: UserID,
    kind: TransactionKind,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let table = kind.table();

    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM {table}
             WHERE user_id = :user_id
             ORDER BY date DESC, created_at DESC, id DESC"
        ))?
        .query_map(named_params! {":user_id": user_id}, map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Apply `update` to the transaction with `id` if it was recorded by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::TransactionNotFound] if `id` does not refer to a transaction recorded by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    user_id: UserID,
    kind: TransactionKind,
    update: TransactionUpdate,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let table = kind.table();

    connection
        .prepare(&format!(
            "UPDATE {table}
             SET title = COALESCE(:title, title),
                 amount = COALESCE(:amount, amount),
                 category = COALESCE(:category, category),
                 date = COALESCE(:date, date),
                 description = COALESCE(:description, description)
             WHERE id = :id AND user_id = :user_id
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            named_params! {
                ":title": update.title,
                ":amount": update.amount,
                ":category": update.category,
                ":date": update.date,
                ":description": update.description,
                ":id": id,
                ":user_id": user_id,
            },
            map_transaction_row,
        )
        .map_err(|error| match Error::from(error) {
            Error::NotFound => Error::TransactionNotFound(kind),
            error => error,
        })
}

/// Delete the transaction with `id` if it was recorded by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::TransactionNotFound] if `id` does not refer to a transaction recorded by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(
    id: TransactionId,
    user_id: UserID,
    kind: TransactionKind,
    connection: &Connection,
) -> Result<(), Error> {
    let table = kind.table();

    let rows_affected = connection.execute(
        &format!("DELETE FROM {table} WHERE id = :id AND user_id = :user_id"),
        named_params! {":id": id, ":user_id": user_id},
    )?;

    match rows_affected {
        0 => Err(Error::TransactionNotFound(kind)),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error, PasswordHash,
        auth::UserID,
        db::initialize,
        transaction::{
            NewTransaction, TransactionKind, TransactionUpdate, create_transaction,
            delete_transaction, get_transactions, update_transaction,
        },
    };

    fn get_connection_with_users() -> (Connection, UserID, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        let insert_user = |email: &str| {
            connection
                .query_row(
                    "INSERT INTO user (email, password, name, created_at)
                     VALUES (?1, ?2, 'Test', '2025-01-01 00:00:00Z') RETURNING id",
                    (email, PasswordHash::new_unchecked("hunter2").as_ref()),
                    |row| row.get::<_, UserID>(0),
                )
                .unwrap()
        };
        let alice = insert_user("alice@bar.baz");
        let bob = insert_user("bob@bar.baz");

        (connection, alice, bob)
    }

    fn new_transaction(title: &str, amount: f64, date: time::Date) -> NewTransaction {
        NewTransaction {
            title: title.to_owned(),
            amount,
            category: "Food".to_owned(),
            date,
            description: String::new(),
        }
    }

    #[test]
    fn create_then_list_returns_transaction() {
        let (connection, alice, _) = get_connection_with_users();

        let created = create_transaction(
            alice,
            TransactionKind::Expense,
            new_transaction("Lunch", 50.0, date!(2025 - 03 - 14)),
            &connection,
        )
        .unwrap();
        let listed = get_transactions(alice, TransactionKind::Expense, &connection).unwrap();

        assert_eq!(listed, vec![created.clone()]);
        assert_eq!(created.amount, 50.0);
        assert_eq!(created.date, date!(2025 - 03 - 14));
        assert_eq!(created.user_id, alice);
    }

    #[test]
    fn incomes_and_expenses_are_kept_apart() {
        let (connection, alice, _) = get_connection_with_users();

        create_transaction(
            alice,
            TransactionKind::Income,
            new_transaction("Salary", 1000.0, date!(2025 - 03 - 14)),
            &connection,
        )
        .unwrap();

        assert!(
            get_transactions(alice, TransactionKind::Expense, &connection)
                .unwrap()
                .is_empty()
        );
        assert_eq!(
            get_transactions(alice, TransactionKind::Income, &connection)
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn list_orders_by_date_then_newest_first() {
        let (connection, alice, _) = get_connection_with_users();
        let kind = TransactionKind::Income;

        for (title, date) in [
            ("old", date!(2025 - 01 - 01)),
            ("new", date!(2025 - 02 - 01)),
            ("new later", date!(2025 - 02 - 01)),
        ] {
            create_transaction(alice, kind, new_transaction(title, 1.0, date), &connection)
                .unwrap();
        }

        let titles: Vec<String> = get_transactions(alice, kind, &connection)
            .unwrap()
            .into_iter()
            .map(|transaction| transaction.title)
            .collect();

        assert_eq!(titles, ["new later", "new", "old"]);
    }

    #[test]
    fn list_only_returns_own_transactions() {
        let (connection, alice, bob) = get_connection_with_users();
        let kind = TransactionKind::Expense;
        create_transaction(
            alice,
            kind,
            new_transaction("Lunch", 5.0, date!(2025 - 01 - 01)),
            &connection,
        )
        .unwrap();

        assert!(get_transactions(bob, kind, &connection).unwrap().is_empty());
    }

    #[test]
    fn update_amount_leaves_other_fields() {
        let (connection, alice, _) = get_connection_with_users();
        let kind = TransactionKind::Expense;
        let created = create_transaction(
            alice,
            kind,
            new_transaction("Lunch", 5.0, date!(2025 - 01 - 01)),
            &connection,
        )
        .unwrap();

        let updated = update_transaction(
            created.id,
            alice,
            kind,
            TransactionUpdate {
                amount: Some(7.5),
                ..Default::default()
            },
            &connection,
        )
        .unwrap();

        assert_eq!(updated.amount, 7.5);
        assert_eq!(updated.title, created.title);
        assert_eq!(updated.category, created.category);
        assert_eq!(updated.date, created.date);
        assert_eq!(updated.description, created.description);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[test]
    fn update_or_delete_by_other_user_is_not_found() {
        let (connection, alice, bob) = get_connection_with_users();
        let kind = TransactionKind::Income;
        let created = create_transaction(
            alice,
            kind,
            new_transaction("Salary", 100.0, date!(2025 - 01 - 01)),
            &connection,
        )
        .unwrap();

        assert_eq!(
            update_transaction(
                created.id,
                bob,
                kind,
                TransactionUpdate {
                    amount: Some(0.0),
                    ..Default::default()
                },
                &connection
            ),
            Err(Error::TransactionNotFound(kind))
        );
        assert_eq!(
            delete_transaction(created.id, bob, kind, &connection),
            Err(Error::TransactionNotFound(kind))
        );
        assert_eq!(
            get_transactions(alice, kind, &connection).unwrap(),
            vec![created]
        );
    }

    #[test]
    fn delete_removes_transaction() {
        let (connection, alice, _) = get_connection_with_users();
        let kind = TransactionKind::Expense;
        let created = create_transaction(
            alice,
            kind,
            new_transaction("Lunch", 5.0, date!(2025 - 01 - 01)),
            &connection,
        )
        .unwrap();

        assert_eq!(delete_transaction(created.id, alice, kind, &connection), Ok(()));
        assert_eq!(
            delete_transaction(created.id, alice, kind, &connection),
            Err(Error::TransactionNotFound(kind))
        );
        assert!(get_transactions(alice, kind, &connection).unwrap().is_empty());
    }

    #[test]
    fn serialized_date_is_calendar_date() {
        let (connection, alice, _) = get_connection_with_users();
        let created = create_transaction(
            alice,
            TransactionKind::Expense,
            new_transaction("Lunch", 5.0, date!(2025 - 03 - 04)),
            &connection,
        )
        .unwrap();

        let json = serde_json::to_value(&created).unwrap();

        assert_eq!(json["date"], "2025-03-04");
        assert_eq!(json["amount"], 5.0);
        assert_eq!(json["description"], "");
    }
}
