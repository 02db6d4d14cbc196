//! Defines the core data models and database queries for transactions.

use std::{
    fmt::Display,
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::extract::FromRef;
use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{AppState, Error, database_id::TransactionId, pagination::Page};

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
///
/// The amount of a transaction is always non-negative, its type gives the direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money earned, e.g. a salary.
    Income,
    /// Money spent, e.g. rent.
    Expense,
}

impl TransactionType {
    /// The name of the type as stored in the database and sent to clients.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The error for a string that is neither "income" nor "expense".
#[derive(Debug, thiserror::Error, PartialEq)]
#[error("\"{0}\" is not a transaction type, expected \"income\" or \"expense\"")]
pub struct ParseTransactionTypeError(String);

impl FromStr for TransactionType {
    type Err = ParseTransactionTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(ParseTransactionTypeError(other.to_owned())),
        }
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// Whether the money was earned or spent.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// A free-text label, e.g. "salary" or "rent".
    pub category: String,
    /// The amount of money spent or earned in this transaction.
    pub amount: f64,
    /// When the transaction happened.
    #[serde(with = "crate::date_format")]
    pub date: Date,
    /// A text description of what the transaction was for.
    pub description: String,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [NewTransaction] for discoverability.
    pub fn build(
        transaction_type: TransactionType,
        category: &str,
        amount: f64,
        date: Date,
    ) -> NewTransaction {
        NewTransaction {
            transaction_type,
            category: category.to_owned(),
            amount,
            date,
            description: String::new(),
        }
    }
}

/// The fields of a transaction that has not been stored yet, or that replace
/// all fields of a stored transaction.
///
/// Values coming from clients should be created with
/// [TransactionPayload::validate](crate::transaction::TransactionPayload::validate).
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// Whether the money was earned or spent.
    pub transaction_type: TransactionType,
    /// A free-text label, e.g. "salary" or "rent".
    pub category: String,
    /// The non-negative amount of money.
    pub amount: f64,
    /// When the transaction happened.
    pub date: Date,
    /// A text description of what the transaction was for.
    pub description: String,
}

impl NewTransaction {
    /// Set the description for the transaction.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }
}

/// The state needed by the transaction endpoints.
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

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

type RowsAffected = usize;

/// Create a new transaction in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error,
/// e.g. a negative amount that slipped past validation.
pub fn create_transaction(
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "INSERT INTO transactions (type, category, amount, date, description)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, type, category, amount, date, description",
        )?
        .query_row(
            (
                new_transaction.transaction_type,
                new_transaction.category,
                new_transaction.amount,
                new_transaction.date,
                new_transaction.description,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::TransactionNotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    connection
        .prepare(
            "SELECT id, type, category, amount, date, description FROM transactions WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_transaction_row)
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::TransactionNotFound(id),
            error => error.into(),
        })
}

/// Get one page of transactions in order of creation.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn list_transactions(page: Page, connection: &Connection) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, type, category, amount, date, description FROM transactions
             ORDER BY id ASC
             LIMIT ?1 OFFSET ?2",
        )?
        .query_map((page.limit, page.offset), map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::SqlError))
        .collect()
}

/// Replace every field of the transaction with `id`.
///
/// Returns the number of rows changed, which is zero if there is no
/// transaction with `id`.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn update_transaction(
    id: TransactionId,
    replacement: NewTransaction,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "UPDATE transactions
             SET type = ?1, category = ?2, amount = ?3, date = ?4, description = ?5
             WHERE id = ?6",
            (
                replacement.transaction_type,
                replacement.category,
                replacement.amount,
                replacement.date,
                replacement.description,
                id,
            ),
        )
        .map_err(|error| error.into())
}

/// Delete the transaction with `id`.
///
/// Returns the number of rows deleted, which is zero if there is no
/// transaction with `id`.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<RowsAffected, Error> {
    connection
        .execute("DELETE FROM transactions WHERE id = :id", &[(":id", &id)])
        .map_err(|error| error.into())
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM transactions;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
                category TEXT NOT NULL,
                amount REAL NOT NULL CHECK (amount >= 0),
                date TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT ''
                )",
        (),
    )?;

    // Add composite index used by the summary and report queries.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transactions_date_category ON transactions(date, category);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let transaction_type = row.get(1)?;
    let category = row.get(2)?;
    let amount = row.get(3)?;
    let date = row.get(4)?;
    let description = row.get(5)?;

    Ok(Transaction {
        id,
        transaction_type,
        category,
        amount,
        date,
        description,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        db::initialize,
        pagination::Page,
        transaction::{Transaction, TransactionType},
    };

    use super::{
        count_transactions, create_transaction, delete_transaction, get_transaction,
        list_transactions, update_transaction,
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn create_succeeds() {
        let conn = get_test_connection();
        let new_transaction = Transaction::build(
            TransactionType::Income,
            "salary",
            1000.0,
            date!(2024 - 01 - 01),
        )
        .description("January pay");

        let transaction = create_transaction(new_transaction.clone(), &conn).unwrap();

        assert_eq!(transaction.id, 1);
        assert_eq!(transaction.transaction_type, new_transaction.transaction_type);
        assert_eq!(transaction.category, new_transaction.category);
        assert_eq!(transaction.amount, new_transaction.amount);
        assert_eq!(transaction.date, new_transaction.date);
        assert_eq!(transaction.description, new_transaction.description);
    }

    #[test]
    fn create_assigns_increasing_ids() {
        let conn = get_test_connection();
        let today = date!(2024 - 01 - 01);

        let first =
            create_transaction(Transaction::build(TransactionType::Expense, "a", 1.0, today), &conn)
                .unwrap();
        let second =
            create_transaction(Transaction::build(TransactionType::Expense, "b", 2.0, today), &conn)
                .unwrap();

        assert!(second.id > first.id);
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let conn = get_test_connection();
        let today = date!(2024 - 01 - 01);
        let first =
            create_transaction(Transaction::build(TransactionType::Expense, "a", 1.0, today), &conn)
                .unwrap();
        delete_transaction(first.id, &conn).unwrap();

        let second =
            create_transaction(Transaction::build(TransactionType::Expense, "a", 1.0, today), &conn)
                .unwrap();

        assert!(second.id > first.id);
    }

    #[test]
    fn create_fails_on_negative_amount() {
        let conn = get_test_connection();

        let result = create_transaction(
            Transaction::build(
                TransactionType::Expense,
                "rent",
                -400.0,
                date!(2024 - 01 - 02),
            ),
            &conn,
        );

        assert!(matches!(result, Err(Error::SqlError(_))), "got {result:?}");
    }

    #[test]
    fn get_round_trips_all_fields() {
        let conn = get_test_connection();
        let created = create_transaction(
            Transaction::build(
                TransactionType::Expense,
                "rent",
                400.25,
                date!(2024 - 01 - 02),
            )
            .description("Flat"),
            &conn,
        )
        .unwrap();

        let fetched = get_transaction(created.id, &conn).unwrap();

        assert_eq!(fetched, created);
    }

    #[test]
    fn get_fails_on_missing_id() {
        let conn = get_test_connection();

        assert_eq!(
            get_transaction(42, &conn),
            Err(Error::TransactionNotFound(42))
        );
    }

    #[test]
    fn update_replaces_all_fields() {
        let conn = get_test_connection();
        let created = create_transaction(
            Transaction::build(
                TransactionType::Income,
                "salary",
                1000.0,
                date!(2024 - 01 - 01),
            )
            .description("January pay"),
            &conn,
        )
        .unwrap();
        let replacement = Transaction::build(
            TransactionType::Expense,
            "groceries",
            1200.0,
            date!(2024 - 02 - 03),
        );

        let rows_affected = update_transaction(created.id, replacement.clone(), &conn).unwrap();

        assert_eq!(rows_affected, 1);
        let fetched = get_transaction(created.id, &conn).unwrap();
        assert_eq!(fetched.transaction_type, TransactionType::Expense);
        assert_eq!(fetched.category, "groceries");
        assert_eq!(fetched.amount, 1200.0);
        assert_eq!(fetched.date, date!(2024 - 02 - 03));
        assert_eq!(fetched.description, "");
    }

    #[test]
    fn update_missing_id_changes_nothing() {
        let conn = get_test_connection();

        let rows_affected = update_transaction(
            42,
            Transaction::build(TransactionType::Income, "x", 1.0, date!(2024 - 01 - 01)),
            &conn,
        )
        .unwrap();

        assert_eq!(rows_affected, 0);
    }

    #[test]
    fn delete_removes_transaction() {
        let conn = get_test_connection();
        let created = create_transaction(
            Transaction::build(TransactionType::Income, "x", 1.0, date!(2024 - 01 - 01)),
            &conn,
        )
        .unwrap();

        let rows_affected = delete_transaction(created.id, &conn).unwrap();

        assert_eq!(rows_affected, 1);
        assert_eq!(
            get_transaction(created.id, &conn),
            Err(Error::TransactionNotFound(created.id))
        );
        assert_eq!(delete_transaction(created.id, &conn).unwrap(), 0);
    }

    #[test]
    fn list_returns_requested_page_in_id_order() {
        let conn = get_test_connection();
        for i in 1..=25 {
            create_transaction(
                Transaction::build(
                    TransactionType::Expense,
                    "misc",
                    i as f64,
                    date!(2024 - 01 - 01),
                ),
                &conn,
            )
            .unwrap();
        }

        let got = list_transactions(
            Page {
                limit: 10,
                offset: 20,
            },
            &conn,
        )
        .unwrap();

        let ids: Vec<_> = got.iter().map(|transaction| transaction.id).collect();
        assert_eq!(ids, vec![21, 22, 23, 24, 25]);
    }

    #[test]
    fn get_count() {
        let conn = get_test_connection();
        let today = date!(2025 - 10 - 05);
        let want_count = 20;
        for i in 1..=want_count {
            create_transaction(
                Transaction::build(TransactionType::Income, "", i as f64, today),
                &conn,
            )
            .expect("Could not create transaction");
        }

        let got_count = count_transactions(&conn).expect("Could not get count");

        assert_eq!(want_count, got_count);
    }
}
