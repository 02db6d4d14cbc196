//! Creates the application's tables in a SQLite database.

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{Error, auth::create_user_table, transaction::create_transaction_table};

/// Create all of the database tables for the application.
///
/// Existing tables are left untouched, so this is safe to call on every start.
///
/// # Errors
/// This function may return an error if a table could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::initialize;

    fn table_names(connection: &Connection) -> Vec<String> {
        connection
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn creates_tables() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).unwrap();

        let names = table_names(&connection);
        assert!(names.contains(&"users".to_owned()), "got tables {names:?}");
        assert!(
            names.contains(&"transactions".to_owned()),
            "got tables {names:?}"
        );
    }

    #[test]
    fn initialize_is_idempotent() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).unwrap();

        assert!(initialize(&connection).is_ok());
    }
}
