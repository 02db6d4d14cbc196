use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::macros::date;

use transaction_tracker::{
    PasswordHash, Transaction, TransactionType, count_transactions, count_users,
    create_transaction, create_user, initialize_db,
};

/// A utility for creating a test database for the REST API server of transaction_tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user...");

    let password_hash = PasswordHash::new("test", PasswordHash::DEFAULT_COST)?;
    create_user("test", password_hash, &conn)?;

    println!("Creating sample transactions...");

    let transactions = [
        Transaction::build(TransactionType::Income, "salary", 1000.0, date!(2024 - 01 - 01))
            .description("January pay"),
        Transaction::build(TransactionType::Expense, "rent", 400.0, date!(2024 - 01 - 02)),
        Transaction::build(TransactionType::Expense, "groceries", 85.5, date!(2024 - 01 - 09)),
        Transaction::build(TransactionType::Income, "salary", 1000.0, date!(2024 - 02 - 01))
            .description("February pay"),
        Transaction::build(TransactionType::Expense, "rent", 400.0, date!(2024 - 02 - 02)),
    ];

    for transaction in transactions {
        create_transaction(transaction, &conn)?;
    }

    println!(
        "Success! Created {} user(s) and {} transaction(s).",
        count_users(&conn)?,
        count_transactions(&conn)?
    );

    Ok(())
}
