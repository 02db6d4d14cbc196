//! Transaction management for the tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `NewTransaction` builder
//! - Validation of transactions sent by clients
//! - Database functions for storing, querying, and managing transactions
//! - The route handlers for the `/transactions` endpoints

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod get_endpoint;
mod list_endpoint;
mod payload;

pub use core::{
    NewTransaction, Transaction, TransactionState, TransactionType, count_transactions,
    create_transaction, create_transaction_table,
};
pub use create_endpoint::create_transaction_endpoint;
#[cfg(test)]
pub use create_endpoint::CreatedTransaction;
pub use delete_endpoint::delete_transaction_endpoint;
#[cfg(test)]
pub use delete_endpoint::DeleteResult;
pub use edit_endpoint::edit_transaction_endpoint;
#[cfg(test)]
pub use edit_endpoint::UpdateResult;
pub use get_endpoint::get_transaction_endpoint;
#[cfg(test)]
pub use get_endpoint::TransactionResponse;
pub use list_endpoint::list_transactions_endpoint;
pub use payload::TransactionPayload;
