//! Defines the endpoint for deleting a transaction.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    database_id::TransactionId,
    extract::PathParams,
    transaction::{TransactionState, core::delete_transaction},
};

/// The response body for a delete.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct DeleteResult {
    /// The number of transactions that were deleted.
    pub deleted: usize,
}

/// A route handler for deleting a transaction.
///
/// Responds with 404 if there is no transaction with the ID.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    PathParams(transaction_id): PathParams<TransactionId>,
) -> Result<Json<DeleteResult>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let deleted = delete_transaction(transaction_id, &connection).inspect_err(|error| {
        tracing::error!("Could not delete transaction {transaction_id}: {error}")
    })?;

    match deleted {
        0 => Err(Error::TransactionNotFound(transaction_id)),
        deleted => Ok(Json(DeleteResult { deleted })),
    }
}
