//! Defines the endpoint for fetching a single transaction.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    database_id::TransactionId,
    extract::PathParams,
    transaction::{Transaction, TransactionState, core::get_transaction},
};

/// The response body for a single transaction.
#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionResponse {
    /// The requested transaction.
    pub transaction: Transaction,
}

/// A route handler for getting a transaction by its ID.
///
/// Responds with 404 if there is no transaction with the ID.
pub async fn get_transaction_endpoint(
    State(state): State<TransactionState>,
    PathParams(transaction_id): PathParams<TransactionId>,
) -> Result<Json<TransactionResponse>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = get_transaction(transaction_id, &connection)?;

    Ok(Json(TransactionResponse { transaction }))
}
