//! Defines the endpoint for creating a new transaction.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    database_id::TransactionId,
    extract::JsonBody,
    transaction::{TransactionPayload, TransactionState, core::create_transaction},
};

/// The response body for a created transaction.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct CreatedTransaction {
    /// The ID assigned to the new transaction.
    pub id: TransactionId,
}

/// A route handler for creating a new transaction, responds with the new ID.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    JsonBody(payload): JsonBody<TransactionPayload>,
) -> Result<Json<CreatedTransaction>, Error> {
    let new_transaction = payload.validate()?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = create_transaction(new_transaction, &connection)?;
    tracing::debug!("Created transaction {}", transaction.id);

    Ok(Json(CreatedTransaction { id: transaction.id }))
}
