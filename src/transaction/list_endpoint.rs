//! Defines the endpoint for listing transactions one page at a time.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    extract::QueryParams,
    pagination::{PageQuery, PaginationConfig},
    transaction::{Transaction, core::list_transactions},
};

/// The state needed to list transactions.
#[derive(Debug, Clone)]
pub struct ListTransactionsState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The defaults for requests that leave out the page or limit.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for ListTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// The response body for a page of transactions.
#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionList {
    /// The transactions on the requested page, oldest first.
    pub transactions: Vec<Transaction>,
}

/// A route handler for listing transactions, e.g. `GET /transactions?page=2&limit=20`.
pub async fn list_transactions_endpoint(
    State(state): State<ListTransactionsState>,
    QueryParams(query): QueryParams<PageQuery>,
) -> Result<Json<TransactionList>, Error> {
    let page = query.resolve(&state.pagination_config)?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = list_transactions(page, &connection)?;

    Ok(Json(TransactionList { transactions }))
}
