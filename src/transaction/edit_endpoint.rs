//! Defines the endpoint for replacing all fields of a transaction.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    database_id::TransactionId,
    extract::{JsonBody, PathParams},
    transaction::{TransactionPayload, TransactionState, core::update_transaction},
};

/// The response body for an update.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct UpdateResult {
    /// The number of transactions that were changed.
    pub updated: usize,
}

/// A route handler for replacing a transaction.
///
/// The body must contain every field, as for creating a transaction.
/// Responds with 404 if there is no transaction with the ID.
pub async fn edit_transaction_endpoint(
    State(state): State<TransactionState>,
    PathParams(transaction_id): PathParams<TransactionId>,
    JsonBody(payload): JsonBody<TransactionPayload>,
) -> Result<Json<UpdateResult>, Error> {
    let replacement = payload.validate()?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    match update_transaction(transaction_id, replacement, &connection)? {
        0 => Err(Error::TransactionNotFound(transaction_id)),
        updated => Ok(Json(UpdateResult { updated })),
    }
}

#[cfg(test)]
mod tests {
    use axum::{Router, http::StatusCode, routing::put};
    use axum_test::TestServer;
    use serde_json::json;
    use time::macros::date;

    use crate::{
        AppState,
        endpoints::{self, format_endpoint},
        test_utils::get_test_state,
        transaction::{
            Transaction, TransactionType,
            core::{create_transaction, get_transaction},
        },
    };

    use super::{UpdateResult, edit_transaction_endpoint};

    fn get_test_server() -> (TestServer, AppState) {
        let state = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_transaction(
                Transaction::build(
                    TransactionType::Income,
                    "salary",
                    1000.0,
                    date!(2024 - 01 - 01),
                ),
                &connection,
            )
            .unwrap();
        }

        let app = Router::new()
            .route(endpoints::TRANSACTION, put(edit_transaction_endpoint))
            .with_state(state.clone());

        let server = TestServer::try_new(app).expect("Could not create test server.");

        (server, state)
    }

    #[tokio::test]
    async fn replaces_transaction() {
        let (server, state) = get_test_server();

        let response = server
            .put(&format_endpoint(endpoints::TRANSACTION, 1))
            .json(&json!({
                "type": "income",
                "category": "salary",
                "amount": 1200.0,
                "date": "2024-01-01",
                "description": "Raise"
            }))
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<UpdateResult>(), UpdateResult { updated: 1 });
        let connection = state.db_connection.lock().unwrap();
        let transaction = get_transaction(1, &connection).unwrap();
        assert_eq!(transaction.amount, 1200.0);
        assert_eq!(transaction.description, "Raise");
    }

    #[tokio::test]
    async fn missing_transaction_is_not_found() {
        let (server, _) = get_test_server();

        let response = server
            .put(&format_endpoint(endpoints::TRANSACTION, 999))
            .json(&json!({
                "type": "expense",
                "category": "rent",
                "amount": 400.0,
                "date": "2024-01-02"
            }))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        response.assert_json(&json!({ "error": "Transaction not found" }));
    }

    #[tokio::test]
    async fn rejects_invalid_replacement() {
        let (server, state) = get_test_server();

        let response = server
            .put(&format_endpoint(endpoints::TRANSACTION, 1))
            .json(&json!({
                "type": "income",
                "category": "salary",
                "amount": -5.0,
                "date": "2024-01-01"
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_transaction(1, &connection).unwrap().amount, 1000.0);
    }
}
