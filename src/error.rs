//! Defines the app level error type and its conversion to JSON responses.
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::database_id::TransactionId;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The username does not belong to a registered user or the password was
    /// wrong.
    ///
    /// The two cases are deliberately indistinguishable to the client.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// A protected route was requested without a bearer token.
    #[error("missing bearer token")]
    MissingToken,

    /// The bearer token could not be verified, e.g. it was tampered with,
    /// signed with another secret or has expired.
    #[error("invalid bearer token")]
    InvalidToken,

    /// A token could not be signed.
    #[error("could not create token: {0}")]
    TokenCreation(String),

    /// The username is already taken by another user.
    #[error("the username \"{0}\" already exists")]
    DuplicateUsername(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The request body, query string or path could not be parsed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A transaction sent by the client failed validation.
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),

    /// A report or summary was requested with invalid filter values.
    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    /// No transaction has the requested ID.
    #[error("no transaction with the ID {0}")]
    TransactionNotFound(TransactionId),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// A sum over the stored amounts is not a finite number.
    #[error("the total for {0} is not a finite number")]
    NonFiniteTotal(String),

    /// The request body is larger than the server accepts.
    #[error("the request body is larger than {0} bytes")]
    PayloadTooLarge(usize),

    /// A blocking task, e.g. hashing a password, panicked or was cancelled.
    #[error("a blocking task failed: {0}")]
    BlockingTaskFailed(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::InvalidRequest(rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Error::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            // Auth failures on protected routes only carry a status code.
            Error::MissingToken => return StatusCode::UNAUTHORIZED.into_response(),
            Error::InvalidToken => return StatusCode::FORBIDDEN.into_response(),
            Error::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid credentials".to_owned())
            }
            Error::DuplicateUsername(_) => {
                (StatusCode::BAD_REQUEST, "User already exists".to_owned())
            }
            Error::InvalidRequest(message)
            | Error::InvalidTransaction(message)
            | Error::InvalidFilter(message) => (StatusCode::BAD_REQUEST, message),
            Error::TransactionNotFound(_) => {
                (StatusCode::NOT_FOUND, "Transaction not found".to_owned())
            }
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                "The requested resource could not be found".to_owned(),
            ),
            Error::PayloadTooLarge(limit) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                format!("The request body must be at most {limit} bytes"),
            ),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred, check the server logs for more details"
                        .to_owned(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
