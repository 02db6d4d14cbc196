//! Middleware for logging requests and responses.

use std::error::Error as _;

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{StatusCode, header::CONTENT_TYPE, request, response},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::LengthLimitError;
use serde_json::Value;

use crate::Error;

/// The number of characters of a body to log at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// The largest request body in bytes the server reads, larger bodies get a 413 response.
pub const REQUEST_BODY_LIMIT: usize = 2 * 1024 * 1024;

const REDACTED: &str = "********";

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] characters, it is
/// truncated and the full body is logged at the `debug` level.
///
/// Only the method, URI and status are logged from the headers so that bearer
/// tokens never reach the logs. Password fields in JSON bodies are redacted.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match axum::body::to_bytes(body, REQUEST_BODY_LIMIT).await {
        Ok(bytes) => bytes,
        Err(error) if is_length_limit_error(&error) => {
            tracing::info!(
                "Rejected request to {} {} with a body over {REQUEST_BODY_LIMIT} bytes",
                parts.method,
                parts.uri
            );
            return Error::PayloadTooLarge(REQUEST_BODY_LIMIT).into_response();
        }
        Err(error) => {
            tracing::error!("Could not read request body: {error}");
            return Error::InvalidRequest("could not read request body".to_owned())
                .into_response();
        }
    };

    log_request(&parts, &display_text(&parts, &body_bytes));

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    log_response(&parts, &String::from_utf8_lossy(&body_bytes));

    Response::from_parts(parts, Body::from(body_bytes))
}

fn is_length_limit_error(error: &axum::Error) -> bool {
    let mut source = error.source();

    while let Some(error) = source {
        if error.is::<LengthLimitError>() {
            return true;
        }
        source = error.source();
    }

    false
}

fn display_text(parts: &request::Parts, body: &Bytes) -> String {
    let is_json = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));

    if is_json {
        redact_password(body)
    } else {
        String::from_utf8_lossy(body).to_string()
    }
}

/// Replace the value of a top-level "password" field with asterisks.
///
/// Bodies that are not JSON objects are returned as-is, unless they mention a
/// password, in which case the whole body is redacted.
fn redact_password(body: &[u8]) -> String {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(mut object)) => {
            if let Some(password) = object.get_mut("password") {
                *password = Value::String(REDACTED.to_owned());
            }
            Value::Object(object).to_string()
        }
        _ => {
            let text = String::from_utf8_lossy(body);
            if text.contains("password") {
                REDACTED.to_owned()
            } else {
                text.to_string()
            }
        }
    }
}

fn truncate(body: &str) -> Option<&str> {
    body.char_indices()
        .nth(LOG_BODY_LENGTH_LIMIT)
        .map(|(end, _)| &body[..end])
}

fn log_request(parts: &request::Parts, body: &str) {
    if let Some(truncated_body) = truncate(body) {
        tracing::info!(
            "Received request: {} {}\nbody: {truncated_body}...",
            parts.method,
            parts.uri
        );
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!(
            "Received request: {} {}\nbody: {body:?}",
            parts.method,
            parts.uri
        );
    }
}

fn log_response(parts: &response::Parts, body: &str) {
    if let Some(truncated_body) = truncate(body) {
        tracing::info!(
            "Sending response: {}\nbody: {truncated_body}...",
            parts.status
        );
        tracing::debug!("Full response body: {body:?}");
    } else {
        tracing::info!("Sending response: {}\nbody: {body:?}", parts.status);
    }
}
