//! Extractors that reject malformed requests with the app's JSON error body
//! instead of axum's plain text rejections.

use axum::extract::{FromRequest, FromRequestParts};

use crate::Error;

/// Like [axum::Json], but a body that cannot be parsed is rejected with [Error::InvalidRequest].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct JsonBody<T>(pub T);

/// Like [axum::extract::Query], but a query string that cannot be parsed is rejected with
/// [Error::InvalidRequest].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Error))]
pub struct QueryParams<T>(pub T);

/// Like [axum::extract::Path], but path parameters that cannot be parsed are rejected with
/// [Error::InvalidRequest].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct PathParams<T>(pub T);
