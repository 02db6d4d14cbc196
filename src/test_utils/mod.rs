#![allow(missing_docs)]

use axum_test::TestServer;
use rusqlite::Connection;
use serde_json::json;

use crate::{
    AppState, AuthConfig, PaginationConfig, auth::TokenResponse, build_router, endpoints,
};

pub(crate) const TEST_JWT_SECRET: &str = "foobar";
pub(crate) const TEST_USERNAME: &str = "test";
pub(crate) const TEST_PASSWORD: &str = "averysafeandsecurepassword";

/// An app state with an in-memory database and a cheap bcrypt cost.
pub(crate) fn get_test_state() -> AppState {
    let connection = Connection::open_in_memory().expect("Could not open in-memory database");
    let auth_config = AuthConfig {
        password_hash_cost: 4,
        ..Default::default()
    };

    AppState::new(
        connection,
        TEST_JWT_SECRET,
        auth_config,
        PaginationConfig::default(),
    )
    .expect("Could not create app state")
}

/// A server for the full app and a bearer token for a registered user.
pub(crate) async fn get_test_server_with_token() -> (TestServer, String) {
    let server = TestServer::try_new(build_router(get_test_state()))
        .expect("Could not create test server.");
    let credentials = json!({ "username": TEST_USERNAME, "password": TEST_PASSWORD });

    server
        .post(endpoints::REGISTER)
        .json(&credentials)
        .await
        .assert_status(axum::http::StatusCode::CREATED);

    let token = server
        .post(endpoints::LOG_IN)
        .json(&credentials)
        .await
        .json::<TokenResponse>()
        .token;

    (server, token)
}
