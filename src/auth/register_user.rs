//! Defines the endpoint for registering a new user.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::{PasswordHash, UserID, user::create_user},
    extract::JsonBody,
};

/// The state needed for registering a user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The database connection for managing users.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The bcrypt cost for hashing new passwords.
    pub password_hash_cost: u32,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            password_hash_cost: state.auth_config.password_hash_cost,
        }
    }
}

/// The username and password sent to register or log in.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    /// The name to register or log in with.
    pub username: String,
    /// The raw password. Never stored or logged.
    pub password: String,
}

/// The response body for a successful registration.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct RegisteredUser {
    /// The ID assigned to the new user.
    pub id: UserID,
    /// A human readable confirmation.
    pub message: String,
}

/// A route handler for registering a new user.
///
/// Responds with 201 and the new user ID on success, or 400 if the username
/// is already taken or either field is empty.
pub async fn register_user(
    State(state): State<RegistrationState>,
    JsonBody(credentials): JsonBody<Credentials>,
) -> Result<(StatusCode, Json<RegisteredUser>), Error> {
    if credentials.username.is_empty() {
        return Err(Error::InvalidRequest("username must not be empty".to_owned()));
    }

    if credentials.password.is_empty() {
        return Err(Error::InvalidRequest("password must not be empty".to_owned()));
    }

    let Credentials { username, password } = credentials;
    let cost = state.password_hash_cost;
    let password_hash = tokio::task::spawn_blocking(move || PasswordHash::new(&password, cost))
        .await
        .map_err(|error| Error::BlockingTaskFailed(error.to_string()))??;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let user = create_user(&username, password_hash, &connection).inspect_err(
        |error| {
            if let Error::DuplicateUsername(username) = error {
                tracing::info!("Rejected registration for existing username {username:?}");
            }
        },
    )?;

    tracing::info!("Registered user {} with ID {}", user.username, user.id);

    Ok((
        StatusCode::CREATED,
        Json(RegisteredUser {
            id: user.id,
            message: "User registered successfully".to_owned(),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use axum::{Router, http::StatusCode, routing::post};
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use crate::{
        auth::{
            register_user::{RegisteredUser, register_user},
            user::get_user_by_username,
        },
        test_utils::get_test_state,
    };

    fn get_test_server() -> (TestServer, crate::AppState) {
        let state = get_test_state();
        let app = Router::new()
            .route("/register", post(register_user))
            .with_state(state.clone());

        let server = TestServer::try_new(app).expect("Could not create test server.");

        (server, state)
    }

    #[tokio::test]
    async fn register_creates_user() {
        let (server, state) = get_test_server();

        let response = server
            .post("/register")
            .json(&json!({ "username": "alice", "password": "hunter2" }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body = response.json::<RegisteredUser>();
        assert_eq!(body.message, "User registered successfully");

        let connection = state.db_connection.lock().unwrap();
        let user = get_user_by_username("alice", &connection).unwrap();
        assert_eq!(user.id, body.id);
        assert!(user.password_hash.verify("hunter2").unwrap());
        assert_ne!(user.password_hash.as_str(), "hunter2");
    }

    #[tokio::test]
    async fn register_same_username_twice_fails() {
        let (server, _) = get_test_server();
        let credentials = json!({ "username": "alice", "password": "hunter2" });

        server
            .post("/register")
            .json(&credentials)
            .await
            .assert_status(StatusCode::CREATED);

        let response = server.post("/register").json(&credentials).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "error": "User already exists" }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_registrations_get_distinct_ids() {
        let (server, _) = get_test_server();

        let (alice, bob) = tokio::join!(
            server
                .post("/register")
                .json(&json!({ "username": "alice", "password": "hunter2" })),
            server
                .post("/register")
                .json(&json!({ "username": "bob", "password": "hunter3" })),
        );

        alice.assert_status(StatusCode::CREATED);
        bob.assert_status(StatusCode::CREATED);
        assert_ne!(
            alice.json::<RegisteredUser>().id,
            bob.json::<RegisteredUser>().id
        );
    }

    #[tokio::test]
    async fn register_fails_on_empty_username() {
        let (server, _) = get_test_server();

        let response = server
            .post("/register")
            .json(&json!({ "username": "", "password": "hunter2" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body = response.json::<Value>();
        assert_eq!(body["error"], "username must not be empty");
    }

    #[tokio::test]
    async fn register_fails_on_missing_password() {
        let (server, _) = get_test_server();

        server
            .post("/register")
            .json(&json!({ "username": "alice" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
