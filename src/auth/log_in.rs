//! Defines the endpoint for logging in a user and issuing a bearer token.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{
    AppState, Error,
    auth::{
        PasswordHash,
        register_user::Credentials,
        token::{JwtKeys, issue_token},
        user::get_user_by_username,
    },
    extract::JsonBody,
};

/// The state needed for logging in a user.
#[derive(Clone)]
pub struct LogInState {
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The keys for signing tokens.
    pub jwt_keys: JwtKeys,
    /// How long issued tokens are valid for.
    pub token_duration: Duration,
    /// Verified against when the username is unknown so that the response
    /// time does not reveal which usernames are registered.
    pub dummy_password_hash: PasswordHash,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            jwt_keys: state.jwt_keys.clone(),
            token_duration: state.auth_config.token_duration,
            dummy_password_hash: state.dummy_password_hash.clone(),
        }
    }
}

/// The response body for a successful log in.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The bearer token for accessing protected routes.
    pub token: String,
}

/// Handler for log-in requests.
///
/// # Errors
///
/// This function will return an error in a few situtations.
/// - The username does not belong to a registered user.
/// - The password is not correct.
/// - An internal error occurred when verifying the password or signing the token.
pub async fn post_log_in(
    State(state): State<LogInState>,
    JsonBody(credentials): JsonBody<Credentials>,
) -> Result<Json<TokenResponse>, Error> {
    let user = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        match get_user_by_username(&credentials.username, &connection) {
            Ok(user) => Some(user),
            Err(Error::NotFound) => None,
            Err(error) => return Err(error),
        }
    };

    let password_hash = user
        .as_ref()
        .map_or(&state.dummy_password_hash, |user| &user.password_hash)
        .clone();
    let password = credentials.password;
    let is_password_correct = tokio::task::spawn_blocking(move || password_hash.verify(&password))
        .await
        .map_err(|error| Error::BlockingTaskFailed(error.to_string()))?
        .map_err(|error| {
            tracing::error!("Error verifying password: {error}");
            Error::HashingError(error.to_string())
        })?;

    let user = match user {
        Some(user) if is_password_correct => user,
        _ => {
            tracing::info!("Failed log in attempt for {:?}", credentials.username);
            return Err(Error::InvalidCredentials);
        }
    };

    let token = issue_token(
        &user,
        OffsetDateTime::now_utc(),
        state.token_duration,
        state.jwt_keys.encoding_key(),
    )?;

    tracing::info!("User {} logged in", user.id);

    Ok(Json(TokenResponse { token }))
}
