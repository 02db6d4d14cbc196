//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use time::Duration;

use crate::{
    Error,
    auth::{JwtKeys, PasswordHash},
    db::initialize,
    pagination::PaginationConfig,
};

/// The config that controls how users are authenticated.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// How long a token is valid for after it is issued.
    pub token_duration: Duration,
    /// The bcrypt cost for hashing passwords.
    pub password_hash_cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_duration: Duration::hours(1),
            password_hash_cost: PasswordHash::DEFAULT_COST,
        }
    }
}

/// The state of the REST server.
#[derive(Clone)]
pub struct AppState {
    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,

    /// The keys for signing and verifying bearer tokens.
    pub jwt_keys: JwtKeys,

    /// The config that controls how users are authenticated.
    pub auth_config: AuthConfig,

    /// The config that controls how to page lists of transactions.
    pub pagination_config: PaginationConfig,

    /// A hash with the configured cost that log in requests for unknown
    /// usernames are verified against.
    pub dummy_password_hash: PasswordHash,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// `jwt_secret` is the shared secret for signing bearer tokens and must come from outside the
    /// program, e.g. an environment variable.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized or the dummy password cannot be
    /// hashed with the configured cost.
    pub fn new(
        db_connection: Connection,
        jwt_secret: &str,
        auth_config: AuthConfig,
        pagination_config: PaginationConfig,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        let dummy_password_hash =
            PasswordHash::new("not a real password", auth_config.password_hash_cost)?;

        Ok(Self {
            db_connection: Arc::new(Mutex::new(db_connection)),
            jwt_keys: JwtKeys::from_secret(jwt_secret),
            auth_config,
            pagination_config,
            dummy_password_hash,
        })
    }
}
