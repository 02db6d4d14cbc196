//! Helpers for reading the server configuration from the environment.

use std::env::{self, VarError};

/// The errors that may occur while reading the configuration.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    /// A required environment variable was not set or was empty.
    #[error("the environment variable '{0}' must be set")]
    MissingVariable(String),

    /// An environment variable could not be read, e.g. it is not valid unicode.
    #[error("could not read the environment variable '{0}': {1}")]
    UnreadableVariable(String, String),

    /// The port number could not be parsed.
    #[error("could not parse the port number '{value}' from '{key}': {reason}")]
    InvalidPort {
        /// The environment variable the port was read from.
        key: String,
        /// The text that failed to parse.
        value: String,
        /// Why the text is not a port number.
        reason: String,
    },
}

/// Read a port number from the environment variable `env_key`, using
/// `default_port` if the variable is not set.
///
/// # Errors
/// Returns a [ConfigError] if the variable cannot be read or is not a valid port number.
pub fn parse_port_or_default(env_key: &str, default_port: u16) -> Result<u16, ConfigError> {
    let port_string = match env::var(env_key) {
        Ok(string) => string,
        Err(VarError::NotPresent) => {
            tracing::debug!(
                "The environment variable '{}' was not set, using the default port {}.",
                env_key,
                default_port
            );
            return Ok(default_port);
        }
        Err(error) => {
            return Err(ConfigError::UnreadableVariable(
                env_key.to_owned(),
                error.to_string(),
            ));
        }
    };

    port_string
        .trim()
        .parse()
        .map_err(|error: std::num::ParseIntError| ConfigError::InvalidPort {
            key: env_key.to_owned(),
            value: port_string.clone(),
            reason: error.to_string(),
        })
}

/// Read the secret for signing bearer tokens from the environment variable `env_key`.
///
/// # Errors
/// Returns a [ConfigError] if the variable is not set or is empty.
pub fn get_jwt_secret(env_key: &str) -> Result<String, ConfigError> {
    match env::var(env_key) {
        Ok(secret) if !secret.is_empty() => Ok(secret),
        Ok(_) | Err(VarError::NotPresent) => Err(ConfigError::MissingVariable(env_key.to_owned())),
        Err(error) => Err(ConfigError::UnreadableVariable(
            env_key.to_owned(),
            error.to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, get_jwt_secret, parse_port_or_default};

    // Each test uses its own variable since tests run in parallel.

    #[test]
    fn port_defaults_when_unset() {
        assert_eq!(
            parse_port_or_default("TRANSACTION_TRACKER_TEST_PORT_UNSET", 4002),
            Ok(4002)
        );
    }

    #[test]
    fn port_is_read_from_environment() {
        let key = "TRANSACTION_TRACKER_TEST_PORT_SET";
        // SAFETY: no other test reads or writes this variable.
        unsafe { std::env::set_var(key, "8080") };

        assert_eq!(parse_port_or_default(key, 4002), Ok(8080));
    }

    #[test]
    fn invalid_port_is_an_error() {
        let key = "TRANSACTION_TRACKER_TEST_PORT_INVALID";
        // SAFETY: no other test reads or writes this variable.
        unsafe { std::env::set_var(key, "99999") };

        assert!(matches!(
            parse_port_or_default(key, 4002),
            Err(ConfigError::InvalidPort { .. })
        ));
    }

    #[test]
    fn secret_is_required() {
        let key = "TRANSACTION_TRACKER_TEST_SECRET_UNSET";

        assert_eq!(
            get_jwt_secret(key),
            Err(ConfigError::MissingVariable(key.to_owned()))
        );
    }

    #[test]
    fn empty_secret_is_rejected() {
        let key = "TRANSACTION_TRACKER_TEST_SECRET_EMPTY";
        // SAFETY: no other test reads or writes this variable.
        unsafe { std::env::set_var(key, "") };

        assert_eq!(
            get_jwt_secret(key),
            Err(ConfigError::MissingVariable(key.to_owned()))
        );
    }

    #[test]
    fn secret_is_read_from_environment() {
        let key = "TRANSACTION_TRACKER_TEST_SECRET_SET";
        // SAFETY: no other test reads or writes this variable.
        unsafe { std::env::set_var(key, "hunter2") };

        assert_eq!(get_jwt_secret(key), Ok("hunter2".to_owned()));
    }
}
