//! Issuing and verifying the JSON Web Tokens that clients present as bearer tokens.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{
    Error,
    auth::{User, UserID},
};

/// The contents of a JSON Web Token.
///
/// Handlers behind the auth middleware receive the claims of the verified
/// token via `Extension<Claims>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// The ID of the user the token was issued to.
    pub sub: UserID,
    /// The username of the user the token was issued to.
    pub username: String,
    /// The time the token was issued as a unix timestamp.
    pub iat: i64,
    /// The expiry time of the token as a unix timestamp.
    pub exp: i64,
}

/// The keys for signing and verifying tokens, derived from a shared secret.
#[derive(Clone)]
pub struct JwtKeys {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtKeys {
    /// Derive the signing and verification keys from `secret`.
    pub fn from_secret(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// The encoding key for JWTs.
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    /// The decoding key for JWTs.
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}

/// Issue a token for `user` that is valid from `issued_at` for `duration`.
///
/// # Errors
///
/// Returns [Error::TokenCreation] if the token could not be signed.
pub fn issue_token(
    user: &User,
    issued_at: OffsetDateTime,
    duration: Duration,
    encoding_key: &EncodingKey,
) -> Result<String, Error> {
    let claims = Claims {
        sub: user.id,
        username: user.username.clone(),
        iat: issued_at.unix_timestamp(),
        exp: (issued_at + duration).unix_timestamp(),
    };

    encode(&Header::default(), &claims, encoding_key)
        .map_err(|error| Error::TokenCreation(error.to_string()))
}

/// Check the signature and expiry of `token` and return its claims.
///
/// # Errors
///
/// Returns [Error::InvalidToken] if the token is malformed, was not signed
/// with the key matching `decoding_key`, or has expired.
pub fn verify_token(token: &str, decoding_key: &DecodingKey) -> Result<Claims, Error> {
    decode::<Claims>(token, decoding_key, &Validation::default())
        .map(|token_data| token_data.claims)
        .map_err(|error| {
            tracing::debug!("Rejected token: {error}");
            Error::InvalidToken
        })
}
