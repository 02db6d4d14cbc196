//! Authentication middleware that checks the bearer token on protected routes.

use axum::{
    extract::{FromRef, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use jsonwebtoken::DecodingKey;

use crate::{AppState, Error, auth::token::verify_token};

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    /// The key for verifying token signatures.
    pub decoding_key: DecodingKey,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            decoding_key: state.jwt_keys.decoding_key().clone(),
        }
    }
}

/// Middleware function that checks for a valid bearer token.
///
/// The request ends here with 401 if there is no `Authorization: Bearer` header
/// and with 403 if the token fails verification. Otherwise the token's
/// [Claims](super::token::Claims) are placed into the request and the request
/// is executed normally.
///
/// **Note**: Route handlers can use the function argument `Extension(claims): Extension<Claims>` to receive the identity.
pub async fn auth_guard(
    State(state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(authorization) = request.headers().typed_get::<Authorization<Bearer>>() else {
        tracing::debug!("Request to {} is missing a bearer token", request.uri());
        return Error::MissingToken.into_response();
    };

    let claims = match verify_token(authorization.token(), &state.decoding_key) {
        Ok(claims) => claims,
        Err(error) => return error.into_response(),
    };

    request.extensions_mut().insert(claims);
    next.run(request).await
}

#[cfg(test)]
mod auth_guard_tests {
    use axum::{Extension, Router, http::StatusCode, middleware, routing::get};
    use axum_test::TestServer;
    use time::{Duration, OffsetDateTime};

    use crate::auth::{
        PasswordHash, User, UserID,
        middleware::{AuthState, auth_guard},
        token::{Claims, JwtKeys, issue_token},
    };

    const TEST_PROTECTED_ROUTE: &str = "/protected";

    async fn test_handler(Extension(claims): Extension<Claims>) -> String {
        claims.username
    }

    fn get_test_server(keys: &JwtKeys) -> TestServer {
        let state = AuthState {
            decoding_key: keys.decoding_key().clone(),
        };
        let app = Router::new()
            .route(TEST_PROTECTED_ROUTE, get(test_handler))
            .layer(middleware::from_fn_with_state(state, auth_guard));

        TestServer::try_new(app).expect("Could not create test server.")
    }

    fn get_token(keys: &JwtKeys, issued_at: OffsetDateTime) -> String {
        let user = User {
            id: UserID::new(1),
            username: "testuser".to_owned(),
            password_hash: PasswordHash::new_unchecked("hunter2"),
        };

        issue_token(&user, issued_at, Duration::hours(1), keys.encoding_key()).unwrap()
    }

    #[tokio::test]
    async fn get_protected_route_with_valid_token() {
        let keys = JwtKeys::from_secret("nafstenoas");
        let server = get_test_server(&keys);
        let token = get_token(&keys, OffsetDateTime::now_utc());

        let response = server
            .get(TEST_PROTECTED_ROUTE)
            .authorization_bearer(token)
            .await;

        response.assert_status_ok();
        response.assert_text("testuser");
    }

    #[tokio::test]
    async fn get_protected_route_with_missing_header() {
        let keys = JwtKeys::from_secret("nafstenoas");
        let server = get_test_server(&keys);

        let response = server.get(TEST_PROTECTED_ROUTE).await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        response.assert_text("");
    }

    #[tokio::test]
    async fn get_protected_route_with_other_auth_scheme() {
        let keys = JwtKeys::from_secret("nafstenoas");
        let server = get_test_server(&keys);

        server
            .get(TEST_PROTECTED_ROUTE)
            .authorization("Basic dXNlcjpwYXNz")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn get_protected_route_with_invalid_token() {
        let keys = JwtKeys::from_secret("nafstenoas");
        let server = get_test_server(&keys);

        let response = server
            .get(TEST_PROTECTED_ROUTE)
            .authorization_bearer("definitely.not.valid")
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
        response.assert_text("");
    }

    #[tokio::test]
    async fn get_protected_route_with_expired_token() {
        let keys = JwtKeys::from_secret("nafstenoas");
        let server = get_test_server(&keys);
        let token = get_token(&keys, OffsetDateTime::now_utc() - Duration::hours(2));

        server
            .get(TEST_PROTECTED_ROUTE)
            .authorization_bearer(token)
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn get_protected_route_with_token_from_other_secret() {
        let keys = JwtKeys::from_secret("nafstenoas");
        let server = get_test_server(&keys);
        let token = get_token(
            &JwtKeys::from_secret("someothersecret"),
            OffsetDateTime::now_utc(),
        );

        server
            .get(TEST_PROTECTED_ROUTE)
            .authorization_bearer(token)
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }
}
