// III-IV
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! REST interface for the authentication service.

use crate::driver::{AuthnDriver, IssuedToken};
use crate::model::{Session, User, UserId};
use axum::Router;
use http::HeaderMap;
use journeyhub_core::driver::DriverError;
use journeyhub_core::model::{EmailAddress, Username};
use journeyhub_core::rest::{RestError, RestResult};
#[cfg(any(test, feature = "testutils"))]
use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;

mod api_login_post;
mod api_register_post;
mod httputils;
#[cfg(test)]
mod testutils;

pub use httputils::{get_bearer_auth, has_bearer_auth};

/// Message returned by the server after a successful login or registration.
#[derive(Debug, Serialize)]
#[cfg_attr(any(test, feature = "testutils"), derive(Deserialize))]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Signed access token to use in the `Authorization` header of subsequent requests.
    pub token: String,

    /// Instant at which `token` stops being valid.
    #[serde(with = "time::serde::rfc3339")]
    pub expiration: OffsetDateTime,

    /// Email address of the user.
    pub email: EmailAddress,

    /// Name of the user.
    pub name: Username,

    /// Identifier of the user.
    pub user_id: UserId,
}

impl AuthResponse {
    /// Builds the response for `user` given a freshly `issued` token.
    fn new(user: User, issued: IssuedToken) -> Self {
        let expiration = issued.expiration();
        let token = issued.take_token().as_str().to_owned();
        Self {
            token,
            expiration,
            email: user.email().clone(),
            name: user.username().clone(),
            user_id: user.id(),
        }
    }
}

/// Creates the router for the authentication endpoints.
///
/// The `driver` is a configured instance of the `AuthnDriver` to handle accounts.
pub fn app(driver: AuthnDriver) -> Router {
    use axum::routing::post;

    Router::new()
        .route("/login", post(api_login_post::handler))
        .route("/register", post(api_register_post::handler))
        .with_state(driver)
}

/// Extracts the bearer token from `headers` and validates it with `driver`, returning the
/// session of the caller.
///
/// Any problem with the token is reported as an authentication failure so that clients know they
/// have to log in again.
pub fn require_session(driver: &AuthnDriver, headers: &HeaderMap) -> RestResult<Session> {
    let token = get_bearer_auth(headers, driver.realm())?;
    match driver.get_session(&token) {
        Ok(session) => Ok(session),
        Err(DriverError::Unauthorized(message)) => {
            Err(RestError::Unauthorized { scheme: "Bearer", realm: driver.realm(), message })
        }
        Err(e) => Err(e.into()),
    }
}

/// Same as `require_session` but returns `None` when the request carries no credentials.
pub fn optional_session(driver: &AuthnDriver, headers: &HeaderMap) -> RestResult<Option<Session>> {
    if has_bearer_auth(headers, driver.realm())? {
        require_session(driver, headers).map(Some)
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::testutils::*;
    use super::*;
    use http::{Method, StatusCode};
    use journeyhub_core::rest::testutils::*;
    use serde_json::json;
    use std::time::Duration;

    #[tokio::test]
    async fn test_e2e_register_and_login() {
        let context = TestContext::setup().await;

        let request = json!({
            "name": "traveler",
            "email": "traveler@example.com",
            "password": "Trips2024",
            "confirmPassword": "Trips2024",
        });
        let registered = OneShotBuilder::new(context.app(), (Method::POST, "/api/auth/register"))
            .send_json(request)
            .await
            .expect_json::<AuthResponse>()
            .await;
        assert_eq!(Username::from("traveler"), registered.name);

        let request = json!({"email": "traveler@example.com", "password": "wrong0password"});
        OneShotBuilder::new(context.app(), (Method::POST, "/api/auth/login"))
            .send_json(request)
            .await
            .expect_status(StatusCode::BAD_REQUEST)
            .expect_error("Invalid password")
            .await;

        let request = json!({"email": "traveler@example.com", "password": "Trips2024"});
        let logged_in = OneShotBuilder::new(context.app(), (Method::POST, "/api/auth/login"))
            .send_json(request)
            .await
            .expect_json::<AuthResponse>()
            .await;
        assert_eq!(registered.user_id, logged_in.user_id);
        assert_ne!(registered.token, logged_in.token);
    }

    #[tokio::test]
    async fn test_require_session_ok() {
        let context = TestContext::setup().await;
        let (user, token) = context.do_test_login("someone").await;

        let mut headers = HeaderMap::new();
        headers.insert("Authorization", format!("Bearer {}", token.as_str()).parse().unwrap());
        let session = require_session(&context.driver(), &headers).unwrap();
        assert_eq!(user.id(), session.user_id());
    }

    #[tokio::test]
    async fn test_require_session_missing() {
        let context = TestContext::setup().await;

        match require_session(&context.driver(), &HeaderMap::new()) {
            Err(RestError::Unauthorized { scheme, realm, message }) => {
                assert_eq!("Bearer", scheme);
                assert_eq!("the-realm", realm);
                assert!(message.contains("Missing Authorization"));
            }
            e => panic!("{:?}", e),
        }
    }

    #[tokio::test]
    async fn test_require_session_expired() {
        let context = TestContext::setup().await;
        let (_user, token) = context.do_test_login("someone").await;
        context.clock().advance(Duration::from_secs(24 * 3600));

        let mut headers = HeaderMap::new();
        headers.insert("Authorization", format!("Bearer {}", token.as_str()).parse().unwrap());
        match require_session(&context.driver(), &headers) {
            Err(RestError::Unauthorized { scheme, message, .. }) => {
                assert_eq!("Bearer", scheme);
                assert!(message.contains("expired"));
            }
            e => panic!("{:?}", e),
        }
    }

    #[tokio::test]
    async fn test_optional_session() {
        let context = TestContext::setup().await;
        let (user, token) = context.do_test_login("someone").await;

        assert_eq!(None, optional_session(&context.driver(), &HeaderMap::new()).unwrap());

        let mut headers = HeaderMap::new();
        headers.insert("Authorization", format!("Bearer {}", token.as_str()).parse().unwrap());
        let session = optional_session(&context.driver(), &headers).unwrap().unwrap();
        assert_eq!(user.id(), session.user_id());

        let mut headers = HeaderMap::new();
        headers.insert("Authorization", "Bearer not-a-token".parse().unwrap());
        optional_session(&context.driver(), &headers).unwrap_err();
    }
}
