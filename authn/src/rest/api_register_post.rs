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

//! API to create a new user account.

use crate::driver::AuthnDriver;
use crate::model::Password;
use crate::rest::AuthResponse;
use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use journeyhub_core::model::{EmailAddress, Username};
use journeyhub_core::rest::{JsonBody, RestError};
use serde::Deserialize;
#[cfg(test)]
use serde::Serialize;

/// Message sent to the server to create a new account.
#[derive(Deserialize)]
#[cfg_attr(test, derive(Serialize))]
#[serde(rename_all = "camelCase")]
pub(crate) struct RegisterRequest {
    /// Desired name for the account.
    pub(crate) name: Username,

    /// Email address for the account.
    pub(crate) email: EmailAddress,

    /// Desired password.
    pub(crate) password: Password,

    /// Repetition of `password` to catch typos.
    pub(crate) confirm_password: Password,
}

/// POST handler for this API.
pub(crate) async fn handler(
    State(driver): State<AuthnDriver>,
    JsonBody(request): JsonBody<RegisterRequest>,
) -> Result<impl IntoResponse, RestError> {
    let (user, token) = driver
        .register(request.name, request.email, request.password, request.confirm_password)
        .await?;
    Ok(Json(AuthResponse::new(user, token)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::testutils::*;
    use axum::http;
    use journeyhub_core::clocks::Clock;
    use journeyhub_core::rest::testutils::OneShotBuilder;
    use journeyhub_core::test_payload_must_be_json;
    use std::time::Duration;

    fn route() -> (http::Method, String) {
        (http::Method::POST, "/api/auth/register".to_owned())
    }

    /// Builds a registration request with matching passwords.
    fn request(name: &'static str, email: &'static str) -> RegisterRequest {
        RegisterRequest {
            name: Username::from(name),
            email: EmailAddress::from(email),
            password: Password::from("Trips2024"),
            confirm_password: Password::from("Trips2024"),
        }
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;
        let before = context.clock().now_utc();

        let response = OneShotBuilder::new(context.app(), route())
            .send_json(request("traveler", "traveler@example.com"))
            .await
            .expect_json::<AuthResponse>()
            .await;

        assert_eq!(Username::from("traveler"), response.name);
        assert_eq!(EmailAddress::from("traveler@example.com"), response.email);
        assert_eq!(before + Duration::from_secs(24 * 3600), response.expiration);

        let token = crate::model::AccessToken::new(response.token).unwrap();
        let session = context.driver().get_session(&token).unwrap();
        assert_eq!(response.user_id, session.user_id());
    }

    #[tokio::test]
    async fn test_username_taken() {
        let context = TestContext::setup().await;
        context.create_user("traveler").await;

        OneShotBuilder::new(context.app(), route())
            .send_json(request("traveler", "new@example.com"))
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("Username already taken")
            .await;
    }

    #[tokio::test]
    async fn test_email_taken() {
        let context = TestContext::setup().await;
        context.create_user("first").await;

        OneShotBuilder::new(context.app(), route())
            .send_json(request("second", "first@example.com"))
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("Email already in use")
            .await;
    }

    #[tokio::test]
    async fn test_passwords_mismatch() {
        let context = TestContext::setup().await;

        let mut request = request("traveler", "traveler@example.com");
        request.confirm_password = Password::from("Other2024");
        OneShotBuilder::new(context.app(), route())
            .send_json(request)
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("Passwords do not match")
            .await;
    }

    #[tokio::test]
    async fn test_weak_password() {
        let context = TestContext::setup().await;

        let mut request = request("traveler", "traveler@example.com");
        request.password = Password::from("short1");
        request.confirm_password = Password::from("short1");
        OneShotBuilder::new(context.app(), route())
            .send_json(request)
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("Weak password: Too short")
            .await;
    }

    #[tokio::test]
    async fn test_bad_username() {
        let context = TestContext::setup().await;

        let body = serde_json::json!({
            "name": "not valid",
            "email": "a@example.com",
            "password": "Trips2024",
            "confirmPassword": "Trips2024",
        });
        OneShotBuilder::new(context.into_app(), route())
            .send_json(body)
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("Unsupported character")
            .await;
    }

    test_payload_must_be_json!(TestContext::setup().await.into_app(), route());
}
