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

//! API to check the password of the caller's account.

use crate::driver::Driver;
use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use http::HeaderMap;
use journeyhub_authn::model::Password;
use journeyhub_authn::rest::require_session;
use journeyhub_core::rest::{DataResponse, JsonBody, RestError};
use serde::Deserialize;
#[cfg(test)]
use serde::Serialize;

/// Message sent to the server to check a password.
#[derive(Deserialize)]
#[cfg_attr(test, derive(Serialize))]
pub(crate) struct VerifyPasswordRequest {
    /// The password to check.
    pub(crate) password: Password,
}

/// POST handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    headers: HeaderMap,
    JsonBody(request): JsonBody<VerifyPasswordRequest>,
) -> Result<impl IntoResponse, RestError> {
    let session = require_session(driver.authn(), &headers)?;
    let matches = driver.verify_password(session.user_id(), request.password).await?;
    Ok(Json(DataResponse::new(matches)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::testutils::*;
    use journeyhub_authn::driver::testutils::TEST_PASSWORD;
    use journeyhub_core::rest::testutils::OneShotBuilder;
    use journeyhub_core::test_payload_must_be_json;

    fn route() -> (http::Method, String) {
        (http::Method::POST, "/api/users/verify-password".to_owned())
    }

    #[tokio::test]
    async fn test_match() {
        let context = TestContext::setup().await;
        let (_user, token) = context.do_test_login("someone").await;

        let request = VerifyPasswordRequest { password: Password::from(TEST_PASSWORD) };
        let response = OneShotBuilder::new(context.into_app(), route())
            .with_bearer_auth(token.as_str())
            .send_json(request)
            .await
            .expect_json::<DataResponse<bool>>()
            .await;
        assert!(response.data);
    }

    #[tokio::test]
    async fn test_mismatch() {
        let context = TestContext::setup().await;
        let (_user, token) = context.do_test_login("someone").await;

        let request = VerifyPasswordRequest { password: Password::from("guess1234") };
        let response = OneShotBuilder::new(context.into_app(), route())
            .with_bearer_auth(token.as_str())
            .send_json(request)
            .await
            .expect_json::<DataResponse<bool>>()
            .await;
        assert!(!response.data);
    }

    #[tokio::test]
    async fn test_deleted_user() {
        let context = TestContext::setup().await;
        let (user, token) = context.do_test_login("ghost").await;
        context.driver().driver().delete_user(user.id()).await.unwrap();

        let request = VerifyPasswordRequest { password: Password::from(TEST_PASSWORD) };
        let response = OneShotBuilder::new(context.into_app(), route())
            .with_bearer_auth(token.as_str())
            .send_json(request)
            .await
            .expect_json::<DataResponse<bool>>()
            .await;
        assert!(!response.data);
    }

    #[tokio::test]
    async fn test_no_auth() {
        let context = TestContext::setup().await;

        let request = VerifyPasswordRequest { password: Password::from(TEST_PASSWORD) };
        OneShotBuilder::new(context.into_app(), route())
            .send_json(request)
            .await
            .expect_status(http::StatusCode::UNAUTHORIZED)
            .expect_error("Missing Authorization header")
            .await;
    }

    test_payload_must_be_json!(TestContext::setup().await.into_app(), route());
}
