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

//! API to update the caller's account.

use crate::driver::Driver;
use crate::model::UserUpdate;
use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use http::HeaderMap;
use journeyhub_authn::rest::require_session;
use journeyhub_core::rest::{DataResponse, JsonBody, RestError};

/// PUT handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    headers: HeaderMap,
    JsonBody(update): JsonBody<UserUpdate>,
) -> Result<impl IntoResponse, RestError> {
    let session = require_session(driver.authn(), &headers)?;
    let info = driver.update_user(session.user_id(), update).await?;
    Ok(Json(DataResponse::new(info)))
}

#[cfg(test)]
mod tests {
    use crate::model::{UserInfo, UserUpdate};
    use crate::rest::testutils::*;
    use axum::http;
    use journeyhub_authn::model::Password;
    use journeyhub_core::model::{EmailAddress, Username};
    use journeyhub_core::rest::DataResponse;
    use journeyhub_core::rest::testutils::*;
    use journeyhub_core::test_payload_must_be_json;
    use serde_json::json;

    fn route() -> (http::Method, String) {
        (http::Method::PUT, "/api/users".to_owned())
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;
        let (user, token) = context.do_test_login("before").await;

        let request = json!({
            "email": "new.address@example.net",
            "userName": "after",
            "newPassword": "fresh0password",
        });
        let response = OneShotBuilder::new(context.app(), route())
            .with_bearer_auth(token.as_str())
            .send_json(request)
            .await
            .expect_json::<DataResponse<UserInfo>>()
            .await;
        assert_eq!(
            UserInfo {
                user_name: Username::from("after"),
                email: EmailAddress::from("new.address@example.net"),
                user_id: user.id(),
            },
            response.data
        );

        let driver = context.driver().driver();
        let password = Password::from("fresh0password");
        assert!(driver.verify_password(user.id(), password).await.unwrap());
    }

    #[tokio::test]
    async fn test_partial_update() {
        let context = TestContext::setup().await;
        let (user, token) = context.do_test_login("someone").await;

        let request = UserUpdate { user_name: Some("renamed".to_owned()), ..Default::default() };
        let response = OneShotBuilder::new(context.into_app(), route())
            .with_bearer_auth(token.as_str())
            .send_json(request)
            .await
            .expect_json::<DataResponse<UserInfo>>()
            .await;
        assert_eq!(Username::from("renamed"), response.data.user_name);
        assert_eq!(user.email(), &response.data.email);
    }

    #[tokio::test]
    async fn test_invalid_email() {
        let context = TestContext::setup().await;
        let (_user, token) = context.do_test_login("someone").await;

        OneShotBuilder::new(context.into_app(), route())
            .with_bearer_auth(token.as_str())
            .send_json(json!({"email": "not-an-email"}))
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("Invalid email format")
            .await;
    }

    #[tokio::test]
    async fn test_username_taken() {
        let context = TestContext::setup().await;
        let (_user, token) = context.do_test_login("someone").await;
        context.do_test_login("taken").await;

        OneShotBuilder::new(context.into_app(), route())
            .with_bearer_auth(token.as_str())
            .send_json(json!({"userName": "taken"}))
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("Username already taken")
            .await;
    }

    #[tokio::test]
    async fn test_no_auth() {
        let context = TestContext::setup().await;

        OneShotBuilder::new(context.into_app(), route())
            .send_json(json!({"userName": "anyone"}))
            .await
            .expect_status(http::StatusCode::UNAUTHORIZED)
            .expect_error("Missing Authorization header")
            .await;
    }

    test_payload_must_be_json!(TestContext::setup().await.into_app(), route());
}
