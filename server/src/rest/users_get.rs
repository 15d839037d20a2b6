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

//! API to get the details of the caller's account.

use crate::driver::Driver;
use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use http::HeaderMap;
use journeyhub_authn::rest::require_session;
use journeyhub_core::rest::{DataResponse, EmptyBody, RestError};

/// GET handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    headers: HeaderMap,
    _: EmptyBody,
) -> Result<impl IntoResponse, RestError> {
    let session = require_session(driver.authn(), &headers)?;
    let info = driver.get_user_info(session.user_id()).await?;
    Ok(Json(DataResponse::new(info)))
}

#[cfg(test)]
mod tests {
    use crate::model::UserInfo;
    use crate::rest::testutils::*;
    use axum::http;
    use journeyhub_core::rest::DataResponse;
    use journeyhub_core::rest::testutils::*;
    use serde_json::json;

    fn route() -> (http::Method, String) {
        (http::Method::GET, "/api/users".to_owned())
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;
        let (user, token) = context.do_test_login("someone").await;

        let response = OneShotBuilder::new(context.into_app(), route())
            .with_bearer_auth(token.as_str())
            .send_empty()
            .await
            .expect_json::<serde_json::Value>()
            .await;
        assert_eq!(
            json!({
                "data": {
                    "userName": "someone",
                    "email": "someone@example.com",
                    "userId": user.id().to_string(),
                }
            }),
            response
        );
    }

    #[tokio::test]
    async fn test_deleted_user() {
        let context = TestContext::setup().await;
        let (user, token) = context.do_test_login("ghost").await;
        context.driver().driver().delete_user(user.id()).await.unwrap();

        OneShotBuilder::new(context.into_app(), route())
            .with_bearer_auth(token.as_str())
            .send_empty()
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("not found")
            .await;
    }

    #[tokio::test]
    async fn test_typed_response() {
        let context = TestContext::setup().await;
        let (user, token) = context.do_test_login("someone").await;

        let response = OneShotBuilder::new(context.into_app(), route())
            .with_bearer_auth(token.as_str())
            .send_empty()
            .await
            .expect_json::<DataResponse<UserInfo>>()
            .await;
        assert_eq!(user.id(), response.data.user_id);
        assert_eq!(user.username(), &response.data.user_name);
    }

    #[tokio::test]
    async fn test_no_auth() {
        let context = TestContext::setup().await;

        OneShotBuilder::new(context.into_app(), route())
            .send_empty()
            .await
            .expect_status(http::StatusCode::UNAUTHORIZED)
            .expect_error("Missing Authorization header")
            .await;
    }

    test_payload_must_be_empty!(TestContext::setup().await.into_app(), route());
}
