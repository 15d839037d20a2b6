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

//! API to log an existing user in.

use crate::driver::AuthnDriver;
use crate::model::Password;
use crate::rest::AuthResponse;
use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use journeyhub_core::model::EmailAddress;
use journeyhub_core::rest::{JsonBody, RestError};
use serde::Deserialize;
#[cfg(test)]
use serde::Serialize;

/// Message sent to the server to log a user in.
#[derive(Deserialize)]
#[cfg_attr(test, derive(Serialize))]
pub(crate) struct LoginRequest {
    /// Email address of the account.
    pub(crate) email: EmailAddress,

    /// Password of the account.
    pub(crate) password: Password,
}

/// POST handler for this API.
pub(crate) async fn handler(
    State(driver): State<AuthnDriver>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<impl IntoResponse, RestError> {
    let (user, token) = driver.login(request.email, request.password).await?;
    Ok(Json(AuthResponse::new(user, token)))
}
