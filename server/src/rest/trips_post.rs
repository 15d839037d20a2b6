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

//! API to create a new trip.

use crate::driver::Driver;
use crate::model::TripDraft;
use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use http::{HeaderMap, StatusCode};
use journeyhub_authn::rest::require_session;
use journeyhub_core::rest::{DataResponse, JsonBody, RestError};

/// POST handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    headers: HeaderMap,
    JsonBody(draft): JsonBody<TripDraft>,
) -> Result<impl IntoResponse, RestError> {
    let session = require_session(driver.authn(), &headers)?;
    let trip = driver.create_trip(session.user_id(), draft).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(trip))))
}
