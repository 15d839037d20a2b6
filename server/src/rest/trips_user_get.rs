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

//! API to list the trips owned by the caller.

use crate::driver::Driver;
use crate::model::{Page, PageQuery};
use axum::Json;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use http::HeaderMap;
use journeyhub_authn::rest::require_session;
use journeyhub_core::rest::{EmptyBody, PagedResponse, RestError};

/// GET handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Query(query): Query<PageQuery>,
    headers: HeaderMap,
    _: EmptyBody,
) -> Result<impl IntoResponse, RestError> {
    let session = require_session(driver.authn(), &headers)?;
    let page = Page::try_from(query)?;
    let (trips, total) = driver.list_user_trips(session.user_id(), page).await?;
    Ok(Json(PagedResponse::new(trips, page.number(), page.size(), total)))
}
