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

//! API to list the ratings of a trip.

use crate::driver::Driver;
use crate::model::TripId;
use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use http::HeaderMap;
use journeyhub_authn::rest::optional_session;
use journeyhub_core::rest::{DataResponse, EmptyBody, RestError};

/// GET handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Path(id): Path<TripId>,
    headers: HeaderMap,
    _: EmptyBody,
) -> Result<impl IntoResponse, RestError> {
    let session = optional_session(driver.authn(), &headers)?;
    let ratings = driver.get_trip_ratings(id, session.map(|s| s.user_id())).await?;
    Ok(Json(DataResponse::new(ratings)))
}

#[cfg(test)]
mod tests {
    use crate::model::{RatingDraft, TripId, TripRating};
    use crate::rest::testutils::*;
    use axum::http;
    use journeyhub_core::rest::DataResponse;
    use journeyhub_core::rest::testutils::*;

    fn route(id: TripId) -> (http::Method, String) {
        (http::Method::GET, format!("/api/trips/{}/ratings", id))
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;
        let (owner, _owner_token) = context.do_test_login("owner").await;
        let (rater1, _token1) = context.do_test_login("rater1").await;
        let (rater2, _token2) = context.do_test_login("rater2").await;
        let trip = context.create_trip(owner.id(), "nice", false).await;

        let driver = context.driver().driver();
        let draft = RatingDraft { rating: 5, comment: None };
        let rating1 = driver.clone().rate_trip(rater1.id(), *trip.id(), draft).await.unwrap();
        let draft = RatingDraft { rating: 1, comment: Some("Rainy".to_owned()) };
        let rating2 = driver.rate_trip(rater2.id(), *trip.id(), draft).await.unwrap();

        let response = OneShotBuilder::new(context.into_app(), route(*trip.id()))
            .send_empty()
            .await
            .expect_json::<DataResponse<Vec<TripRating>>>()
            .await;
        assert_eq!(DataResponse::new(vec![rating1, rating2]), response);
    }

    #[tokio::test]
    async fn test_no_ratings() {
        let context = TestContext::setup().await;
        let (owner, _owner_token) = context.do_test_login("owner").await;
        let trip = context.create_trip(owner.id(), "lonely", false).await;

        let response = OneShotBuilder::new(context.into_app(), route(*trip.id()))
            .send_empty()
            .await
            .expect_json::<DataResponse<Vec<TripRating>>>()
            .await;
        assert!(response.data.is_empty());
    }

    #[tokio::test]
    async fn test_private_trip() {
        let context = TestContext::setup().await;
        let (owner, owner_token) = context.do_test_login("owner").await;
        let trip = context.create_trip(owner.id(), "secret", true).await;

        OneShotBuilder::new(context.app(), route(*trip.id()))
            .send_empty()
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("not found")
            .await;

        OneShotBuilder::new(context.app(), route(*trip.id()))
            .with_bearer_auth(owner_token.as_str())
            .send_empty()
            .await
            .expect_json::<DataResponse<Vec<TripRating>>>()
            .await;
    }

    #[tokio::test]
    async fn test_trip_not_found() {
        let context = TestContext::setup().await;

        OneShotBuilder::new(context.into_app(), route(TripId::new(77)))
            .send_empty()
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("not found")
            .await;
    }

    test_payload_must_be_empty!(TestContext::setup().await.into_app(), route(TripId::new(1)));
}
