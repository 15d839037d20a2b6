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

//! API to rate a trip.

use crate::driver::Driver;
use crate::model::{RatingDraft, TripId};
use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use http::{HeaderMap, StatusCode};
use journeyhub_authn::rest::require_session;
use journeyhub_core::rest::{DataResponse, JsonBody, RestError};

/// POST handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Path(id): Path<TripId>,
    headers: HeaderMap,
    JsonBody(draft): JsonBody<RatingDraft>,
) -> Result<impl IntoResponse, RestError> {
    let session = require_session(driver.authn(), &headers)?;
    let rating = driver.rate_trip(session.user_id(), id, draft).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(rating))))
}

#[cfg(test)]
mod tests {
    use crate::model::{TripId, TripRating};
    use crate::rest::testutils::*;
    use axum::http;
    use journeyhub_core::rest::DataResponse;
    use journeyhub_core::rest::testutils::*;
    use journeyhub_core::test_payload_must_be_json;
    use serde_json::json;

    fn route(id: TripId) -> (http::Method, String) {
        (http::Method::POST, format!("/api/trips/{}/ratings", id))
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;
        let (owner, _owner_token) = context.do_test_login("owner").await;
        let (rater, rater_token) = context.do_test_login("rater").await;
        let trip = context.create_trip(owner.id(), "nice", false).await;

        let response = OneShotBuilder::new(context.app(), route(*trip.id()))
            .with_bearer_auth(rater_token.as_str())
            .send_json(json!({"rating": 4, "comment": "Great food"}))
            .await
            .expect_status(http::StatusCode::CREATED)
            .expect_json::<DataResponse<TripRating>>()
            .await;
        let rating = response.data;
        assert_eq!(&rater.id(), rating.user_id());
        assert_eq!(trip.id(), rating.trip_id());
        assert_eq!(4, rating.rating().as_i16());
        assert_eq!(&Some("Great food".to_owned()), rating.comment());

        let ratings =
            context.driver().driver().get_trip_ratings(*trip.id(), None).await.unwrap();
        assert_eq!(vec![rating], ratings);
    }

    #[tokio::test]
    async fn test_out_of_range() {
        let context = TestContext::setup().await;
        let (owner, _owner_token) = context.do_test_login("owner").await;
        let (_rater, rater_token) = context.do_test_login("rater").await;
        let trip = context.create_trip(owner.id(), "nice", false).await;

        for rating in [0, 6, -3] {
            OneShotBuilder::new(context.app(), route(*trip.id()))
                .with_bearer_auth(rater_token.as_str())
                .send_json(json!({"rating": rating}))
                .await
                .expect_status(http::StatusCode::BAD_REQUEST)
                .expect_error("Rating must be between 1 and 5")
                .await;
        }

        let ratings =
            context.driver().driver().get_trip_ratings(*trip.id(), None).await.unwrap();
        assert!(ratings.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate() {
        let context = TestContext::setup().await;
        let (owner, _owner_token) = context.do_test_login("owner").await;
        let (_rater, rater_token) = context.do_test_login("rater").await;
        let trip = context.create_trip(owner.id(), "nice", false).await;

        OneShotBuilder::new(context.app(), route(*trip.id()))
            .with_bearer_auth(rater_token.as_str())
            .send_json(json!({"rating": 2}))
            .await
            .expect_status(http::StatusCode::CREATED)
            .expect_json::<DataResponse<TripRating>>()
            .await;

        OneShotBuilder::new(context.app(), route(*trip.id()))
            .with_bearer_auth(rater_token.as_str())
            .send_json(json!({"rating": 5}))
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("User has already rated this trip")
            .await;

        let ratings =
            context.driver().driver().get_trip_ratings(*trip.id(), None).await.unwrap();
        assert_eq!(1, ratings.len());
        assert_eq!(2, ratings[0].rating().as_i16());
    }

    #[tokio::test]
    async fn test_trip_not_found() {
        let context = TestContext::setup().await;
        let (_rater, rater_token) = context.do_test_login("rater").await;

        OneShotBuilder::new(context.into_app(), route(TripId::new(5)))
            .with_bearer_auth(rater_token.as_str())
            .send_json(json!({"rating": 3}))
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("not found")
            .await;
    }

    #[tokio::test]
    async fn test_no_auth() {
        let context = TestContext::setup().await;
        let (owner, _owner_token) = context.do_test_login("owner").await;
        let trip = context.create_trip(owner.id(), "nice", false).await;

        OneShotBuilder::new(context.into_app(), route(*trip.id()))
            .send_json(json!({"rating": 3}))
            .await
            .expect_status(http::StatusCode::UNAUTHORIZED)
            .expect_error("Missing Authorization header")
            .await;
    }

    test_payload_must_be_json!(TestContext::setup().await.into_app(), route(TripId::new(1)));
}
