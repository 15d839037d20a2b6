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

//! API to list the trips that are visible to everyone.

use crate::driver::Driver;
use crate::model::{Page, PageQuery};
use axum::Json;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use journeyhub_core::rest::{EmptyBody, PagedResponse, RestError};

/// GET handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Query(query): Query<PageQuery>,
    _: EmptyBody,
) -> Result<impl IntoResponse, RestError> {
    let page = Page::try_from(query)?;
    let (trips, total) = driver.list_public_trips(page).await?;
    Ok(Json(PagedResponse::new(trips, page.number(), page.size(), total)))
}

#[cfg(test)]
mod tests {
    use crate::model::{PageQuery, TripSummary};
    use crate::rest::testutils::*;
    use axum::http;
    use journeyhub_core::rest::PagedResponse;
    use journeyhub_core::rest::testutils::*;

    fn route() -> (http::Method, String) {
        (http::Method::GET, "/api/trips".to_owned())
    }

    #[tokio::test]
    async fn test_defaults() {
        let context = TestContext::setup().await;
        let (user, _token) = context.do_test_login("traveler").await;
        let trip1 = context.create_trip(user.id(), "first", false).await;
        context.create_trip(user.id(), "hidden", true).await;
        let trip2 = context.create_trip(user.id(), "second", false).await;

        let response = OneShotBuilder::new(context.into_app(), route())
            .send_empty()
            .await
            .expect_json::<PagedResponse<TripSummary>>()
            .await;
        assert_eq!(
            PagedResponse::new(vec![TripSummary::from(trip1), TripSummary::from(trip2)], 1, 10, 2),
            response
        );
    }

    #[tokio::test]
    async fn test_second_page() {
        let context = TestContext::setup().await;
        let (user, _token) = context.do_test_login("prolific").await;
        let mut all = vec![];
        for i in 0..25 {
            let trip = context.create_trip(user.id(), &format!("trip {}", i), false).await;
            all.push(TripSummary::from(trip));
        }

        let query = PageQuery { page_number: Some(2), page_size: Some(10) };
        let response = OneShotBuilder::new(context.into_app(), route())
            .with_query(query)
            .send_empty()
            .await
            .expect_json::<PagedResponse<TripSummary>>()
            .await;
        assert_eq!(&all[10..20], response.data.as_slice());
        assert_eq!(2, response.current_page);
        assert_eq!(3, response.total_pages);
        assert_eq!(10, response.page_size);
        assert_eq!(25, response.total_count);
    }

    #[tokio::test]
    async fn test_camel_case_fields() {
        let context = TestContext::setup().await;
        let (user, _token) = context.do_test_login("traveler").await;
        context.create_trip(user.id(), "first", false).await;

        let response = OneShotBuilder::new(context.into_app(), route())
            .send_empty()
            .await
            .expect_json::<serde_json::Value>()
            .await;
        for field in ["data", "currentPage", "totalPages", "pageSize", "totalCount"] {
            assert!(response.get(field).is_some(), "Missing field {}", field);
        }
        let trip = &response["data"][0];
        for field in ["id", "userId", "title", "area", "isPrivate", "createdAt"] {
            assert!(trip.get(field).is_some(), "Missing trip field {}", field);
        }
        assert!(trip.get("mapPoints").is_none());
    }

    #[tokio::test]
    async fn test_bad_page_bounds() {
        for (page_number, page_size, error) in [
            (Some(0), None, "Page number must be at least 1"),
            (None, Some(0), "Page size must be between 1 and 100"),
            (None, Some(101), "Page size must be between 1 and 100"),
        ] {
            let context = TestContext::setup().await;
            OneShotBuilder::new(context.into_app(), route())
                .with_query(PageQuery { page_number, page_size })
                .send_empty()
                .await
                .expect_status(http::StatusCode::BAD_REQUEST)
                .expect_error(error)
                .await;
        }
    }

    test_payload_must_be_empty!(TestContext::setup().await.into_app(), route());
}
