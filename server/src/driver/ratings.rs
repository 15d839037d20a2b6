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

//! Operations on the ratings of a trip.

use crate::db;
use crate::driver::Driver;
use crate::driver::trip::get_visible_trip;
use crate::model::{RatingDraft, TripId, TripRating};
use journeyhub_authn::model::UserId;
use journeyhub_core::db::DbError;
use journeyhub_core::driver::{DriverError, DriverResult};
use log::info;

impl Driver {
    /// Records the rating in `draft` given by `user_id` to the trip `trip_id`.
    ///
    /// Users can rate a trip only once.
    pub(crate) async fn rate_trip(
        self,
        user_id: UserId,
        trip_id: TripId,
        draft: RatingDraft,
    ) -> DriverResult<TripRating> {
        let (score, comment) = draft.validate()?;

        let mut tx = self.db.begin().await?;
        get_visible_trip(tx.ex(), trip_id, Some(user_id)).await?;
        let rating = match db::create_rating(tx.ex(), user_id, trip_id, score, comment).await {
            Ok(rating) => rating,
            Err(DbError::AlreadyExists) => {
                return Err(DriverError::AlreadyExists(
                    "User has already rated this trip".to_owned(),
                ));
            }
            Err(e) => return Err(e.into()),
        };
        tx.commit().await?;

        info!("User {} rated trip {}", user_id, trip_id);
        Ok(rating)
    }

    /// Gets all ratings of the trip `trip_id` as seen by `caller`.
    pub(crate) async fn get_trip_ratings(
        self,
        trip_id: TripId,
        caller: Option<UserId>,
    ) -> DriverResult<Vec<TripRating>> {
        let mut ex = self.db.ex().await?;
        get_visible_trip(&mut ex, trip_id, caller).await?;
        let ratings = db::get_ratings(&mut ex, trip_id).await?;
        Ok(ratings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::testutils::*;

    /// Creates a rating draft.
    fn draft(rating: i64, comment: Option<&str>) -> RatingDraft {
        RatingDraft { rating, comment: comment.map(str::to_owned) }
    }

    #[tokio::test]
    async fn test_rate_trip_ok() {
        let context = TestContext::setup().await;
        let owner = context.create_user("owner").await;
        let rater = context.create_user("rater").await;
        let trip = context.create_trip(owner.id(), "nice", false).await;

        let rating = context
            .driver()
            .rate_trip(rater.id(), *trip.id(), draft(5, Some("Loved it")))
            .await
            .unwrap();
        assert_eq!(&rater.id(), rating.user_id());
        assert_eq!(trip.id(), rating.trip_id());
        assert_eq!(5, rating.rating().as_i16());
        assert_eq!(&Some("Loved it".to_owned()), rating.comment());

        let ratings = db::get_ratings(&mut context.ex().await, *trip.id()).await.unwrap();
        assert_eq!(vec![rating], ratings);
    }

    #[tokio::test]
    async fn test_rate_trip_out_of_range() {
        let context = TestContext::setup().await;
        let owner = context.create_user("owner").await;
        let rater = context.create_user("rater").await;
        let trip = context.create_trip(owner.id(), "nice", false).await;

        for rating in [-1, 0, 6, 300] {
            assert_eq!(
                DriverError::InvalidInput("Rating must be between 1 and 5".to_owned()),
                context
                    .driver()
                    .rate_trip(rater.id(), *trip.id(), draft(rating, None))
                    .await
                    .unwrap_err()
            );
        }

        assert!(db::get_ratings(&mut context.ex().await, *trip.id()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rate_trip_twice() {
        let context = TestContext::setup().await;
        let owner = context.create_user("owner").await;
        let rater = context.create_user("rater").await;
        let trip = context.create_trip(owner.id(), "nice", false).await;

        context.driver().rate_trip(rater.id(), *trip.id(), draft(3, None)).await.unwrap();
        assert_eq!(
            DriverError::AlreadyExists("User has already rated this trip".to_owned()),
            context.driver().rate_trip(rater.id(), *trip.id(), draft(4, None)).await.unwrap_err()
        );

        let ratings = db::get_ratings(&mut context.ex().await, *trip.id()).await.unwrap();
        assert_eq!(1, ratings.len());
        assert_eq!(3, ratings[0].rating().as_i16());
    }

    #[tokio::test]
    async fn test_rate_trip_not_found() {
        let context = TestContext::setup().await;
        let rater = context.create_user("rater").await;

        assert_eq!(
            DriverError::NotFound("Entity not found".to_owned()),
            context
                .driver()
                .rate_trip(rater.id(), TripId::new(1), draft(3, None))
                .await
                .unwrap_err()
        );
    }

    #[tokio::test]
    async fn test_rate_trip_private_of_other_user() {
        let context = TestContext::setup().await;
        let owner = context.create_user("owner").await;
        let rater = context.create_user("rater").await;
        let trip = context.create_trip(owner.id(), "secret", true).await;

        assert_eq!(
            DriverError::NotFound("Entity not found".to_owned()),
            context.driver().rate_trip(rater.id(), *trip.id(), draft(3, None)).await.unwrap_err()
        );
        context.driver().rate_trip(owner.id(), *trip.id(), draft(1, None)).await.unwrap();
    }

    #[tokio::test]
    async fn test_get_trip_ratings() {
        let context = TestContext::setup().await;
        let owner = context.create_user("owner").await;
        let rater1 = context.create_user("rater1").await;
        let rater2 = context.create_user("rater2").await;
        let trip = context.create_trip(owner.id(), "nice", false).await;
        let other = context.create_trip(owner.id(), "other", false).await;

        let rating1 =
            context.driver().rate_trip(rater1.id(), *trip.id(), draft(2, None)).await.unwrap();
        context.driver().rate_trip(rater1.id(), *other.id(), draft(5, None)).await.unwrap();
        let rating2 = context
            .driver()
            .rate_trip(rater2.id(), *trip.id(), draft(4, Some("ok")))
            .await
            .unwrap();

        assert_eq!(
            vec![rating1, rating2],
            context.driver().get_trip_ratings(*trip.id(), None).await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_get_trip_ratings_hidden_trip() {
        let context = TestContext::setup().await;
        let owner = context.create_user("owner").await;
        let trip = context.create_trip(owner.id(), "secret", true).await;

        assert_eq!(
            DriverError::NotFound("Entity not found".to_owned()),
            context.driver().get_trip_ratings(*trip.id(), None).await.unwrap_err()
        );
        let ratings =
            context.driver().get_trip_ratings(*trip.id(), Some(owner.id())).await.unwrap();
        assert!(ratings.is_empty());
    }
}
