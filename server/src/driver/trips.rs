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

//! Operations on the collection of trips.

use crate::db::{self, TripFilter};
use crate::driver::Driver;
use crate::model::{Page, Trip, TripDraft, TripSummary};
use journeyhub_authn::model::UserId;
use journeyhub_core::driver::DriverResult;
use log::info;

impl Driver {
    /// Creates a new trip owned by `user_id` out of `draft`.
    ///
    /// The area of the trip is resolved from its first map point before anything is persisted, so
    /// a failure of the geocoding service aborts the whole operation.
    pub(crate) async fn create_trip(self, user_id: UserId, draft: TripDraft) -> DriverResult<Trip> {
        draft.validate()?;

        let area = self.geocoder.locate(&draft.map_points[0]).await?;

        let mut tx = self.db.begin().await?;
        let trip = db::create_trip(tx.ex(), user_id, &draft, &area, self.clock.now_utc()).await?;
        tx.commit().await?;

        info!("User {} created trip {}", user_id, trip.id());
        Ok(trip)
    }

    /// Gets one `page` of the trips that are visible to everyone.
    pub(crate) async fn list_public_trips(
        self,
        page: Page,
    ) -> DriverResult<(Vec<TripSummary>, u64)> {
        let result = db::list_trips(&mut self.db.ex().await?, TripFilter::Public, page).await?;
        Ok(result)
    }

    /// Gets one `page` of the trips owned by `user_id`, including private ones.
    pub(crate) async fn list_user_trips(
        self,
        user_id: UserId,
        page: Page,
    ) -> DriverResult<(Vec<TripSummary>, u64)> {
        let result =
            db::list_trips(&mut self.db.ex().await?, TripFilter::Owner(user_id), page).await?;
        Ok(result)
    }
}
