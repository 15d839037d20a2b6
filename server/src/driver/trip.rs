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

//! Operations on one trip.

use crate::db;
use crate::driver::Driver;
use crate::model::{Trip, TripId};
use journeyhub_authn::model::UserId;
use journeyhub_core::db::{DbError, Executor};
use journeyhub_core::driver::{DriverError, DriverResult};
use log::info;

/// Fetches the trip `id` on behalf of `caller`, hiding private trips from anyone but their owner.
pub(super) async fn get_visible_trip(
    ex: &mut Executor,
    id: TripId,
    caller: Option<UserId>,
) -> DriverResult<Trip> {
    let trip = db::get_trip(ex, id).await?;
    if *trip.is_private() && caller != Some(*trip.user_id()) {
        return Err(DbError::NotFound.into());
    }
    Ok(trip)
}

impl Driver {
    /// Gets the trip with identifier `id` as seen by `caller`, which is `None` for anonymous
    /// requests.
    pub(crate) async fn get_trip(self, id: TripId, caller: Option<UserId>) -> DriverResult<Trip> {
        get_visible_trip(&mut self.db.ex().await?, id, caller).await
    }

    /// Deletes the trip with identifier `id` on behalf of `caller`, who must be its owner.
    pub(crate) async fn delete_trip(self, id: TripId, caller: UserId) -> DriverResult<()> {
        let mut tx = self.db.begin().await?;

        let trip = db::get_trip(tx.ex(), id).await?;
        if *trip.user_id() != caller {
            return Err(DriverError::Unauthorized(
                "You are not allowed to delete this trip".to_owned(),
            ));
        }

        db::delete_trip(tx.ex(), id).await?;
        tx.commit().await?;

        info!("User {} deleted trip {}", caller, id);
        Ok(())
    }
}
