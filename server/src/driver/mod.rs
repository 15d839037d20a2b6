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

//! Business logic for the service.

use journeyhub_authn::driver::AuthnDriver;
use journeyhub_core::clocks::Clock;
use journeyhub_core::db::Db;
use journeyhub_geo::ReverseGeocoder;
use std::sync::Arc;

mod ratings;
#[cfg(test)]
pub(crate) mod testutils;
mod trip;
mod trips;
mod users;

/// Business logic.
///
/// The public operations exposed by the driver are all "one shot": they start and commit a
/// transaction, so it's incorrect for the caller to use two separate calls.  For this reason,
/// these operations consume the driver in an attempt to minimize the possibility of executing
/// two operations.
#[derive(Clone)]
pub(crate) struct Driver {
    /// The database that the driver uses for persistence.
    db: Arc<dyn Db + Send + Sync>,

    /// Service to resolve the area of a trip from its coordinates.
    geocoder: Arc<dyn ReverseGeocoder + Send + Sync>,

    /// Authentication driver, used to validate the sessions of incoming requests.
    authn: AuthnDriver,

    /// Clock instance to obtain the current time.
    clock: Arc<dyn Clock + Send + Sync>,
}

impl Driver {
    /// Creates a new driver backed by the given injected components.
    pub(crate) fn new(
        db: Arc<dyn Db + Send + Sync>,
        geocoder: Arc<dyn ReverseGeocoder + Send + Sync>,
        authn: AuthnDriver,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self { db, geocoder, authn, clock }
    }

    /// Gets a reference to the authentication driver.
    pub(crate) fn authn(&self) -> &AuthnDriver {
        &self.authn
    }
}
