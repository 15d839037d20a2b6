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

//! Test utilities for the business layer.

use crate::db;
use crate::driver::Driver;
use crate::model::{Trip, TripDraft};
use journeyhub_authn::driver::testutils::TestContext as AuthnTestContext;
use journeyhub_authn::model::{User, UserId};
use journeyhub_core::clocks::testutils::SettableClock;
use journeyhub_core::db::{Db, Executor};
use journeyhub_core::model::Username;
use journeyhub_geo::{AreaInfo, MapPoint, MockGeocoder};
use std::sync::Arc;
use time::OffsetDateTime;

/// Coordinates known to `MockGeocoder` instances created by `TestContext::setup`.
pub(crate) const BARCELONA: (f64, f64) = (41.3874, 2.1686);

/// Coordinates that `MockGeocoder` instances created by `TestContext::setup` do not know about.
pub(crate) const NOWHERE: (f64, f64) = (-48.8767, -123.3933);

/// State of a running test.
pub(crate) struct TestContext {
    /// Context of the authentication layer, which owns the database and the clock.
    authn: AuthnTestContext,

    /// The geocoder injected into the driver.
    geocoder: MockGeocoder,

    /// The driver under test.
    driver: Driver,
}

impl TestContext {
    /// Initializes the driver using an in-memory database and a geocoder that knows `BARCELONA`.
    pub(crate) async fn setup() -> Self {
        Self::setup_with_geocoder(MockGeocoder::new(&[(BARCELONA, ("Spain", "Barcelona"))])).await
    }

    /// Initializes the driver using an in-memory database and the given `geocoder`.
    pub(crate) async fn setup_with_geocoder(geocoder: MockGeocoder) -> Self {
        let db: Arc<dyn Db + Send + Sync> =
            Arc::new(journeyhub_core::db::sqlite::testutils::setup().await);
        let clock = Arc::new(SettableClock::new(
            OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap(),
        ));
        let authn = AuthnTestContext::setup_with(db.clone(), clock.clone(), "journeyhub").await;
        db::init_schema(&mut db.ex().await.unwrap()).await.unwrap();

        let driver = Driver::new(db, Arc::new(geocoder.clone()), authn.driver(), clock);
        Self { authn, geocoder, driver }
    }

    /// Gets a copy of the driver in this test context.
    pub(crate) fn driver(&self) -> Driver {
        self.driver.clone()
    }

    /// Gets the geocoder injected into the driver.
    pub(crate) fn geocoder(&self) -> &MockGeocoder {
        &self.geocoder
    }

    /// Gets the authentication test context.
    pub(crate) fn authn(&self) -> &AuthnTestContext {
        &self.authn
    }

    /// Gets a new executor against the test database.
    pub(crate) async fn ex(&self) -> Executor {
        self.authn.db().ex().await.unwrap()
    }

    /// Returns the current time as seen by the driver.
    pub(crate) fn now(&self) -> OffsetDateTime {
        self.authn.now()
    }

    /// Creates a user named `username`.
    pub(crate) async fn create_user(&self, username: &'static str) -> User {
        self.authn.create_user(&Username::from(username)).await
    }

    /// Creates a trip owned by `user_id` directly in the database.
    pub(crate) async fn create_trip(&self, user_id: UserId, title: &str, is_private: bool) -> Trip {
        let draft = TripDraft {
            title: title.to_owned(),
            description: String::new(),
            map_points: vec![MapPoint::new(BARCELONA.0, BARCELONA.1).unwrap()],
            is_private,
        };
        let area = AreaInfo::new("Spain", "Barcelona");
        db::create_trip(&mut self.ex().await, user_id, &draft, &area, self.now()).await.unwrap()
    }
}
