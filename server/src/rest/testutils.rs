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

//! Test utilities for the REST API.

use crate::driver::testutils::TestContext as DriverTestContext;
use crate::model::Trip;
use crate::rest::app;
use axum::Router;
use journeyhub_authn::model::{AccessToken, User, UserId};
use journeyhub_core::model::Username;
use journeyhub_geo::MockGeocoder;

/// State of a running test.
pub(crate) struct TestContext {
    /// Context of the driver layer, which gives access to the database and the geocoder.
    driver: DriverTestContext,

    /// The router under test.
    app: Router,
}

impl TestContext {
    /// Initializes a new test context with an in-memory database and a mock geocoder.
    pub(crate) async fn setup() -> Self {
        Self::from_driver(DriverTestContext::setup().await)
    }

    /// Initializes a new test context with an in-memory database and the given `geocoder`.
    pub(crate) async fn setup_with_geocoder(geocoder: MockGeocoder) -> Self {
        Self::from_driver(DriverTestContext::setup_with_geocoder(geocoder).await)
    }

    /// Wraps an already-initialized driver context.
    fn from_driver(driver: DriverTestContext) -> Self {
        let app = app(driver.driver());
        Self { driver, app }
    }

    /// Gets a clone of the app router.
    pub(crate) fn app(&self) -> Router {
        self.app.clone()
    }

    /// Consumes the context and transforms it into the app router.
    pub(crate) fn into_app(self) -> Router {
        self.app
    }

    /// Gets the driver test context, for direct access to the database and the geocoder.
    pub(crate) fn driver(&self) -> &DriverTestContext {
        &self.driver
    }

    /// Creates a user named `username` and returns it along with a valid access token.
    pub(crate) async fn do_test_login(&self, username: &'static str) -> (User, AccessToken) {
        self.driver.authn().do_test_login(&Username::from(username)).await
    }

    /// Creates a trip owned by `user_id` directly in the database.
    pub(crate) async fn create_trip(&self, user_id: UserId, title: &str, is_private: bool) -> Trip {
        self.driver.create_trip(user_id, title, is_private).await
    }
}
