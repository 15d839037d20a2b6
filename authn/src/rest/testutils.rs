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

//! Utilities to test the REST layer of the authentication service.

use crate::driver::AuthnDriver;
use crate::driver::testutils::TestContext as DriverTestContext;
use crate::model::{AccessToken, User};
use crate::rest::app;
use axum::Router;
use journeyhub_core::clocks::testutils::SettableClock;
use journeyhub_core::model::Username;

/// State of a running test.
pub(crate) struct TestContext {
    /// Context of the driver layer, which gives access to the database and clock.
    driver: DriverTestContext,

    /// The router under test, serving the authentication endpoints under `/api/auth`.
    app: Router,
}

impl TestContext {
    /// Initializes a new test context with an in-memory database.
    pub(crate) async fn setup() -> Self {
        let driver = DriverTestContext::setup().await;
        let app = Router::new().nest("/api/auth", app(driver.driver()));
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

    /// Gets a copy of the driver in this test context.
    pub(crate) fn driver(&self) -> AuthnDriver {
        self.driver.driver()
    }

    /// Gets the clock used by the driver.
    pub(crate) fn clock(&self) -> &SettableClock {
        &self.driver.clock
    }

    /// Creates a user named `username` and returns it along with a valid access token.
    pub(crate) async fn do_test_login(&self, username: &'static str) -> (User, AccessToken) {
        self.driver.do_test_login(&Username::from(username)).await
    }

    /// Creates a user named `username` with the default test password.
    pub(crate) async fn create_user(&self, username: &'static str) -> User {
        self.driver.create_user(&Username::from(username)).await
    }
}
