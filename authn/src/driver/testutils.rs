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

//! Utilities to help testing services that integrate with the `authn` features.

use crate::db;
use crate::driver::{AuthnDriver, AuthnOptions};
use crate::model::{AccessToken, Password, User, UserId, password_validator};
use journeyhub_core::clocks::Clock;
use journeyhub_core::clocks::testutils::SettableClock;
use journeyhub_core::db::Db;
use journeyhub_core::model::{EmailAddress, Username};
use std::sync::Arc;
use time::OffsetDateTime;

/// Password assigned to all users created via this module.
pub const TEST_PASSWORD: &str = "test0password";

/// Secret used to sign tokens in tests.
pub const TEST_JWT_SECRET: &str = "the-test-secret";

/// State of a running test.
pub struct TestContext {
    /// The clock used by the driver, which tests can manipulate.
    pub clock: Arc<SettableClock>,

    /// The driver to handle authentication flows.
    driver: AuthnDriver,
}

impl TestContext {
    /// Initializes the driver using an in-memory database and a settable clock.
    #[cfg(test)]
    pub(crate) async fn setup() -> Self {
        let db = Arc::new(journeyhub_core::db::sqlite::testutils::setup().await);
        let clock = Arc::new(SettableClock::new(
            OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap(),
        ));
        Self::setup_with(db, clock, "the-realm").await
    }

    /// Initializes the test context using the given already-initialized objects.
    pub async fn setup_with(
        db: Arc<dyn Db + Send + Sync>,
        clock: Arc<SettableClock>,
        realm: &'static str,
    ) -> Self {
        db::init_schema(&mut db.ex().await.unwrap()).await.unwrap();
        let driver = AuthnDriver::new(db, clock.clone(), realm, AuthnOptions::new(TEST_JWT_SECRET));
        TestContext { clock, driver }
    }

    /// Gets a copy of the driver in this test context.
    pub fn driver(&self) -> AuthnDriver {
        self.driver.clone()
    }

    /// Gets access to the database used by this test context.
    pub fn db(&self) -> &(dyn Db + Send + Sync) {
        self.driver.db.as_ref()
    }

    /// Returns the current time as seen by the driver.
    pub fn now(&self) -> OffsetDateTime {
        self.clock.now_utc()
    }

    /// Syntactic sugar to create a user for testing purposes.
    ///
    /// The user gets an email address derived from its name and the `TEST_PASSWORD`.
    pub async fn create_user(&self, username: &Username) -> User {
        let email = EmailAddress::new(format!("{}@example.com", username.as_str())).unwrap();
        let password = Password::from(TEST_PASSWORD).validate_and_hash(password_validator).unwrap();
        let user = User::new(UserId::generate(), username.clone(), email, password);
        db::create_user(&mut self.db().ex().await.unwrap(), &user).await.unwrap();
        user
    }

    /// Syntactic sugar to create a user and obtain a valid access token for it.
    pub async fn do_test_login(&self, username: &Username) -> (User, AccessToken) {
        let user = self.create_user(username).await;
        let token = self.driver.issue_token(&user).unwrap().take_token();
        (user, token)
    }

    /// Checks if a user exists.
    pub async fn user_exists(&self, id: UserId) -> bool {
        db::get_user_by_id(&mut self.db().ex().await.unwrap(), id).await.is_ok()
    }
}
