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

//! Extends the driver with the `login` method.

use crate::db;
use crate::driver::{AuthnDriver, IssuedToken};
use crate::model::{Password, User};
use journeyhub_core::db::DbError;
use journeyhub_core::driver::{DriverError, DriverResult};
use journeyhub_core::model::EmailAddress;
use log::info;

impl AuthnDriver {
    /// Logs in the user identified by `email` with `password` and issues a new token for them.
    pub(crate) async fn login(
        self,
        email: EmailAddress,
        password: Password,
    ) -> DriverResult<(User, IssuedToken)> {
        let mut ex = self.db.ex().await?;

        let user = match db::get_user_by_email(&mut ex, &email).await {
            Ok(user) => user,
            Err(DbError::NotFound) => {
                return Err(DriverError::InvalidCredentials("Invalid email".to_owned()));
            }
            Err(e) => return Err(e.into()),
        };

        if !password.verify(user.password())? {
            return Err(DriverError::InvalidCredentials("Invalid password".to_owned()));
        }

        let token = self.issue_token(&user)?;
        info!("User {} logged in", user.id());
        Ok((user, token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::testutils::*;
    use journeyhub_core::model::Username;
    use std::time::Duration;

    #[tokio::test]
    async fn test_login_ok() {
        let context = TestContext::setup().await;
        let user = context.create_user(&Username::from("hello")).await;

        let (logged_in, token) = context
            .driver()
            .login(EmailAddress::from("hello@example.com"), Password::from(TEST_PASSWORD))
            .await
            .unwrap();
        assert_eq!(user, logged_in);
        assert_eq!(context.now() + Duration::from_secs(24 * 3600), token.expiration());

        let session = context.driver().get_session(token.token()).unwrap();
        assert_eq!(user.id(), session.user_id());
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let context = TestContext::setup().await;
        context.create_user(&Username::from("hello")).await;

        match context
            .driver()
            .login(EmailAddress::from("other@example.com"), Password::from(TEST_PASSWORD))
            .await
        {
            Err(DriverError::InvalidCredentials(msg)) => assert_eq!("Invalid email", msg),
            e => panic!("{:?}", e),
        }
    }

    #[tokio::test]
    async fn test_login_invalid_password() {
        let context = TestContext::setup().await;
        context.create_user(&Username::from("hello")).await;

        match context
            .driver()
            .login(EmailAddress::from("hello@example.com"), Password::from("wrong0password"))
            .await
        {
            Err(DriverError::InvalidCredentials(msg)) => assert_eq!("Invalid password", msg),
            e => panic!("{:?}", e),
        }
    }
}
