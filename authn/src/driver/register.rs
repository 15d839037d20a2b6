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

//! Extends the driver with the `register` method.

use crate::db;
use crate::driver::{AuthnDriver, IssuedToken};
use crate::model::{Password, User, UserId, password_validator};
use journeyhub_core::db::DbError;
use journeyhub_core::driver::{DriverError, DriverResult};
use journeyhub_core::model::{EmailAddress, Username};
use log::info;

impl AuthnDriver {
    /// Creates a new account for `username` with `email` and `password`, and issues a token for
    /// it in the same way `login` does.
    ///
    /// `confirmation` must match `password`.
    pub(crate) async fn register(
        self,
        username: Username,
        email: EmailAddress,
        password: Password,
        confirmation: Password,
    ) -> DriverResult<(User, IssuedToken)> {
        let mut tx = self.db.begin().await?;

        match db::get_user_by_username(tx.ex(), &username).await {
            Ok(_) => return Err(DriverError::InvalidInput("Username already taken".to_owned())),
            Err(DbError::NotFound) => (),
            Err(e) => return Err(e.into()),
        }

        match db::get_user_by_email(tx.ex(), &email).await {
            Ok(_) => return Err(DriverError::InvalidInput("Email already in use".to_owned())),
            Err(DbError::NotFound) => (),
            Err(e) => return Err(e.into()),
        }

        if password != confirmation {
            return Err(DriverError::InvalidInput("Passwords do not match".to_owned()));
        }
        let password = password.validate_and_hash(password_validator)?;

        let user = User::new(UserId::generate(), username, email, password);
        match db::create_user(tx.ex(), &user).await {
            Ok(()) => (),
            Err(DbError::AlreadyExists) => {
                return Err(DriverError::AlreadyExists(
                    "Username or email already registered".to_owned(),
                ));
            }
            Err(e) => return Err(e.into()),
        }

        tx.commit().await?;

        let token = self.issue_token(&user)?;
        info!("Registered new user {}", user.id());
        Ok((user, token))
    }
}
