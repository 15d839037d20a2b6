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

//! Operations on the account of the calling user.

use crate::db;
use crate::driver::Driver;
use crate::model::{UserInfo, UserUpdate};
use journeyhub_authn::db as authn_db;
use journeyhub_authn::model::{Password, User, UserId, password_validator};
use journeyhub_core::db::DbError;
use journeyhub_core::driver::{DriverError, DriverResult};
use journeyhub_core::model::{EmailAddress, Username};
use log::info;
use regex::Regex;

/// Pattern that new email addresses must match on account updates.
const EMAIL_PATTERN: &str = r"^\w+([-+.']\w+)*@\w+([-.]\w+)*\.\w+([-.]\w+)*$";

/// Validates a raw email address supplied in an account update.
fn parse_new_email(raw: String) -> DriverResult<EmailAddress> {
    let re = Regex::new(EMAIL_PATTERN)
        .map_err(|e| DriverError::BackendError(format!("Invalid email pattern: {}", e)))?;
    if !re.is_match(&raw) {
        return Err(DriverError::InvalidInput("Invalid email format".to_owned()));
    }
    Ok(EmailAddress::new(raw)?)
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self { user_name: user.username().clone(), email: user.email().clone(), user_id: user.id() }
    }
}

impl Driver {
    /// Gets the public details of the account `user_id`.
    pub(crate) async fn get_user_info(self, user_id: UserId) -> DriverResult<UserInfo> {
        let user = authn_db::get_user_by_id(&mut self.db.ex().await?, user_id).await?;
        Ok(UserInfo::from(&user))
    }

    /// Applies the changes in `update` to the account `user_id`.
    ///
    /// Fields set to `None` are left untouched.  Changes are validated as a whole before any of
    /// them is persisted.
    pub(crate) async fn update_user(
        self,
        user_id: UserId,
        update: UserUpdate,
    ) -> DriverResult<UserInfo> {
        let mut tx = self.db.begin().await?;
        let mut user = authn_db::get_user_by_id(tx.ex(), user_id).await?;

        if let Some(raw_email) = update.email {
            let email = parse_new_email(raw_email)?;
            match authn_db::get_user_by_email(tx.ex(), &email).await {
                Ok(other) if other.id() != user_id => {
                    return Err(DriverError::InvalidInput("Email already in use".to_owned()));
                }
                Ok(_) | Err(DbError::NotFound) => (),
                Err(e) => return Err(e.into()),
            }
            user = user.with_email(email);
        }

        if let Some(raw_username) = update.user_name {
            let username = Username::new(raw_username)?;
            match authn_db::get_user_by_username(tx.ex(), &username).await {
                Ok(other) if other.id() != user_id => {
                    return Err(DriverError::InvalidInput("Username already taken".to_owned()));
                }
                Ok(_) | Err(DbError::NotFound) => (),
                Err(e) => return Err(e.into()),
            }
            user = user.with_username(username);
        }

        if let Some(raw_password) = update.new_password {
            let password = Password::new(raw_password)?.validate_and_hash(password_validator)?;
            user = user.with_password(password);
        }

        authn_db::update_user(tx.ex(), &user).await?;
        tx.commit().await?;

        info!("Updated account of user {}", user_id);
        Ok(UserInfo::from(&user))
    }

    /// Deletes the account `user_id` along with all the trips and ratings it owns.
    pub(crate) async fn delete_user(self, user_id: UserId) -> DriverResult<()> {
        let mut tx = self.db.begin().await?;

        authn_db::get_user_by_id(tx.ex(), user_id).await?;

        let ratings = db::delete_ratings_by_user(tx.ex(), user_id).await?;
        let trips = db::delete_trips_by_user(tx.ex(), user_id).await?;
        authn_db::delete_user(tx.ex(), user_id).await?;

        tx.commit().await?;

        info!("Deleted user {} with {} trips and {} ratings", user_id, trips, ratings);
        Ok(())
    }

    /// Checks if `password` is the current password of the account `user_id`.
    ///
    /// Unknown accounts never match.
    pub(crate) async fn verify_password(
        self,
        user_id: UserId,
        password: Password,
    ) -> DriverResult<bool> {
        let user = match authn_db::get_user_by_id(&mut self.db.ex().await?, user_id).await {
            Ok(user) => user,
            Err(DbError::NotFound) => return Ok(false),
            Err(e) => return Err(e.into()),
        };
        password.verify(user.password()).map_err(|e| DriverError::BackendError(e.to_string()))
    }
}
