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

//! The `User` and `UserId` data types.

use crate::model::HashedPassword;
use journeyhub_core::model::{EmailAddress, ModelError, ModelResult, Username};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque identifier of a user account.
///
/// Identifiers are random and are handed out to clients as part of their tokens, so they never
/// reveal anything about the account they belong to.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Generates a new random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses an identifier from its textual representation.
    pub fn parse(s: &str) -> ModelResult<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| ModelError(format!("Invalid user identifier '{}': {}", s, e)))
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Representation of a user's account.
#[derive(Clone, Debug, PartialEq)]
pub struct User {
    /// Identifier of the user.
    id: UserId,

    /// Name of the user.  Unique across all accounts.
    username: Username,

    /// Email of the user.  Unique across all accounts and used to log in.
    email: EmailAddress,

    /// Hashed password.
    password: HashedPassword,
}

impl User {
    /// Creates a new user with the given fields.
    pub fn new(
        id: UserId,
        username: Username,
        email: EmailAddress,
        password: HashedPassword,
    ) -> Self {
        Self { id, username, email, password }
    }

    /// Modifies a user to change its username.
    pub fn with_username(mut self, username: Username) -> Self {
        self.username = username;
        self
    }

    /// Modifies a user to change its email address.
    pub fn with_email(mut self, email: EmailAddress) -> Self {
        self.email = email;
        self
    }

    /// Modifies a user to change its password.
    pub fn with_password(mut self, password: HashedPassword) -> Self {
        self.password = password;
        self
    }

    /// Gets the user's identifier.
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Gets the user's username.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Gets the user's email address.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Gets the user's password as a hash.
    pub fn password(&self) -> &HashedPassword {
        &self.password
    }
}
