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

//! The `Session` data type.

use crate::model::UserId;
use journeyhub_core::model::EmailAddress;

/// Identity of the caller as extracted from a valid access token.
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    /// Identifier of the user that owns the token.
    user_id: UserId,

    /// Email address of the user at the time the token was issued.
    email: EmailAddress,
}

impl Session {
    /// Creates a new session from its parts.
    pub(crate) fn new(user_id: UserId, email: EmailAddress) -> Self {
        Self { user_id, email }
    }

    /// Returns the identifier of the user that owns the session.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the email address recorded in the session.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }
}
