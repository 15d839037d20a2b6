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

//! The `EmailAddress` data type.

use crate::model::{ModelError, ModelResult};
use serde::{Deserialize, Deserializer, Serialize};

/// Longest address accepted for an account.
const MAX_EMAIL_CHARS: usize = 256;

/// An email address used to log in, kept as the traveler typed it.
///
/// Addresses are matched without regard to casing, so `normalized` is what lookups and
/// uniqueness checks must use.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validates the untrusted address `s`.
    ///
    /// Only obviously broken addresses are rejected here.  Endpoints that need a stricter format
    /// apply it on top.
    pub fn new<S: Into<String>>(s: S) -> ModelResult<Self> {
        let s = s.into();

        if s.trim().is_empty() {
            return Err(ModelError("Email address cannot be empty".to_owned()));
        }
        if s.chars().count() > MAX_EMAIL_CHARS {
            return Err(ModelError(format!(
                "Email address cannot be longer than {} characters",
                MAX_EMAIL_CHARS
            )));
        }

        let well_formed = match s.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.is_empty()
                    && !domain.contains('@')
                    && !s.chars().any(char::is_whitespace)
            }
            None => false,
        };
        if !well_formed {
            return Err(ModelError(format!("Email does not look like a valid address '{}'", s)));
        }

        Ok(Self(s))
    }

    /// Wraps `s` skipping validation so that tests can feed broken addresses to lower layers.
    #[cfg(any(test, feature = "testutils"))]
    pub fn new_invalid<S: Into<String>>(s: S) -> Self {
        Self(s.into())
    }

    /// Returns the address as the traveler typed it.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the case-folded key used to compare addresses.
    pub fn normalized(&self) -> String {
        self.0.to_lowercase()
    }
}

#[cfg(any(test, feature = "testutils"))]
impl From<&'static str> for EmailAddress {
    fn from(raw_email: &'static str) -> Self {
        Self::new(raw_email).expect("Hardcoded email addresses for testing must be valid")
    }
}

impl<'de> Deserialize<'de> for EmailAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        EmailAddress::new(raw).map_err(serde::de::Error::custom)
    }
}
