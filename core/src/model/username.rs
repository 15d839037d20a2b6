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

//! The `Username` data type.

use crate::model::{ModelError, ModelResult};
use serde::{Deserialize, Deserializer, Serialize};

/// Longest name a traveler can pick.
const MAX_USERNAME_CHARS: usize = 256;

/// Punctuation accepted in names in addition to ASCII letters and digits.
const USERNAME_PUNCTUATION: &str = "-._@+";

/// The display name of a traveler, kept with the casing they chose.
///
/// Two names that only differ in casing belong to the same traveler: lookups and uniqueness
/// checks go through `normalized`, never through the raw text.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Validates the untrusted name `s`.
    pub fn new<S: Into<String>>(s: S) -> ModelResult<Self> {
        let s = s.into();

        if s.is_empty() {
            return Err(ModelError("Username cannot be empty".to_owned()));
        }
        if s.chars().count() > MAX_USERNAME_CHARS {
            return Err(ModelError(format!(
                "Username cannot be longer than {} characters",
                MAX_USERNAME_CHARS
            )));
        }
        if let Some(ch) =
            s.chars().find(|ch| !ch.is_ascii_alphanumeric() && !USERNAME_PUNCTUATION.contains(*ch))
        {
            return Err(ModelError(format!("Unsupported character '{}' in username '{}'", ch, s)));
        }

        Ok(Self(s))
    }

    /// Wraps `s` skipping validation so that tests can feed broken names to lower layers.
    #[cfg(any(test, feature = "testutils"))]
    pub fn new_invalid<S: Into<String>>(s: S) -> Self {
        Self(s.into())
    }

    /// Returns the name as the traveler typed it.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the case-folded key used to compare names.
    pub fn normalized(&self) -> String {
        self.0.to_ascii_lowercase()
    }
}

#[cfg(any(test, feature = "testutils"))]
impl From<&'static str> for Username {
    fn from(name: &'static str) -> Self {
        Username::new(name).expect("Hardcoded usernames must be valid")
    }
}

impl<'de> Deserialize<'de> for Username {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Username::new(raw).map_err(serde::de::Error::custom)
    }
}
