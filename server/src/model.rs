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

//! High-level data types.

use derive_getters::Getters;
use derive_more::Constructor;
use journeyhub_authn::model::UserId;
use journeyhub_core::model::{EmailAddress, ModelError, ModelResult, Username};
use journeyhub_geo::{AreaInfo, MapPoint};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use time::OffsetDateTime;

/// Maximum length of a trip title.
const MAX_TITLE_LENGTH: usize = 256;

/// Maximum length of a trip description.
const MAX_DESCRIPTION_LENGTH: usize = 4096;

/// Maximum length of a rating comment.
const MAX_COMMENT_LENGTH: usize = 1024;

/// Default page size when the client does not request one.
const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page size a client can request.
const MAX_PAGE_SIZE: u32 = 100;

/// Identifier of a trip, assigned by the database.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub(crate) struct TripId(i64);

impl TripId {
    /// Creates a trip identifier from its database representation.
    pub(crate) fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the database representation of the identifier.
    pub(crate) fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for TripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Deserializes a list that clients may send as `null`, treating it as empty.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Details of a trip as submitted by a client, before enrichment.
#[derive(Deserialize)]
#[cfg_attr(test, derive(Clone, Debug, Serialize))]
#[serde(rename_all = "camelCase")]
pub(crate) struct TripDraft {
    /// Title of the trip.
    #[serde(default)]
    pub(crate) title: String,

    /// Free-form description of the trip.
    #[serde(default)]
    pub(crate) description: String,

    /// Route of the trip.  Absent or null points are treated as empty so that they get a
    /// descriptive error.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub(crate) map_points: Vec<MapPoint>,

    /// Whether the trip is hidden from everyone but its owner.
    #[serde(default)]
    pub(crate) is_private: bool,
}

impl TripDraft {
    /// Checks that the draft is acceptable for creation.
    pub(crate) fn validate(&self) -> ModelResult<()> {
        if self.map_points.is_empty() {
            return Err(ModelError("MapPoints cannot be empty".to_owned()));
        }
        if self.title.trim().is_empty() {
            return Err(ModelError("Title cannot be empty".to_owned()));
        }
        if self.title.chars().count() > MAX_TITLE_LENGTH {
            return Err(ModelError(format!(
                "Title cannot be longer than {} characters",
                MAX_TITLE_LENGTH
            )));
        }
        if self.description.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(ModelError(format!(
                "Description cannot be longer than {} characters",
                MAX_DESCRIPTION_LENGTH
            )));
        }
        Ok(())
    }
}

/// A persisted trip.
#[derive(Clone, Constructor, Debug, Getters, PartialEq, Serialize)]
#[cfg_attr(test, derive(Deserialize))]
#[serde(rename_all = "camelCase")]
pub(crate) struct Trip {
    /// Identifier of the trip.
    id: TripId,

    /// Owner of the trip.
    user_id: UserId,

    /// Title of the trip.
    title: String,

    /// Free-form description of the trip.
    description: String,

    /// Route of the trip, in the order the client submitted it.
    map_points: Vec<MapPoint>,

    /// Area where the trip starts.
    area: AreaInfo,

    /// Whether the trip is hidden from everyone but its owner.
    is_private: bool,

    /// When the trip was created.
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
}

/// The listing projection of a trip, which omits its route.
#[derive(Clone, Constructor, Debug, Getters, PartialEq, Serialize)]
#[cfg_attr(test, derive(Deserialize))]
#[serde(rename_all = "camelCase")]
pub(crate) struct TripSummary {
    /// Identifier of the trip.
    id: TripId,

    /// Owner of the trip.
    user_id: UserId,

    /// Title of the trip.
    title: String,

    /// Free-form description of the trip.
    description: String,

    /// Area where the trip starts.
    area: AreaInfo,

    /// Whether the trip is hidden from everyone but its owner.
    is_private: bool,

    /// When the trip was created.
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
}

impl From<Trip> for TripSummary {
    fn from(trip: Trip) -> Self {
        Self {
            id: trip.id,
            user_id: trip.user_id,
            title: trip.title,
            description: trip.description,
            area: trip.area,
            is_private: trip.is_private,
            created_at: trip.created_at,
        }
    }
}

/// A score given to a trip, between 1 and 5 stars.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[cfg_attr(test, derive(Deserialize))]
#[serde(transparent)]
pub(crate) struct Score(u8);

impl Score {
    /// Creates a new score after validating that `value` is in range.
    pub(crate) fn new(value: i64) -> ModelResult<Self> {
        match u8::try_from(value) {
            Ok(value) if (1..=5).contains(&value) => Ok(Self(value)),
            _ => Err(ModelError("Rating must be between 1 and 5".to_owned())),
        }
    }

    /// Returns the score as an integer.
    pub(crate) fn as_i16(&self) -> i16 {
        i16::from(self.0)
    }
}

/// Details of a rating as submitted by a client.
///
/// The score is kept raw so that out-of-range values are reported as invalid input instead of as
/// malformed payloads.
#[derive(Deserialize)]
#[cfg_attr(test, derive(Serialize))]
pub(crate) struct RatingDraft {
    /// Number of stars.
    pub(crate) rating: i64,

    /// Optional comment about the trip.
    #[serde(default)]
    pub(crate) comment: Option<String>,
}

impl RatingDraft {
    /// Validates the draft and returns its score and comment.
    pub(crate) fn validate(self) -> ModelResult<(Score, Option<String>)> {
        let score = Score::new(self.rating)?;
        if let Some(comment) = self.comment.as_ref() {
            if comment.chars().count() > MAX_COMMENT_LENGTH {
                return Err(ModelError(format!(
                    "Comment cannot be longer than {} characters",
                    MAX_COMMENT_LENGTH
                )));
            }
        }
        Ok((score, self.comment))
    }
}

/// A rating given by a user to a trip.
#[derive(Clone, Constructor, Debug, Getters, PartialEq, Serialize)]
#[cfg_attr(test, derive(Deserialize))]
#[serde(rename_all = "camelCase")]
pub(crate) struct TripRating {
    /// Identifier of the rating, assigned by the database.
    id: i64,

    /// User that submitted the rating.
    user_id: UserId,

    /// Trip being rated.
    trip_id: TripId,

    /// Number of stars.
    rating: Score,

    /// Optional comment about the trip.
    comment: Option<String>,
}

/// Public details of a user account.
#[derive(Debug, PartialEq, Serialize)]
#[cfg_attr(test, derive(Deserialize))]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserInfo {
    /// Name of the user.
    pub(crate) user_name: Username,

    /// Email address of the user.
    pub(crate) email: EmailAddress,

    /// Identifier of the user.
    pub(crate) user_id: UserId,
}

/// Changes to apply to the caller's account.  Absent fields are left untouched.
#[derive(Default, Deserialize)]
#[cfg_attr(test, derive(Serialize))]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserUpdate {
    /// New email address, validated against `EMAIL_PATTERN`.
    #[serde(default)]
    pub(crate) email: Option<String>,

    /// New name for the account.
    #[serde(default)]
    pub(crate) user_name: Option<String>,

    /// New password for the account.
    #[serde(default)]
    pub(crate) new_password: Option<String>,
}

/// Pagination parameters as received in the query string.
#[derive(Default, Deserialize)]
#[cfg_attr(test, derive(Serialize))]
#[serde(rename_all = "camelCase")]
pub(crate) struct PageQuery {
    /// 1-based number of the page to return.
    pub(crate) page_number: Option<i64>,

    /// Number of items per page.
    pub(crate) page_size: Option<i64>,
}

/// A validated page request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Page {
    /// 1-based number of the page to return.
    number: u32,

    /// Number of items per page.
    size: u32,
}

impl Page {
    /// Creates a page request with bounds checking.
    pub(crate) fn new(number: i64, size: i64) -> ModelResult<Self> {
        let number = match u32::try_from(number) {
            Ok(number) if number >= 1 => number,
            _ => return Err(ModelError("Page number must be at least 1".to_owned())),
        };
        let size = match u32::try_from(size) {
            Ok(size) if (1..=MAX_PAGE_SIZE).contains(&size) => size,
            _ => {
                return Err(ModelError(format!(
                    "Page size must be between 1 and {}",
                    MAX_PAGE_SIZE
                )));
            }
        };
        Ok(Self { number, size })
    }

    /// Returns the 1-based number of the page.
    pub(crate) fn number(&self) -> u32 {
        self.number
    }

    /// Returns the number of items per page.
    pub(crate) fn size(&self) -> u32 {
        self.size
    }

    /// Returns the number of items to skip to reach this page.
    pub(crate) fn offset(&self) -> i64 {
        (i64::from(self.number) - 1) * i64::from(self.size)
    }
}

impl TryFrom<PageQuery> for Page {
    type Error = ModelError;

    fn try_from(query: PageQuery) -> ModelResult<Self> {
        let number = query.page_number.unwrap_or(1);
        let size = query.page_size.unwrap_or(i64::from(DEFAULT_PAGE_SIZE));
        Page::new(number, size)
    }
}
