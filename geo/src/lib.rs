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

//! APIs to resolve map coordinates into the area they belong to.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use async_trait::async_trait;
use journeyhub_core::model::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use std::io;

#[cfg(any(test, feature = "testutils"))]
mod mock;
#[cfg(any(test, feature = "testutils"))]
pub use mock::MockGeocoder;
mod nominatim;
pub use nominatim::{NominatimGeocoder, NominatimOptions};

/// Result type for this module.
type GeoResult<T> = io::Result<T>;

/// Raw representation of a `MapPoint` as received from the outside world, before validation.
#[derive(Deserialize)]
struct RawMapPoint {
    /// Latitude in degrees.
    lat: f64,

    /// Longitude in degrees.
    lng: f64,
}

/// A coordinate pair on the map.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(try_from = "RawMapPoint")]
pub struct MapPoint {
    /// Latitude in degrees, within [-90, 90].
    lat: f64,

    /// Longitude in degrees, within [-180, 180].
    lng: f64,
}

impl MapPoint {
    /// Creates a new map point after validating that the coordinates are within range.
    pub fn new(lat: f64, lng: f64) -> ModelResult<Self> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(ModelError(format!("Latitude {} is out of range", lat)));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(ModelError(format!("Longitude {} is out of range", lng)));
        }
        Ok(Self { lat, lng })
    }

    /// Returns the latitude of the point.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Returns the longitude of the point.
    pub fn lng(&self) -> f64 {
        self.lng
    }
}

impl TryFrom<RawMapPoint> for MapPoint {
    type Error = ModelError;

    fn try_from(raw: RawMapPoint) -> ModelResult<Self> {
        MapPoint::new(raw.lat, raw.lng)
    }
}

/// Name of the area a map point belongs to.
///
/// Either field may be empty when the geocoding service does not know about it.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct AreaInfo {
    /// Name of the country.
    pub country: String,

    /// Name of the city.
    pub city: String,
}

impl AreaInfo {
    /// Creates a new area from its `country` and `city` names.
    pub fn new<C1: Into<String>, C2: Into<String>>(country: C1, city: C2) -> Self {
        Self { country: country.into(), city: city.into() }
    }
}

/// Interface to resolve coordinates into areas.
#[async_trait]
pub trait ReverseGeocoder {
    /// Figures out which country and city `point` is in.
    async fn locate(&self, point: &MapPoint) -> GeoResult<AreaInfo>;
}
