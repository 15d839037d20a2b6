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

//! Reverse geocoder backed by an in-memory table for testing purposes.

use crate::{AreaInfo, GeoResult, MapPoint, ReverseGeocoder};
use async_trait::async_trait;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Reverse geocoder that uses an in-memory table of coordinates to areas.
///
/// Points not in the table resolve to an empty `AreaInfo`, mimicking what the real service does
/// for coordinates in the middle of nowhere.
#[derive(Clone, Default)]
pub struct MockGeocoder {
    /// Mapping of `(lat, lng)` pairs to `(country, city)` pairs.
    data: Arc<Vec<((f64, f64), AreaInfo)>>,

    /// Whether all queries should fail as if the service was down.
    fail: bool,

    /// Number of queries received so far, including failed ones.
    calls: Arc<AtomicUsize>,
}

impl MockGeocoder {
    /// Creates a new mock geocoder based on a list of `((lat, lng), (country, city))` pairs.
    pub fn new(raw_data: &[((f64, f64), (&'static str, &'static str))]) -> Self {
        let data = raw_data
            .iter()
            .map(|(point, (country, city))| (*point, AreaInfo::new(*country, *city)))
            .collect::<Vec<_>>();
        Self { data: Arc::from(data), ..Default::default() }
    }

    /// Creates a new mock geocoder that fails every query.
    pub fn failing() -> Self {
        Self { fail: true, ..Default::default() }
    }

    /// Returns the number of queries issued against this geocoder or any of its clones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReverseGeocoder for MockGeocoder {
    async fn locate(&self, point: &MapPoint) -> GeoResult<AreaInfo> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.fail {
            return Err(io::Error::other("HTTP request returned status 503 Service Unavailable"));
        }

        Ok(self
            .data
            .iter()
            .find(|((lat, lng), _)| *lat == point.lat() && *lng == point.lng())
            .map(|(_, area)| area.clone())
            .unwrap_or_default())
    }
}
