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

//! Reverse geocoder backed by the Nominatim service from OpenStreetMap.

use crate::{AreaInfo, GeoResult, MapPoint, ReverseGeocoder};
use async_trait::async_trait;
use bytes::Buf;
use journeyhub_core::env::get_optional_var;
use log::warn;
use reqwest::{Client, Response, StatusCode, header};
use serde::Deserialize;
use std::io;
use url::Url;

/// Default location of the Nominatim service.
const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org/";

/// Default user agent to send in requests.  Nominatim rejects requests without one.
const DEFAULT_USER_AGENT: &str = "JourneyHub/1.0";

/// Converts a `reqwest::Error` to an `io::Error`.
fn reqwest_error_to_io_error(e: reqwest::Error) -> io::Error {
    io::Error::other(format!("{}", e))
}

/// Converts a `reqwest::Response` to an `io::Error`.  The response should have a non-OK status.
async fn http_response_to_io_error(response: Response) -> io::Error {
    let status = response.status();

    let kind = match status {
        StatusCode::BAD_REQUEST => io::ErrorKind::InvalidInput,
        StatusCode::UNAUTHORIZED => io::ErrorKind::PermissionDenied,
        StatusCode::FORBIDDEN => io::ErrorKind::PermissionDenied,
        StatusCode::NOT_FOUND => io::ErrorKind::NotFound,
        StatusCode::TOO_MANY_REQUESTS => io::ErrorKind::ConnectionRefused,
        _ => io::ErrorKind::Other,
    };

    match response.text().await {
        Ok(text) => io::Error::new(
            kind,
            format!("HTTP request returned status {} with text '{}'", status, text),
        ),
        Err(e) => io::Error::new(
            kind,
            format!("HTTP request returned status {} and failed to get text due to {}", status, e),
        ),
    }
}

/// Address details as encoded within `ReverseResponse`.
#[derive(Deserialize)]
struct AddressResponse {
    /// Name of the country, if known.
    country: Option<String>,

    /// Name of the city, if known.
    city: Option<String>,
}

/// Response from the Nominatim service to a reverse geocoding query.
#[derive(Deserialize)]
struct ReverseResponse {
    /// Address details of the location.  Missing when the service cannot resolve the point.
    address: Option<AddressResponse>,
}

/// Extracts the area information from the raw body of a reverse geocoding response.
///
/// Missing fields and malformed documents yield empty names instead of errors.
fn parse_area<B: Buf>(body: B) -> AreaInfo {
    let response: ReverseResponse = match serde_json::from_reader(body.reader()) {
        Ok(response) => response,
        Err(e) => {
            warn!("Ignoring malformed reverse geocoding response: {}", e);
            return AreaInfo::default();
        }
    };

    match response.address {
        Some(address) => AreaInfo {
            country: address.country.unwrap_or_default(),
            city: address.city.unwrap_or_default(),
        },
        None => {
            warn!("Reverse geocoding response does not contain an address");
            AreaInfo::default()
        }
    }
}

/// Options to configure a `NominatimGeocoder`.
#[derive(Clone, Debug, PartialEq)]
pub struct NominatimOptions {
    /// Base URL of the service.  Must end in a slash so that API paths can be appended to it.
    pub base_url: Url,

    /// Value of the `User-Agent` header to send in every request.
    pub user_agent: String,
}

impl Default for NominatimOptions {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("Hardcoded URL must be valid"),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl NominatimOptions {
    /// Creates a set of options from environment variables whose name is prefixed with the given
    /// `prefix`.
    ///
    /// This will use variables such as `<prefix>_BASE_URL` and `<prefix>_USER_AGENT`, falling
    /// back to the public service when they are not set.
    pub fn from_env(prefix: &str) -> Result<Self, String> {
        let defaults = Self::default();
        let base_url = get_optional_var::<Url>(prefix, "BASE_URL")?.unwrap_or(defaults.base_url);
        if !base_url.path().ends_with('/') {
            return Err(format!("{}_BASE_URL must end with a slash", prefix));
        }
        Ok(Self {
            base_url,
            user_agent: get_optional_var::<String>(prefix, "USER_AGENT")?
                .unwrap_or(defaults.user_agent),
        })
    }
}

/// Reverse geocoder that queries a Nominatim server.
#[derive(Clone)]
pub struct NominatimGeocoder {
    /// Asynchronous HTTP client with which to issue the service requests.
    client: Client,

    /// Configuration of the service to talk to.
    opts: NominatimOptions,
}

impl NominatimGeocoder {
    /// Creates a new Nominatim-backed geocoder using `opts` for configuration.
    pub fn new(opts: NominatimOptions) -> Self {
        Self { client: Client::default(), opts }
    }

    /// Computes the URL of the reverse geocoding query for `point`.
    fn reverse_url(&self, point: &MapPoint) -> GeoResult<Url> {
        let mut url = self
            .opts
            .base_url
            .join("reverse")
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("lat", &point.lat().to_string())
            .append_pair("lon", &point.lng().to_string())
            .append_pair("format", "json");
        Ok(url)
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimGeocoder {
    async fn locate(&self, point: &MapPoint) -> GeoResult<AreaInfo> {
        let url = self.reverse_url(point)?;
        let response = self
            .client
            .get(url)
            .header(header::USER_AGENT, &self.opts.user_agent)
            .send()
            .await
            .map_err(reqwest_error_to_io_error)?;
        if !response.status().is_success() {
            return Err(http_response_to_io_error(response).await);
        }

        let bytes = response.bytes().await.map_err(reqwest_error_to_io_error)?;
        Ok(parse_area(bytes))
    }
}
