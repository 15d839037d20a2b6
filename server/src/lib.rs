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

//! Backend of JourneyHub, a service to record trips as sequences of map points, share them with
//! other travelers and rate the trips of others.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use journeyhub_authn::driver::{AuthnDriver, AuthnOptions};
use journeyhub_core::clocks::SystemClock;
use journeyhub_core::db::Db;
use journeyhub_geo::ReverseGeocoder;
use log::info;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

pub mod db;
pub(crate) mod driver;
use driver::Driver;
pub(crate) mod model;
mod rest;
use rest::app;

/// Authentication realm reported to clients that fail to present valid credentials.
const REALM: &str = "journeyhub";

/// Instantiates all resources to serve the application on `bind_addr`.
///
/// The schemas of the `db` must have been initialized already, including the authentication one.
/// Trips are geolocated with `geocoder` and access tokens are handled according to `authn_opts`.
pub async fn serve(
    bind_addr: impl Into<SocketAddr>,
    db: Arc<dyn Db + Send + Sync>,
    geocoder: Arc<dyn ReverseGeocoder + Send + Sync>,
    authn_opts: AuthnOptions,
) -> Result<(), Box<dyn Error>> {
    let clock = Arc::new(SystemClock::default());
    let authn = AuthnDriver::new(db.clone(), clock.clone(), REALM, authn_opts);
    let driver = Driver::new(db.clone(), geocoder, authn, clock);
    let app = app(driver);

    let bind_addr = bind_addr.into();
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("Listening on {}", bind_addr);
    let result = axum::serve(listener, app).await;
    db.close().await;
    Ok(result?)
}
