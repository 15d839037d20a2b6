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

//! Entry point to the JourneyHub backend.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use journeyhub_authn::driver::AuthnOptions;
use journeyhub_core::db::Db;
use journeyhub_core::db::postgres::{PostgresDb, PostgresOptions};
use journeyhub_core::env::get_optional_var;
use journeyhub_geo::{NominatimGeocoder, NominatimOptions};
use journeyhub_server::serve;
use std::error::Error;
use std::net::Ipv4Addr;
use std::sync::Arc;

/// Port to listen on when `JOURNEYHUB_PORT` is not set.
const DEFAULT_PORT: u16 = 3000;

/// Reads the configuration from the environment and initializes all resources to run the server.
async fn run() -> Result<(), Box<dyn Error>> {
    let port = get_optional_var::<u16>("JOURNEYHUB", "PORT")?.unwrap_or(DEFAULT_PORT);
    let addr = (Ipv4Addr::UNSPECIFIED, port);

    let db_opts = PostgresOptions::from_env("PGSQL_PROD")?;
    let authn_opts = AuthnOptions::from_env("AUTHN")?;
    let geo_opts = NominatimOptions::from_env("NOMINATIM")?;

    let db: Arc<dyn Db + Send + Sync> = Arc::new(PostgresDb::connect(db_opts)?);
    {
        let mut ex = db.ex().await?;
        journeyhub_authn::db::init_schema(&mut ex).await?;
        journeyhub_server::db::init_schema(&mut ex).await?;
    }

    let geocoder = Arc::new(NominatimGeocoder::new(geo_opts));
    serve(addr, db, geocoder, authn_opts).await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    run().await
}
