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

//! Entry point to the REST server.

use crate::driver::Driver;
use axum::Router;
use tower_http::cors::CorsLayer;

mod trip_delete;
mod trip_get;
mod trip_ratings_get;
mod trip_ratings_post;
mod trips_get;
mod trips_post;
mod trips_user_get;
#[cfg(test)]
mod testutils;
mod users_delete;
mod users_get;
mod users_put;
mod users_verify_password_post;

/// Creates the router for the application.
///
/// Authentication endpoints are served under `/api/auth`.  All endpoints accept cross-origin
/// requests so that browser frontends hosted elsewhere can reach them.
pub(crate) fn app(driver: Driver) -> Router {
    use axum::routing::{get, post};

    let authn = journeyhub_authn::rest::app(driver.authn().clone());

    Router::new()
        .route("/api/trips", get(trips_get::handler).post(trips_post::handler))
        .route("/api/trips/user-trips", get(trips_user_get::handler))
        .route("/api/trips/:id", get(trip_get::handler).delete(trip_delete::handler))
        .route(
            "/api/trips/:id/ratings",
            get(trip_ratings_get::handler).post(trip_ratings_post::handler),
        )
        .route(
            "/api/users",
            get(users_get::handler).put(users_put::handler).delete(users_delete::handler),
        )
        .route("/api/users/verify-password", post(users_verify_password_post::handler))
        .with_state(driver)
        .nest("/api/auth", authn)
        .layer(CorsLayer::permissive())
}
