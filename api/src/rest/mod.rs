// StateCity
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
use http::{HeaderValue, Method, header};
use serde::Deserialize;
use statecity_core::rest::log_request;
use tower_http::cors::CorsLayer;

mod cities_get;
mod cities_post;
mod city_delete;
mod city_get;
mod city_put;
mod state_delete;
mod state_get;
mod state_put;
mod states_get;
mod states_post;
#[cfg(test)]
mod testutils;

/// Query parameters accepted by the listing APIs.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct NameQuery {
    /// Text that the names of the returned documents must contain, ignoring case.
    name: Option<String>,
}

/// Builds the CORS policy for the application, allowing requests from `origin`.
fn cors(origin: HeaderValue) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::HeaderName::from_static("x-requested-with"), header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Creates the router for the application.
pub(crate) fn app(driver: Driver, cors_origin: HeaderValue) -> Router {
    use axum::routing::get;
    Router::new()
        .route("/state", get(states_get::handler).post(states_post::handler))
        .route(
            "/state/:id",
            get(state_get::handler).put(state_put::handler).delete(state_delete::handler),
        )
        .route("/city", get(cities_get::handler).post(cities_post::handler))
        .route(
            "/city/:id",
            get(city_get::handler).put(city_put::handler).delete(city_delete::handler),
        )
        .layer(cors(cors_origin))
        .layer(axum::middleware::from_fn(log_request))
        .with_state(driver)
}
