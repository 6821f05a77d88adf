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

//! Test utilities for the REST API.

use crate::driver::testutils::TestContext as DriverTestContext;
use crate::model::{City, State};
use crate::rest::app;
use axum::Router;
use http::HeaderValue;
use std::ops::Deref;

/// Origin allowed by the CORS policy of the test app.
pub(crate) const TEST_ORIGIN: &str = "http://localhost:4200";

/// Identifier that is well-formed but that never matches any document.
pub(crate) const MISSING_ID: &str = "000000000000000000000000";

/// State of a running test.
///
/// Dereferences to the business layer context to offer direct access to the database.
pub(crate) struct TestContext {
    /// Context of the business layer wrapped by the app.
    inner: DriverTestContext,

    /// The app under test.
    app: Router,
}

impl TestContext {
    /// Initializes the app backed by an in-memory database.
    pub(crate) async fn setup() -> Self {
        let inner = DriverTestContext::setup().await;
        let app = app(inner.driver(), HeaderValue::from_static(TEST_ORIGIN));
        Self { inner, app }
    }

    /// Gets a copy of the app under test.
    pub(crate) fn app(&self) -> Router {
        self.app.clone()
    }

    /// Syntactic sugar to create a state and two cities in it.
    pub(crate) async fn create_state_with_cities(&self) -> (State, City, City) {
        let state = self.create_state("Rio de Janeiro", "RJ").await;
        let city1 = self.create_city("Niteroi", &state).await;
        let city2 = self.create_city("Petropolis", &state).await;
        (state, city1, city2)
    }
}

impl Deref for TestContext {
    type Target = DriverTestContext;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
