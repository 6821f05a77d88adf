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

//! Test utilities for the business layer.

use crate::db;
use crate::driver::Driver;
use crate::model::{Abbreviation, City, CityFilter, Name, State, StateFilter};
use statecity_core::clocks::Clock;
use statecity_core::clocks::testutils::SettableClock;
use statecity_core::db::{Db, Executor};
use statecity_core::model::DocumentId;
use std::sync::Arc;
use std::time::Duration;
use time::macros::datetime;

/// State of a running test.
pub(crate) struct TestContext {
    /// The database backing the driver.
    db: Arc<dyn Db + Send + Sync>,

    /// The clock used by the driver, which only moves when told to.
    clock: Arc<SettableClock>,

    /// The driver under test.
    driver: Driver,
}

impl TestContext {
    /// Initializes the driver using an in-memory database and a settable clock.
    pub(crate) async fn setup() -> Self {
        let db: Arc<dyn Db + Send + Sync> =
            Arc::new(statecity_core::db::sqlite::testutils::setup().await);
        db::init_schema(&mut db.ex().await.unwrap()).await.unwrap();
        let clock = Arc::new(SettableClock::new(datetime!(2023-12-14 06:30:09 UTC)));
        let driver = Driver::new(db.clone(), clock.clone());
        Self { db, clock, driver }
    }

    /// Gets a direct executor against the database.
    ///
    /// The test database only has one connection, so the executor must be dropped before issuing
    /// any other operation.
    pub(crate) async fn ex(&self) -> Executor {
        self.db.ex().await.unwrap()
    }

    /// Gets a copy of the driver in this test context.
    pub(crate) fn driver(&self) -> Driver {
        self.driver.clone()
    }

    /// Returns the current time according to the test clock and advances it by one second.
    fn tick(&self) -> time::OffsetDateTime {
        let now = self.clock.now_utc();
        self.clock.advance(Duration::from_secs(1));
        now
    }

    /// Syntactic sugar to insert a state directly into the database.
    pub(crate) async fn create_state(
        &self,
        name: &'static str,
        abbreviation: &'static str,
    ) -> State {
        let now = self.tick();
        let state = State::new(
            DocumentId::generate(now),
            Name::from(name),
            Abbreviation::from(abbreviation),
            now,
            now,
        );
        db::create_state(&mut self.ex().await, &state).await.unwrap();
        state
    }

    /// Syntactic sugar to insert a city directly into the database.
    pub(crate) async fn create_city(&self, name: &'static str, state: &State) -> City {
        let now = self.tick();
        let city =
            City::new(DocumentId::generate(now), Name::from(name), state.id().clone(), now, now);
        db::create_city(&mut self.ex().await, &city).await.unwrap();
        city
    }

    /// Gets all states in the database.
    pub(crate) async fn all_states(&self) -> Vec<State> {
        db::find_states(&mut self.ex().await, &StateFilter::default()).await.unwrap()
    }

    /// Gets all cities in the database.
    pub(crate) async fn all_cities(&self) -> Vec<City> {
        db::find_cities(&mut self.ex().await, &CityFilter::default()).await.unwrap()
    }
}
