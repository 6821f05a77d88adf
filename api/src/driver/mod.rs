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

//! Business logic for the service.

use crate::db::{CityCollection, StateCollection};
use statecity_core::clocks::Clock;
use statecity_core::db::Db;
use std::sync::Arc;

mod cities;
pub(crate) use cities::CityCrud;
mod states;
pub(crate) use states::StateCrud;
#[cfg(test)]
pub(crate) mod testutils;

/// Business logic.
///
/// Every operation returns an `Envelope` that already carries the status of the request, so the
/// callers never see raw errors.
#[derive(Clone)]
pub(crate) struct Driver {
    /// Operations on states.
    states: Arc<StateCrud>,

    /// Operations on cities.
    cities: Arc<CityCrud>,
}

impl Driver {
    /// Creates a new driver backed by the given injected components.
    pub(crate) fn new(db: Arc<dyn Db + Send + Sync>, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        let states = Arc::new(StateCollection::new(db.clone(), clock.clone()));
        let cities = Arc::new(CityCollection::new(db, clock));
        Self {
            states: Arc::new(StateCrud::new(states.clone(), cities.clone())),
            cities: Arc::new(CityCrud::new(cities, states)),
        }
    }

    /// Returns the operations on states.
    pub(crate) fn states(&self) -> &StateCrud {
        &self.states
    }

    /// Returns the operations on cities.
    pub(crate) fn cities(&self) -> &CityCrud {
        &self.cities
    }
}
