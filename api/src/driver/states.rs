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

//! Operations on states.

use crate::db::{CityCollection, StateCollection};
use crate::model::{CityFilter, NewState, State, StateFilter, StatePatch};
use log::{debug, warn};
use statecity_core::driver::{Collection, CrudEngine, Envelope};
use statecity_core::model::DocumentId;
use std::sync::Arc;

/// Operations on states.
///
/// Removing a state also removes all the cities that belong to it.
pub(crate) struct StateCrud {
    /// Generic operations on the states collection.
    engine: CrudEngine<StateCollection>,

    /// The cities collection, used to cascade removals.
    cities: Arc<CityCollection>,
}

impl StateCrud {
    /// Creates a new set of operations on `states` that cascade removals to `cities`.
    pub(crate) fn new(states: Arc<StateCollection>, cities: Arc<CityCollection>) -> Self {
        Self { engine: CrudEngine::new(states), cities }
    }

    /// Creates a new state.
    pub(crate) async fn insert(&self, state: NewState) -> Envelope<State> {
        self.engine.insert(state).await
    }

    /// Applies `patch` to the state `id`.
    pub(crate) async fn update(&self, id: &str, patch: StatePatch) -> Envelope<String> {
        self.engine.update(id, patch).await
    }

    /// Looks up the state `id`.
    pub(crate) async fn find_by_id(&self, id: &str) -> Envelope<State> {
        self.engine.find_by_id(id).await
    }

    /// Returns all states that match `filter`.
    pub(crate) async fn get_all(&self, filter: &StateFilter) -> Envelope<Vec<State>> {
        self.engine.get_all(filter).await
    }

    /// Deletes the state `id` and then all of its cities.
    ///
    /// The two deletions are independent: the cities are removed even if the state did not exist,
    /// and a failure to remove the cities does not affect the returned envelope.
    pub(crate) async fn remove(&self, id: &str) -> Envelope<String> {
        let envelope = self.engine.remove(id).await;

        match DocumentId::new(id) {
            Ok(state) => {
                let filter = CityFilter { state: Some(state), ..Default::default() };
                match self.cities.delete_many(&filter).await {
                    Ok(n) => debug!("Removed {} cities of state {}", n, id),
                    Err(e) => warn!("Failed to remove cities of state {}: {}", id, e),
                }
            }
            Err(_) => debug!("Not removing cities for invalid state ID '{}'", id),
        }

        envelope
    }
}
