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

//! Operations on cities.

use crate::db::{CityCollection, StateCollection};
use crate::model::{City, CityFilter, CityPatch, NewCity, PopulatedCity, State};
use futures::FutureExt;
use log::debug;
use statecity_core::db::DbResult;
use statecity_core::driver::{
    Collection, CrudEngine, DriverError, DriverResult, Envelope, FindHook, FindManyHook,
};
use statecity_core::model::DocumentId;
use std::collections::HashMap;
use std::sync::Arc;

/// Expands the state of `city`.
async fn populate(states: Arc<StateCollection>, city: City) -> DbResult<PopulatedCity> {
    let state = states.find_by_id(city.state()).await?;
    Ok(PopulatedCity::new(city, state))
}

/// Expands the states of all `cities`, looking up each distinct state only once.
async fn populate_all(
    states: Arc<StateCollection>,
    cities: Vec<City>,
) -> DbResult<Vec<PopulatedCity>> {
    let mut cache: HashMap<DocumentId, Option<State>> = HashMap::new();
    let mut populated = Vec::with_capacity(cities.len());
    for city in cities {
        let state = match cache.get(city.state()).cloned() {
            Some(state) => state,
            None => {
                let state = states.find_by_id(city.state()).await?;
                cache.insert(city.state().clone(), state.clone());
                state
            }
        };
        populated.push(PopulatedCity::new(city, state));
    }
    Ok(populated)
}

/// Operations on cities.
///
/// Writes are rejected if they would produce a city identical to an existing one or if they refer
/// to a state that does not exist.  Reads return cities with their state expanded.
pub(crate) struct CityCrud {
    /// Generic operations on the cities collection.
    engine: CrudEngine<CityCollection, PopulatedCity>,

    /// The states collection, used to validate and expand state references.
    states: Arc<StateCollection>,
}

impl CityCrud {
    /// Creates a new set of operations on `cities` that resolve their states from `states`.
    pub(crate) fn new(cities: Arc<CityCollection>, states: Arc<StateCollection>) -> Self {
        let on_find_document: FindHook<City, PopulatedCity> = {
            let states = states.clone();
            Arc::new(move |city: City| populate(states.clone(), city).boxed())
        };
        let on_find_documents: FindManyHook<City, PopulatedCity> = {
            let states = states.clone();
            Arc::new(move |cities: Vec<City>| populate_all(states.clone(), cities).boxed())
        };
        Self { engine: CrudEngine::with_hooks(cities, on_find_document, on_find_documents), states }
    }

    /// Ensures that a write is acceptable before issuing it.
    ///
    /// `filter` selects the cities that would be identical to the result of the write, and `state`
    /// is the state the write refers to, if any.
    async fn check_write(
        &self,
        filter: &CityFilter,
        state: Option<&DocumentId>,
    ) -> DriverResult<()> {
        if self.engine.collection().exists(filter).await? {
            return Err(DriverError::AlreadyExists);
        }

        if let Some(state) = state {
            if self.states.find_by_id(state).await?.is_none() {
                return Err(DriverError::InvalidInput(
                    "Referenced state does not exist".to_owned(),
                ));
            }
        }

        Ok(())
    }

    /// Creates a new city.
    pub(crate) async fn insert(&self, city: NewCity) -> Envelope<City> {
        if let Err(e) = self.check_write(&CityFilter::from(&city), Some(city.state())).await {
            debug!("insert rejected: {}", e);
            return Envelope::from(e);
        }
        self.engine.insert(city).await
    }

    /// Applies `patch` to the city `id`.
    ///
    /// An empty patch is not checked for duplicates because it would match any city.
    pub(crate) async fn update(&self, id: &str, patch: CityPatch) -> Envelope<String> {
        if !patch.is_empty() {
            if let Err(e) = self.check_write(&CityFilter::from(&patch), patch.state.as_ref()).await
            {
                debug!("update rejected: {}", e);
                return Envelope::from(e);
            }
        }
        self.engine.update(id, patch).await
    }

    /// Deletes the city `id`.
    pub(crate) async fn remove(&self, id: &str) -> Envelope<String> {
        self.engine.remove(id).await
    }

    /// Looks up the city `id` and expands its state.
    pub(crate) async fn find_by_id(&self, id: &str) -> Envelope<PopulatedCity> {
        self.engine.find_by_id(id).await
    }

    /// Returns all cities that match `filter` with their states expanded.
    pub(crate) async fn get_all(&self, filter: &CityFilter) -> Envelope<Vec<PopulatedCity>> {
        self.engine.get_all(filter).await
    }
}
