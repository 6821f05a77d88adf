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

//! Data types that describe cities.

use crate::model::{Name, State};
use derive_getters::Getters;
use derive_more::Constructor;
use serde::{Deserialize, Serialize};
use statecity_core::model::DocumentId;
use time::OffsetDateTime;

/// A stored city.
#[derive(Clone, Constructor, Debug, Deserialize, Getters, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct City {
    /// Identifier assigned by the store.
    id: DocumentId,

    /// Name of the city.
    name: Name,

    /// Identifier of the state the city belongs to.
    state: DocumentId,

    /// Time when the city was created.
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,

    /// Time when the city was last modified.
    #[serde(with = "time::serde::rfc3339")]
    updated_at: OffsetDateTime,
}

/// A city as returned by reads, with its state expanded.
#[derive(Clone, Debug, Deserialize, Getters, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PopulatedCity {
    /// Identifier assigned by the store.
    id: DocumentId,

    /// Name of the city.
    name: Name,

    /// The state the city belongs to, or `None` if it does not exist any more.
    state: Option<State>,

    /// Time when the city was created.
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,

    /// Time when the city was last modified.
    #[serde(with = "time::serde::rfc3339")]
    updated_at: OffsetDateTime,
}

impl PopulatedCity {
    /// Expands `city` with the contents of its `state`.
    pub(crate) fn new(city: City, state: Option<State>) -> Self {
        Self {
            id: city.id,
            name: city.name,
            state,
            created_at: city.created_at,
            updated_at: city.updated_at,
        }
    }
}

/// Contents of a city that is about to be created.
#[derive(Constructor, Debug, Deserialize, Getters, Serialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct NewCity {
    /// Name of the new city.
    name: Name,

    /// Identifier of the state the new city belongs to.
    state: DocumentId,
}

/// Partial modification of a city.  Missing fields are left untouched.
#[derive(Debug, Default, Deserialize, Serialize)]
pub(crate) struct CityPatch {
    /// New name of the city.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) name: Option<Name>,

    /// Identifier of the new state of the city.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) state: Option<DocumentId>,
}

impl CityPatch {
    /// Returns true if the patch does not modify any field.
    pub(crate) fn is_empty(&self) -> bool {
        self.name.is_none() && self.state.is_none()
    }
}

/// Criteria to select cities.  All present criteria must match.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct CityFilter {
    /// Name that cities must have.
    pub(crate) name: Option<Name>,

    /// Text that the name of the cities must contain, ignoring case.
    pub(crate) name_contains: Option<String>,

    /// Identifier of the state that cities must belong to.
    pub(crate) state: Option<DocumentId>,
}

impl From<&NewCity> for CityFilter {
    /// Selects the cities whose fields are equal to those of `city`.
    fn from(city: &NewCity) -> Self {
        Self { name: Some(city.name.clone()), name_contains: None, state: Some(city.state.clone()) }
    }
}

impl From<&CityPatch> for CityFilter {
    /// Selects the cities whose fields are equal to those set in `patch`.
    fn from(patch: &CityPatch) -> Self {
        Self { name: patch.name.clone(), name_contains: None, state: patch.state.clone() }
    }
}
