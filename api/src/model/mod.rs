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

//! High-level data types.

mod city;
pub(crate) use city::{City, CityFilter, CityPatch, NewCity, PopulatedCity};
mod state;
pub(crate) use state::{NewState, State, StateFilter, StatePatch};
mod text;
pub(crate) use text::{Abbreviation, Name};

/// Turns the optional `name` query parameter of a listing into a substring to search for.
///
/// Empty strings mean "no filter".
pub(crate) fn name_query(name: Option<String>) -> Option<String> {
    name.filter(|name| !name.is_empty())
}
