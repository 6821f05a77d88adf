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

//! Data types that describe states.

use crate::model::{Abbreviation, Name};
use derive_getters::Getters;
use derive_more::Constructor;
use serde::{Deserialize, Serialize};
use statecity_core::model::DocumentId;
use time::OffsetDateTime;

/// A stored state.
#[derive(Clone, Constructor, Debug, Deserialize, Getters, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct State {
    /// Identifier assigned by the store.
    id: DocumentId,

    /// Name of the state.  Unique across all states.
    name: Name,

    /// Abbreviation of the state.  Unique across all states.
    abbreviation: Abbreviation,

    /// Time when the state was created.
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,

    /// Time when the state was last modified.
    #[serde(with = "time::serde::rfc3339")]
    updated_at: OffsetDateTime,
}

/// Contents of a state that is about to be created.
#[derive(Constructor, Debug, Deserialize, Getters, Serialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct NewState {
    /// Name of the new state.
    name: Name,

    /// Abbreviation of the new state.
    abbreviation: Abbreviation,
}

/// Partial modification of a state.  Missing fields are left untouched.
#[derive(Debug, Default, Deserialize, Serialize)]
pub(crate) struct StatePatch {
    /// New name of the state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) name: Option<Name>,

    /// New abbreviation of the state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) abbreviation: Option<Abbreviation>,
}

/// Criteria to select states.
#[derive(Debug, Default)]
pub(crate) struct StateFilter {
    /// Text that the name of the states must contain, ignoring case.
    pub(crate) name_contains: Option<String>,
}
