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

//! Free-form text fields that must not be blank.

use serde::de::Visitor;
use serde::{Deserialize, Serialize};
use statecity_core::model::{ModelError, ModelResult};

/// Generates a newtype that wraps a non-blank string, named `$label` in error messages.
macro_rules! text_newtype [
    ( $( #[$meta:meta] )* $name:ident, $visitor:ident, $label:literal ) => {
        $( #[$meta] )*
        #[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
        #[serde(transparent)]
        pub(crate) struct $name(String);

        impl $name {
            /// Creates a new value from an untrusted string `s`, making sure it is not blank.
            pub(crate) fn new<S: Into<String>>(s: S) -> ModelResult<Self> {
                let s = s.into();
                if s.trim().is_empty() {
                    return Err(ModelError(concat!($label, " cannot be empty").to_owned()));
                }
                Ok(Self(s))
            }

            /// Returns a string view of the value.
            pub(crate) fn as_str(&self) -> &str {
                &self.0
            }
        }

        /// A deserialization visitor for the newtype.
        struct $visitor;

        impl Visitor<'_> for $visitor {
            type Value = $name;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a non-empty string")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                $name::new(v).map_err(|e| E::custom(e.to_string()))
            }

            fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                $name::new(v).map_err(|e| E::custom(e.to_string()))
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                deserializer.deserialize_string($visitor)
            }
        }

        #[cfg(test)]
        impl From<&'static str> for $name {
            /// Creates a new value from a hardcoded string, which must be valid.
            fn from(s: &'static str) -> Self {
                $name::new(s).expect("Hardcoded values must be valid")
            }
        }
    }
];

text_newtype!(
    /// Name of a state or of a city.
    Name,
    NameVisitor,
    "Name"
);

impl Name {
    /// Returns the name folded to lowercase for case-insensitive comparisons.
    pub(crate) fn folded(&self) -> String {
        self.0.to_lowercase()
    }
}

text_newtype!(
    /// Abbreviation of a state, such as its postal code.
    Abbreviation,
    AbbreviationVisitor,
    "Abbreviation"
);
