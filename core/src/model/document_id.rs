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

//! The `DocumentId` data type.

use crate::model::{ModelError, ModelResult};
use serde::de::Visitor;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};
use std::sync::atomic::{AtomicU32, Ordering};
use time::OffsetDateTime;

/// Number of raw bytes in an identifier.
const RAW_LENGTH: usize = 12;

/// Number of hexadecimal characters in the textual form of an identifier.
pub const HEX_LENGTH: usize = RAW_LENGTH * 2;

/// Sequence number mixed into generated identifiers to tell apart those created within the same
/// second by the same process.
static SEQUENCE: AtomicU32 = AtomicU32::new(0);

/// Store-assigned identifier of a document.
///
/// The textual form is 24 hexadecimal characters that encode 12 bytes: the creation time as
/// seconds since the epoch (4 bytes, big endian), 5 random bytes, and a 3-byte sequence number.
/// Identifiers are normalized to lowercase.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Returns true if `s` is in the native identifier format.
    ///
    /// This is a pure predicate: it only looks at the shape of the input and never consults the
    /// store.
    pub fn is_valid(s: &str) -> bool {
        s.len() == HEX_LENGTH && s.bytes().all(|b| b.is_ascii_hexdigit())
    }

    /// Creates a new identifier from an untrusted string `s`, making sure it is valid.
    pub fn new<S: Into<String>>(s: S) -> ModelResult<Self> {
        let s = s.into();
        if !DocumentId::is_valid(&s) {
            return Err(ModelError(format!("Invalid document ID '{}'", s)));
        }
        Ok(Self(s.to_ascii_lowercase()))
    }

    /// Generates a fresh identifier for a document created at `now`.
    pub fn generate(now: OffsetDateTime) -> Self {
        let secs = u32::try_from(now.unix_timestamp().clamp(0, i64::from(u32::MAX)))
            .expect("Timestamp was clamped to the u32 range");
        let sequence = SEQUENCE.fetch_add(1, Ordering::Relaxed);

        let mut raw = [0u8; RAW_LENGTH];
        raw[0..4].copy_from_slice(&secs.to_be_bytes());
        raw[4..9].copy_from_slice(&rand::random::<[u8; 5]>());
        raw[9..12].copy_from_slice(&sequence.to_be_bytes()[1..4]);

        let mut hex = String::with_capacity(HEX_LENGTH);
        for b in raw {
            write!(hex, "{:02x}", b).expect("Writing to a String cannot fail");
        }
        Self(hex)
    }

    /// Returns a string view of the identifier.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Visitor to deserialize a `DocumentId` from a string.
struct DocumentIdVisitor;

impl Visitor<'_> for DocumentIdVisitor {
    type Value = DocumentId;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str(r#"a 24-character hexadecimal document ID"#)
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        match DocumentId::new(v) {
            Ok(id) => Ok(id),
            Err(e) => Err(E::custom(format!("{}", e))),
        }
    }

    fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        match DocumentId::new(v) {
            Ok(id) => Ok(id),
            Err(e) => Err(E::custom(format!("{}", e))),
        }
    }
}

impl<'de> Deserialize<'de> for DocumentId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_string(DocumentIdVisitor)
    }
}
