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

//! Generic business logic for any service.
//!
//! Every service should implement its own `Driver` type holding one specialization per entity.
//! Specializations wrap a `CrudEngine` bound to the entity's `Collection` and customize it by
//! composition, which in most cases will look like this:
//!
//! ```rust,ignore
//! pub(crate) struct StateCrud {
//!     /// Generic operations on the states collection.
//!     engine: CrudEngine<StateCollection>,
//!
//!     // ... other collections needed by the specialization ...
//! }
//! ```
//!
//! Every operation implemented by the engine and its specializations returns an `Envelope`.
//! Failures are classified into the envelope right where they happen so that callers never see
//! a `DriverError` directly.

use crate::db::DbError;
use crate::model::ModelError;
use http::StatusCode;

mod crud;
pub use crud::{Collection, CrudEngine, FindHook, FindManyHook};
mod envelope;
pub use envelope::Envelope;

/// Business logic errors.  These errors encompass backend and logical errors.
///
/// Every variant knows the HTTP status code it resolves to, which is what lets the `Envelope`
/// classify any failure.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum DriverError {
    /// Indicates that a request to create or modify an entry failed because it would collide with
    /// an existing one.
    #[error("Document already exists")]
    AlreadyExists,

    /// Catch-all error type for unexpected database errors.
    #[error("{0}")]
    BackendError(String),

    /// Indicates that a document identifier is not in the native format.
    #[error("Invalid ID")]
    InvalidId,

    /// Indicates an error in the input data.
    #[error("{0}")]
    InvalidInput(String),

    /// Indicates that a requested entry does not exist.
    #[error("Document not found")]
    NotFound,
}

impl DriverError {
    /// Returns the HTTP status code that this error resolves to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            DriverError::AlreadyExists => StatusCode::CONFLICT,
            DriverError::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            DriverError::InvalidId => StatusCode::BAD_REQUEST,
            DriverError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            DriverError::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl From<DbError> for DriverError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::AlreadyExists => DriverError::AlreadyExists,
            DbError::BackendError(_) => DriverError::BackendError(e.to_string()),
            DbError::DataIntegrityError(_) => DriverError::BackendError(e.to_string()),
            DbError::NotFound => DriverError::NotFound,
            DbError::Unavailable => DriverError::BackendError(e.to_string()),
        }
    }
}

impl From<ModelError> for DriverError {
    fn from(e: ModelError) -> Self {
        DriverError::InvalidInput(e.to_string())
    }
}

/// Result type for this module.
pub type DriverResult<T> = Result<T, DriverError>;
