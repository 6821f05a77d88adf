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

//! The `Envelope` type that carries the outcome of every operation.

use crate::driver::DriverError;
use http::StatusCode;
use serde::{Deserialize, Serialize};

/// Uniform container for the outcome of an operation.
///
/// Only `data` and `message` are serialized.  The status code travels out of band and is
/// rendered by the REST layer as the HTTP status of the response.
#[derive(Debug, Deserialize, PartialEq, Serialize)]
pub struct Envelope<T> {
    /// Payload of the response, or `None` on failure.
    data: Option<T>,

    /// Human-readable description of the outcome.  Empty on plain success.
    message: String,

    /// Status code of the outcome, or `None` while the envelope has not been classified yet.
    #[serde(skip)]
    status: Option<StatusCode>,
}

impl<T> Envelope<T> {
    /// Creates a new unclassified envelope that carries `data`.
    pub fn new(data: Option<T>) -> Self {
        Self { data, message: String::new(), status: None }
    }

    /// Creates a successful envelope that carries `data`.
    pub fn ok(data: T) -> Self {
        Self { data: Some(data), message: String::new(), status: Some(StatusCode::OK) }
    }

    /// Sets the human-readable description of the outcome.
    pub fn set_message<S: Into<String>>(&mut self, message: S) {
        self.message = message.into();
    }

    /// Sets the status code of the outcome.
    pub fn set_status_code(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    /// Returns the status code of the outcome, if already classified.
    pub fn status_code(&self) -> Option<StatusCode> {
        self.status
    }

    /// Returns the payload of the envelope.
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// Consumes the envelope and returns its payload.
    pub fn into_data(self) -> Option<T> {
        self.data
    }

    /// Returns the human-readable description of the outcome.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl<T> From<DriverError> for Envelope<T> {
    fn from(e: DriverError) -> Self {
        let mut envelope = Envelope::new(None);
        envelope.set_status_code(e.status_code());
        envelope.set_message(e.to_string());
        envelope
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbError;
    use serde_json::json;

    #[test]
    fn test_envelope_new_is_unclassified() {
        let envelope = Envelope::new(Some(5));
        assert_eq!(Some(&5), envelope.data());
        assert_eq!("", envelope.message());
        assert_eq!(None, envelope.status_code());
    }

    #[test]
    fn test_envelope_setters() {
        let mut envelope = Envelope::<()>::new(None);
        envelope.set_message("Something happened");
        envelope.set_status_code(StatusCode::ACCEPTED);
        assert_eq!("Something happened", envelope.message());
        assert_eq!(Some(StatusCode::ACCEPTED), envelope.status_code());
    }

    #[test]
    fn test_envelope_ok() {
        let envelope = Envelope::ok("hello".to_owned());
        assert_eq!(Some(StatusCode::OK), envelope.status_code());
        assert_eq!(Some("hello".to_owned()), envelope.into_data());
    }

    #[test]
    fn test_envelope_classify_domain_errors() {
        let envelope = Envelope::<String>::from(DriverError::InvalidId);
        assert_eq!(Some(StatusCode::BAD_REQUEST), envelope.status_code());
        assert_eq!("Invalid ID", envelope.message());
        assert_eq!(None, envelope.data());

        let envelope = Envelope::<String>::from(DriverError::NotFound);
        assert_eq!(Some(StatusCode::NOT_FOUND), envelope.status_code());
        assert_eq!("Document not found", envelope.message());
    }

    #[test]
    fn test_envelope_classify_duplicate_key() {
        let envelope = Envelope::<String>::from(DriverError::from(DbError::AlreadyExists));
        assert_eq!(Some(StatusCode::CONFLICT), envelope.status_code());
        assert_eq!("Document already exists", envelope.message());
        assert_eq!(None, envelope.data());
    }

    #[test]
    fn test_envelope_classify_unknown() {
        let envelope =
            Envelope::<String>::from(DriverError::from(DbError::BackendError("boom".to_owned())));
        assert_eq!(Some(StatusCode::INTERNAL_SERVER_ERROR), envelope.status_code());
        assert_eq!("Database error: boom", envelope.message());
    }

    #[test]
    fn test_envelope_serialization_skips_status() {
        let envelope = Envelope::ok(vec![1, 2]);
        assert_eq!(
            json!({"data": [1, 2], "message": ""}),
            serde_json::to_value(&envelope).unwrap()
        );

        let envelope = Envelope::<Vec<i32>>::from(DriverError::NotFound);
        assert_eq!(
            json!({"data": null, "message": "Document not found"}),
            serde_json::to_value(&envelope).unwrap()
        );
    }
}
