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

//! Generic create/read/update/delete operations over a collection of documents.

use crate::db::DbResult;
use crate::driver::{DriverError, DriverResult, Envelope};
use crate::model::DocumentId;
use async_trait::async_trait;
use futures::FutureExt;
use futures::future::{self, BoxFuture};
use log::{debug, warn};
use std::sync::Arc;

/// Message returned in the payload of a successful update.
const UPDATED_MESSAGE: &str = "Document successfully updated";

/// Message returned in the payload of a successful removal.
const REMOVED_MESSAGE: &str = "Document successfully removed";

/// Persistence operations that a collection of documents must offer.
///
/// Services implement this once per entity on top of the `db` layer.
#[async_trait]
pub trait Collection: Send + Sync {
    /// Stored representation of a document, including its identifier and timestamps.
    type Document: Send + 'static;

    /// Contents of a document that is about to be created.
    type NewDocument: Send + Sync;

    /// Partial update to apply to a document.
    type Patch: Send + Sync;

    /// Shallow equality criteria to select documents.
    type Filter: Send + Sync;

    /// Creates a new document.  Unique constraint violations must be reported as
    /// `DbError::AlreadyExists`.
    async fn create(&self, doc: Self::NewDocument) -> DbResult<Self::Document>;

    /// Looks up a single document by its `id`.
    async fn find_by_id(&self, id: &DocumentId) -> DbResult<Option<Self::Document>>;

    /// Returns all documents that match `filter`.
    async fn find(&self, filter: &Self::Filter) -> DbResult<Vec<Self::Document>>;

    /// Applies `patch` to the document `id` and returns the number of matched documents.
    async fn update_one(&self, id: &DocumentId, patch: Self::Patch) -> DbResult<u64>;

    /// Deletes the document `id` and returns the number of deleted documents.
    async fn delete_one(&self, id: &DocumentId) -> DbResult<u64>;

    /// Deletes all documents that match `filter` and returns how many there were.
    async fn delete_many(&self, filter: &Self::Filter) -> DbResult<u64>;

    /// Returns true if at least one document matches `filter`.
    async fn exists(&self, filter: &Self::Filter) -> DbResult<bool>;
}

/// Hook to reshape a single document after it has been read.
pub type FindHook<D, T> = Arc<dyn Fn(D) -> BoxFuture<'static, DbResult<T>> + Send + Sync>;

/// Hook to reshape a list of documents after they have been read.
pub type FindManyHook<D, T> =
    Arc<dyn Fn(Vec<D>) -> BoxFuture<'static, DbResult<Vec<T>>> + Send + Sync>;

/// Default read hook that returns its input unmodified.
fn identity<D: Send + 'static>(doc: D) -> BoxFuture<'static, DbResult<D>> {
    future::ready(Ok(doc)).boxed()
}

/// Generic CRUD operations against the collection `C`, returning documents of type `T` on reads.
///
/// All operations return an `Envelope` and never fail to the caller: any error is classified
/// into the envelope before returning.
pub struct CrudEngine<C: Collection, T = <C as Collection>::Document> {
    /// The collection that all operations go to.
    collection: Arc<C>,

    /// Reshapes the result of `find_by_id`.
    on_find_document: FindHook<C::Document, T>,

    /// Reshapes the result of `get_all`.
    on_find_documents: FindManyHook<C::Document, T>,
}

impl<C: Collection> CrudEngine<C> {
    /// Creates a new engine for `collection` that returns documents as they are stored.
    pub fn new(collection: Arc<C>) -> Self {
        let on_find_document: FindHook<C::Document, C::Document> =
            Arc::new(identity::<C::Document>);
        let on_find_documents: FindManyHook<C::Document, C::Document> =
            Arc::new(identity::<Vec<C::Document>>);
        Self { collection, on_find_document, on_find_documents }
    }
}

impl<C: Collection, T: Send + 'static> CrudEngine<C, T> {
    /// Creates a new engine for `collection` that passes read documents through the given hooks.
    pub fn with_hooks(
        collection: Arc<C>,
        on_find_document: FindHook<C::Document, T>,
        on_find_documents: FindManyHook<C::Document, T>,
    ) -> Self {
        Self { collection, on_find_document, on_find_documents }
    }

    /// Returns the collection backing this engine.
    pub fn collection(&self) -> &Arc<C> {
        &self.collection
    }

    /// Converts a failed operation into an envelope, logging the failure.
    fn classify<U>(operation: &str, e: DriverError) -> Envelope<U> {
        match e {
            DriverError::BackendError(_) => warn!("{} failed: {}", operation, e),
            _ => debug!("{} failed: {}", operation, e),
        }
        Envelope::from(e)
    }

    /// Ensures that `id` is in the native identifier format.
    fn parse_id(id: &str) -> DriverResult<DocumentId> {
        DocumentId::new(id).map_err(|_| DriverError::InvalidId)
    }

    /// Creates a new document.
    pub async fn insert(&self, doc: C::NewDocument) -> Envelope<C::Document> {
        match self.collection.create(doc).await {
            Ok(doc) => Envelope::ok(doc),
            Err(e) => Self::classify("insert", e.into()),
        }
    }

    /// Internal implementation of `update`.
    async fn try_update(&self, id: &str, patch: C::Patch) -> DriverResult<()> {
        let id = Self::parse_id(id)?;
        match self.collection.update_one(&id, patch).await? {
            0 => Err(DriverError::NotFound),
            _ => Ok(()),
        }
    }

    /// Applies `patch` to the document `id`.
    pub async fn update(&self, id: &str, patch: C::Patch) -> Envelope<String> {
        match self.try_update(id, patch).await {
            Ok(()) => Envelope::ok(UPDATED_MESSAGE.to_owned()),
            Err(e) => Self::classify("update", e),
        }
    }

    /// Internal implementation of `remove`.
    async fn try_remove(&self, id: &str) -> DriverResult<()> {
        let id = Self::parse_id(id)?;
        match self.collection.delete_one(&id).await? {
            0 => Err(DriverError::NotFound),
            _ => Ok(()),
        }
    }

    /// Deletes the document `id`.
    pub async fn remove(&self, id: &str) -> Envelope<String> {
        match self.try_remove(id).await {
            Ok(()) => Envelope::ok(REMOVED_MESSAGE.to_owned()),
            Err(e) => Self::classify("remove", e),
        }
    }

    /// Internal implementation of `find_by_id`.
    async fn try_find_by_id(&self, id: &str) -> DriverResult<T> {
        let id = Self::parse_id(id)?;
        match self.collection.find_by_id(&id).await? {
            Some(doc) => Ok((self.on_find_document)(doc).await?),
            None => Err(DriverError::NotFound),
        }
    }

    /// Looks up the document `id`.
    pub async fn find_by_id(&self, id: &str) -> Envelope<T> {
        match self.try_find_by_id(id).await {
            Ok(doc) => Envelope::ok(doc),
            Err(e) => Self::classify("find_by_id", e),
        }
    }

    /// Internal implementation of `get_all`.
    async fn try_get_all(&self, filter: &C::Filter) -> DriverResult<Vec<T>> {
        let docs = self.collection.find(filter).await?;
        Ok((self.on_find_documents)(docs).await?)
    }

    /// Returns all documents that match `filter`.
    pub async fn get_all(&self, filter: &C::Filter) -> Envelope<Vec<T>> {
        match self.try_get_all(filter).await {
            Ok(docs) => Envelope::ok(docs),
            Err(e) => Self::classify("get_all", e),
        }
    }
}
